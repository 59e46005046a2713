//! Visual feedback, decoupled from the engine by a channel.

use std::sync::mpsc::Receiver;
use std::thread;

use anyhow::Result;
use log::{debug, info};

use bubblectl::Signal;

const ACTIVE_ALPHA: f32 = 1.0;
const IDLE_ALPHA: f32 = 0.4;

/// Where the bubble and trash visuals are headed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub bubble_alpha: f32,
    /// The trash is only shown while dragging.
    pub trash_visible: bool,
    pub trash_highlighted: bool,
    pub removed: bool,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            bubble_alpha: IDLE_ALPHA,
            trash_visible: false,
            trash_highlighted: false,
            removed: false,
        }
    }
}

impl VisualState {
    /// Returns whether anything visible changed.
    pub fn apply(&mut self, signal: Signal) -> bool {
        let before = *self;
        match signal {
            Signal::DragStarted => {
                self.bubble_alpha = ACTIVE_ALPHA;
                self.trash_visible = true;
            }
            Signal::Proximity { near } => self.trash_highlighted = near,
            Signal::DragEnded => {
                self.bubble_alpha = IDLE_ALPHA;
                self.trash_visible = false;
                self.trash_highlighted = false;
            }
            Signal::Removing => self.removed = true,
        }
        *self != before
    }
}

pub struct FeedbackThread {
    _thread: thread::JoinHandle<()>,
}

impl FeedbackThread {
    pub fn start(rx: Receiver<Signal>) -> Result<Self> {
        let handle = thread::Builder::new()
            .name("feedback".into())
            .spawn(move || {
                let mut state = VisualState::default();
                for signal in rx {
                    if state.apply(signal) {
                        debug!("visual: {state:?}");
                    }
                    if state.removed {
                        info!("visual: bubble removed");
                        break;
                    }
                }
            })?;
        Ok(Self { _thread: handle })
    }
}
