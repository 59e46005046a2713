//! Collaborators the bubble core calls into.
//!
//! The core owns only the drag session and the bubble position. Everything
//! measured on screen is read through [`ScreenHost`], and every outcome leaves
//! through one of the other traits here.

use std::sync::mpsc::Sender;

use serde::Serialize;
use thiserror::Error;

/// Top-left anchor of the bubble, in whole screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BubblePosition {
    pub x: i32,
    pub y: i32,
}

impl BubblePosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenMetrics {
    pub width: i32,
    pub height: i32,
}

/// On-screen bounding box of a visual element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("screen metrics are not available")]
    MetricsUnavailable,
    #[error("{0} has not been measured yet")]
    Unmeasured(&'static str),
}

pub trait ScreenHost {
    fn screen_metrics(&self) -> Result<ScreenMetrics, HostError>;
    /// A bubble that is placed but not yet measured reports zero width and
    /// height. `Unmeasured` means there is no position either.
    fn bubble_bounds(&self) -> Result<Bounds, HostError>;
    fn trash_bounds(&self) -> Result<Bounds, HostError>;
    /// Places the bubble's top-left corner at `position`.
    fn move_bubble(&mut self, position: BubblePosition);
}

pub trait VolumeControl {
    /// Reveals the system volume control.
    fn reveal(&mut self);
}

pub trait Lifecycle {
    /// Tears down the overlay. Calling it again after teardown must be harmless.
    fn terminate(&mut self);
}

impl<F: FnMut()> VolumeControl for F {
    fn reveal(&mut self) {
        self()
    }
}

impl<F: FnMut()> Lifecycle for F {
    fn terminate(&mut self) {
        self()
    }
}

/// Discrete visual state changes emitted by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum Signal {
    DragStarted,
    /// Emitted on every move and once at release.
    Proximity { near: bool },
    DragEnded,
    /// The bubble was dropped on the trash and is about to go away.
    Removing,
}

/// Receives [`Signal`]s. Implementations must return immediately; rendering
/// happens elsewhere.
pub trait Feedback {
    fn signal(&mut self, signal: Signal);
}

impl Feedback for Sender<Signal> {
    fn signal(&mut self, signal: Signal) {
        // A closed receiver only means nobody is rendering anymore.
        let _ = self.send(signal);
    }
}

impl Feedback for Vec<Signal> {
    fn signal(&mut self, signal: Signal) {
        self.push(signal);
    }
}

/// Borrowed set of collaborators handed to the controller for one event.
pub struct Collaborators<'a> {
    pub host: &'a mut dyn ScreenHost,
    pub volume: &'a mut dyn VolumeControl,
    pub lifecycle: &'a mut dyn Lifecycle,
    pub feedback: &'a mut dyn Feedback,
}
