//! Tap vs. drag classification for a single bubble touch session.
//!
//! | State    | Event  | Next     | Transition                     |
//! | -------- | ------ | -------- | ------------------------------ |
//! | Idle     | Down   | Dragging | `Started`                      |
//! | Idle     | Move   | Idle     | `Ignored`                      |
//! | Idle     | Up     | Idle     | `Ignored`                      |
//! | Idle     | Cancel | Idle     | `Ignored`                      |
//! | Dragging | Down   | Dragging | `Restarted` (old one dropped)  |
//! | Dragging | Move   | Dragging | `Moved`                        |
//! | Dragging | Up     | Idle     | `Released` (tap or drag)       |
//! | Dragging | Cancel | Idle     | `Cancelled`                    |

use log::{debug, trace};

use crate::host::BubblePosition;
use crate::pointer::{PointerEvent, PointerPhase, PointerSample};

pub const DEFAULT_TOUCH_SLOP: f64 = 10.0;

/// One touch, from Down to Up or Cancel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_bubble_position: BubblePosition,
    pub start_pointer: PointerSample,
    pub last_pointer: PointerSample,
}

impl DragSession {
    fn begin(position: BubblePosition, pointer: PointerSample) -> Self {
        Self {
            start_bubble_position: position,
            start_pointer: pointer,
            last_pointer: pointer,
        }
    }

    /// Absolute pointer travel since Down.
    pub fn displacement(&self) -> (f64, f64) {
        (
            (self.last_pointer.x - self.start_pointer.x).abs(),
            (self.last_pointer.y - self.start_pointer.y).abs(),
        )
    }

    /// Bubble position for the current pointer, relative to where both started.
    pub fn dragged_position(&self) -> BubblePosition {
        let dx = (self.last_pointer.x - self.start_pointer.x) as i32;
        let dy = (self.last_pointer.y - self.start_pointer.y) as i32;
        BubblePosition {
            x: self.start_bubble_position.x.saturating_add(dx),
            y: self.start_bubble_position.y.saturating_add(dy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Tap,
    Drag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Ignored,
    Started,
    /// A Down arrived mid-session; the previous session was dropped unresolved.
    Restarted,
    Moved(BubblePosition),
    Released(Release),
    Cancelled,
}

/// Advances the state machine by one event. The session moves through by
/// value, so a finished one cannot be touched again.
pub fn step(
    state: GestureState,
    event: PointerEvent,
    position: BubblePosition,
    touch_slop: f64,
) -> (GestureState, Transition) {
    match (state, event.phase) {
        (GestureState::Idle, PointerPhase::Down) => (
            GestureState::Dragging(DragSession::begin(position, event.sample)),
            Transition::Started,
        ),
        (GestureState::Idle, _) => (GestureState::Idle, Transition::Ignored),
        (GestureState::Dragging(_), PointerPhase::Down) => (
            GestureState::Dragging(DragSession::begin(position, event.sample)),
            Transition::Restarted,
        ),
        (GestureState::Dragging(mut session), PointerPhase::Move) => {
            session.last_pointer = event.sample;
            let moved = session.dragged_position();
            (GestureState::Dragging(session), Transition::Moved(moved))
        }
        (GestureState::Dragging(mut session), PointerPhase::Up) => {
            session.last_pointer = event.sample;
            let (dx, dy) = session.displacement();
            let release = if dx < touch_slop && dy < touch_slop {
                Release::Tap
            } else {
                Release::Drag
            };
            (GestureState::Idle, Transition::Released(release))
        }
        (GestureState::Dragging(_), PointerPhase::Cancel) => {
            (GestureState::Idle, Transition::Cancelled)
        }
    }
}

#[derive(Debug)]
pub struct GestureTracker {
    state: GestureState,
    touch_slop: f64,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TOUCH_SLOP)
    }
}

impl GestureTracker {
    pub fn new(touch_slop: f64) -> Self {
        Self {
            state: GestureState::Idle,
            touch_slop,
        }
    }

    pub fn touch_slop(&self) -> f64 {
        self.touch_slop
    }

    pub fn set_touch_slop(&mut self, touch_slop: f64) {
        self.touch_slop = touch_slop;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            GestureState::Dragging(session) => Some(session),
            GestureState::Idle => None,
        }
    }

    pub fn update(&mut self, event: PointerEvent, position: BubblePosition) -> Transition {
        let state = std::mem::take(&mut self.state);
        let (next, transition) = step(state, event, position, self.touch_slop);
        self.state = next;

        match transition {
            Transition::Ignored => trace!("ignoring {:?} while idle", event.phase),
            Transition::Moved(_) => {}
            other => debug!("gesture: {:?} -> {other:?}", event.phase),
        }
        transition
    }
}
