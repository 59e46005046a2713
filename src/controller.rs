//! Routes pointer events through the gesture tracker and turns each transition
//! into collaborator calls.

use log::{debug, info};
use serde::Serialize;

use crate::deletion::DeletionTrigger;
use crate::gestures::{GestureTracker, Release, Transition};
use crate::host::{BubblePosition, Collaborators, Signal};
use crate::pointer::PointerEvent;
use crate::proximity::ProximityDetector;
use crate::snap::EdgeSnapPlanner;

/// What a single pointer event resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Ignored,
    DragStarted,
    Dragged { position: BubblePosition, near: bool },
    Tapped,
    Snapped { position: BubblePosition },
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Tap/drag boundary in screen pixels.
    pub touch_slop: f64,
    pub trash_distance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            touch_slop: crate::gestures::DEFAULT_TOUCH_SLOP,
            trash_distance: crate::proximity::DEFAULT_TRASH_DISTANCE,
        }
    }
}

#[derive(Debug)]
pub struct BubbleController {
    position: BubblePosition,
    tracker: GestureTracker,
    proximity: ProximityDetector,
    planner: EdgeSnapPlanner,
    deletion: DeletionTrigger,
}

impl BubbleController {
    pub fn new(position: BubblePosition, tuning: Tuning) -> Self {
        Self {
            position,
            tracker: GestureTracker::new(tuning.touch_slop),
            proximity: ProximityDetector::new(tuning.trash_distance),
            planner: EdgeSnapPlanner,
            deletion: DeletionTrigger,
        }
    }

    pub fn position(&self) -> BubblePosition {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    pub fn tuning(&self) -> Tuning {
        Tuning {
            touch_slop: self.tracker.touch_slop(),
            trash_distance: self.proximity.threshold(),
        }
    }

    /// Swaps thresholds without touching the position or an open session.
    pub fn retune(&mut self, tuning: Tuning) {
        self.tracker.set_touch_slop(tuning.touch_slop);
        self.proximity = ProximityDetector::new(tuning.trash_distance);
    }

    pub fn handle(&mut self, event: PointerEvent, c: &mut Collaborators<'_>) -> Outcome {
        match self.tracker.update(event, self.position) {
            Transition::Ignored => Outcome::Ignored,
            Transition::Started => {
                c.feedback.signal(Signal::DragStarted);
                Outcome::DragStarted
            }
            Transition::Restarted => {
                debug!("down while dragging; dropping previous session");
                c.feedback.signal(Signal::DragEnded);
                c.feedback.signal(Signal::DragStarted);
                Outcome::DragStarted
            }
            Transition::Moved(position) => {
                self.position = position;
                c.host.move_bubble(position);
                let near = self.proximity.check(&*c.host);
                c.feedback.signal(Signal::Proximity { near });
                Outcome::Dragged { position, near }
            }
            Transition::Released(release) => {
                let near = self.proximity.check(&*c.host);
                c.feedback.signal(Signal::Proximity { near });
                c.feedback.signal(Signal::DragEnded);

                if near {
                    self.deletion.fire(c.feedback, c.lifecycle);
                    return Outcome::Deleted;
                }
                match release {
                    Release::Tap => {
                        info!("tap; revealing volume control");
                        c.volume.reveal();
                        Outcome::Tapped
                    }
                    Release::Drag => {
                        let position = self.planner.plan(self.position, &*c.host);
                        debug!("snapping {:?} -> {position:?}", self.position);
                        self.position = position;
                        c.host.move_bubble(position);
                        Outcome::Snapped { position }
                    }
                }
            }
            Transition::Cancelled => {
                c.feedback.signal(Signal::DragEnded);
                Outcome::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests;
