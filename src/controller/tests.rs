use proptest::prelude::*;

use super::*;
use crate::host::{Bounds, HostError, ScreenHost, ScreenMetrics};

const BUBBLE: i32 = 100;

/// Screen host whose bubble box follows `move_bubble`, with the trash fixed at
/// the bottom centre of a 1000x2000 screen.
#[derive(Debug)]
struct FakeHost {
    screen: Option<ScreenMetrics>,
    bubble: BubblePosition,
    /// `None` is a placed but unmeasured bubble.
    bubble_width: Option<i32>,
    bubble_missing: bool,
    trash: Option<Bounds>,
    moves: Vec<BubblePosition>,
}

impl FakeHost {
    fn new(bubble: BubblePosition) -> Self {
        Self {
            screen: Some(ScreenMetrics {
                width: 1000,
                height: 2000,
            }),
            bubble,
            bubble_width: Some(BUBBLE),
            bubble_missing: false,
            trash: Some(Bounds {
                x: 450,
                y: 1800,
                width: BUBBLE,
                height: BUBBLE,
            }),
            moves: Vec::new(),
        }
    }
}

impl ScreenHost for FakeHost {
    fn screen_metrics(&self) -> Result<ScreenMetrics, HostError> {
        self.screen.ok_or(HostError::MetricsUnavailable)
    }

    fn bubble_bounds(&self) -> Result<Bounds, HostError> {
        if self.bubble_missing {
            return Err(HostError::Unmeasured("bubble"));
        }
        let width = self.bubble_width.unwrap_or(0);
        Ok(Bounds {
            x: self.bubble.x,
            y: self.bubble.y,
            width,
            height: width,
        })
    }

    fn trash_bounds(&self) -> Result<Bounds, HostError> {
        self.trash.ok_or(HostError::Unmeasured("trash"))
    }

    fn move_bubble(&mut self, position: BubblePosition) {
        self.bubble = position;
        self.moves.push(position);
    }
}

#[derive(Debug)]
struct Harness {
    controller: BubbleController,
    host: FakeHost,
    taps: usize,
    deletions: usize,
    signals: Vec<Signal>,
}

impl Harness {
    fn at(x: i32, y: i32) -> Self {
        let position = BubblePosition::new(x, y);
        Self {
            controller: BubbleController::new(position, Tuning::default()),
            host: FakeHost::new(position),
            taps: 0,
            deletions: 0,
            signals: Vec::new(),
        }
    }

    fn send(&mut self, event: PointerEvent) -> Outcome {
        let mut volume = || self.taps += 1;
        let mut lifecycle = || self.deletions += 1;
        let mut c = Collaborators {
            host: &mut self.host,
            volume: &mut volume,
            lifecycle: &mut lifecycle,
            feedback: &mut self.signals,
        };
        self.controller.handle(event, &mut c)
    }

    fn gesture(&mut self, from: (f64, f64), to: (f64, f64)) -> Outcome {
        self.send(PointerEvent::down(from.0, from.1));
        self.send(PointerEvent::moved(to.0, to.1));
        self.send(PointerEvent::up(to.0, to.1))
    }
}

#[test]
fn tap_reveals_volume() {
    let mut h = Harness::at(0, 100);
    let out = h.gesture((30.0, 130.0), (34.0, 127.0));

    assert_eq!(out, Outcome::Tapped);
    assert_eq!(h.taps, 1);
    assert_eq!(h.deletions, 0);
    // Only the live move repositioned the bubble.
    assert_eq!(h.host.moves, vec![BubblePosition::new(4, 97)]);
    assert_eq!(
        h.signals,
        vec![
            Signal::DragStarted,
            Signal::Proximity { near: false },
            Signal::Proximity { near: false },
            Signal::DragEnded,
        ]
    );
}

#[test]
fn drag_snaps_to_nearest_edge() {
    let mut h = Harness::at(0, 100);
    let out = h.gesture((30.0, 130.0), (630.0, 430.0));

    assert_eq!(
        out,
        Outcome::Snapped {
            position: BubblePosition::new(900, 400)
        }
    );
    assert_eq!(h.controller.position(), BubblePosition::new(900, 400));
    assert_eq!(h.host.moves.last(), Some(&BubblePosition::new(900, 400)));
    assert_eq!(h.taps, 0);
    assert_eq!(h.deletions, 0);
}

#[test]
fn drag_back_to_left_half() {
    let mut h = Harness::at(900, 400);
    let out = h.gesture((950.0, 450.0), (400.0, 460.0));
    assert_eq!(
        out,
        Outcome::Snapped {
            position: BubblePosition::new(0, 410)
        }
    );
}

#[test]
fn drop_on_trash_deletes() {
    let mut h = Harness::at(0, 100);
    let out = h.gesture((10.0, 110.0), (460.0, 1760.0));

    assert_eq!(out, Outcome::Deleted);
    assert_eq!(h.deletions, 1);
    assert_eq!(h.taps, 0);
    assert_eq!(
        &h.signals[h.signals.len() - 3..],
        &[
            Signal::Proximity { near: true },
            Signal::DragEnded,
            Signal::Removing
        ]
    );
}

#[test]
fn tap_near_trash_still_deletes() {
    // Sitting right on the trash already.
    let mut h = Harness::at(450, 1800);
    let out = h.gesture((500.0, 1850.0), (502.0, 1851.0));
    assert_eq!(out, Outcome::Deleted);
    assert_eq!(h.taps, 0);
    assert_eq!(h.deletions, 1);
}

#[test]
fn near_flag_follows_the_drag() {
    let mut h = Harness::at(0, 100);
    h.send(PointerEvent::down(0.0, 0.0));
    let near = |o: Outcome| match o {
        Outcome::Dragged { near, .. } => near,
        other => panic!("expected drag, got {other:?}"),
    };
    assert!(!near(h.send(PointerEvent::moved(450.0, 1400.0))));
    assert!(near(h.send(PointerEvent::moved(450.0, 1600.0))));
    assert!(!near(h.send(PointerEvent::moved(0.0, 1600.0))));
}

#[test]
fn cancel_suppresses_everything() {
    let mut h = Harness::at(0, 100);
    h.send(PointerEvent::down(10.0, 110.0));
    h.send(PointerEvent::moved(460.0, 1760.0));
    assert_eq!(h.send(PointerEvent::cancel()), Outcome::Cancelled);
    assert!(!h.controller.is_dragging());

    // A late up is a stray event now.
    assert_eq!(h.send(PointerEvent::up(460.0, 1760.0)), Outcome::Ignored);
    assert_eq!(h.taps, 0);
    assert_eq!(h.deletions, 0);
    assert_eq!(h.signals.last(), Some(&Signal::DragEnded));
    // The bubble stays wherever the drag left it.
    assert_eq!(h.controller.position(), BubblePosition::new(450, 1750));
}

#[test]
fn stray_events_while_idle() {
    let mut h = Harness::at(0, 100);
    assert_eq!(h.send(PointerEvent::moved(5.0, 5.0)), Outcome::Ignored);
    assert_eq!(h.send(PointerEvent::up(5.0, 5.0)), Outcome::Ignored);
    assert!(h.signals.is_empty());
    assert!(h.host.moves.is_empty());
}

#[test]
fn double_down_closes_previous_session() {
    let mut h = Harness::at(0, 100);
    h.send(PointerEvent::down(0.0, 0.0));
    h.send(PointerEvent::moved(200.0, 0.0));
    assert_eq!(h.send(PointerEvent::down(300.0, 300.0)), Outcome::DragStarted);
    assert_eq!(
        h.signals[h.signals.len() - 2..],
        [Signal::DragEnded, Signal::DragStarted]
    );

    // New session starts from where the old one left the bubble.
    let out = h.send(PointerEvent::up(302.0, 301.0));
    assert_eq!(out, Outcome::Tapped);
    assert_eq!(h.controller.position(), BubblePosition::new(200, 100));
}

#[test]
fn unmeasured_bubble_snaps_to_screen_width() {
    let mut h = Harness::at(0, 100);
    h.host.bubble_width = None;
    let out = h.gesture((0.0, 0.0), (700.0, 0.0));
    assert_eq!(
        out,
        Outcome::Snapped {
            position: BubblePosition::new(1000, 100)
        }
    );
}

#[test]
fn unmeasured_bubble_on_trash_is_deleted() {
    let mut h = Harness::at(0, 100);
    h.host.bubble_width = None;
    // Top-left lands exactly on the trash's top-left.
    let out = h.gesture((0.0, 0.0), (450.0, 1700.0));
    assert_eq!(out, Outcome::Deleted);
    assert_eq!(h.deletions, 1);
}

#[test]
fn missing_bubble_snaps_as_zero_wide_and_is_never_near() {
    let mut h = Harness::at(0, 100);
    h.host.bubble_missing = true;
    let out = h.gesture((0.0, 0.0), (450.0, 1700.0));
    assert_eq!(
        out,
        Outcome::Snapped {
            position: BubblePosition::new(0, 1800)
        }
    );
    assert_eq!(h.deletions, 0);
}

#[test]
fn saturated_drag_snaps_right() {
    let mut h = Harness::at(0, 100);
    let out = h.gesture((0.0, 0.0), (1.0e12, 0.0));
    assert_eq!(
        out,
        Outcome::Snapped {
            position: BubblePosition::new(900, 100)
        }
    );
    assert_eq!(h.controller.position(), BubblePosition::new(900, 100));
}

#[test]
fn missing_metrics_keep_position() {
    let mut h = Harness::at(0, 100);
    h.host.screen = None;
    let out = h.gesture((0.0, 0.0), (700.0, 50.0));
    assert_eq!(
        out,
        Outcome::Snapped {
            position: BubblePosition::new(700, 150)
        }
    );
}

#[test]
fn unmeasured_trash_is_never_near() {
    let mut h = Harness::at(450, 1800);
    h.host.trash = None;
    let out = h.gesture((500.0, 1850.0), (501.0, 1850.0));
    assert_eq!(out, Outcome::Tapped);
    assert_eq!(h.deletions, 0);
}

#[test]
fn retune_changes_slop() {
    let mut h = Harness::at(0, 100);
    h.controller.retune(Tuning {
        touch_slop: 40.0,
        trash_distance: 300.0,
    });
    assert_eq!(
        h.controller.tuning(),
        Tuning {
            touch_slop: 40.0,
            trash_distance: 300.0
        }
    );
    assert_eq!(h.gesture((0.0, 0.0), (30.0, 30.0)), Outcome::Tapped);
}

fn far_from_trash() -> impl Strategy<Value = (f64, f64)> {
    // Keeps the bubble in the top half, well out of trash range.
    (0.0..900.0f64, 0.0..600.0f64)
}

proptest! {
    #[test]
    fn small_displacement_is_one_tap(
        (x, y) in far_from_trash(),
        dx in -9.99..9.99f64,
        dy in -9.99..9.99f64,
    ) {
        let mut h = Harness::at(0, 100);
        let out = h.gesture((x, y), (x + dx, y + dy));
        prop_assert_eq!(out, Outcome::Tapped);
        prop_assert_eq!(h.taps, 1);
        prop_assert_eq!(h.deletions, 0);
        prop_assert!(h.host.moves.len() <= 1);
    }

    #[test]
    fn large_displacement_is_one_snap(
        (x, y) in far_from_trash(),
        dx in 10.0..300.0f64,
        dy in -9.0..9.0f64,
        vertical in any::<bool>(),
    ) {
        let (dx, dy) = if vertical { (dy, dx) } else { (dx, dy) };
        let mut h = Harness::at(0, 100);
        let out = h.gesture((x, y), (x + dx, y + dy));
        let snapped = matches!(out, Outcome::Snapped { position } if position.x == 0 || position.x == 900);
        prop_assert!(snapped, "unexpected outcome {:?}", out);
        prop_assert_eq!(h.taps, 0);
        prop_assert_eq!(h.deletions, 0);
    }

    #[test]
    fn near_at_release_always_deletes(
        tx in -200..200i32,
        ty in -200..200i32,
    ) {
        let mut h = Harness::at(0, 100);
        // Land the bubble at trash + (tx, ty), always within 300 px.
        let out = h.gesture((0.0, 0.0), (f64::from(450 + tx), f64::from(1700 + ty)));
        prop_assert_eq!(out, Outcome::Deleted);
        prop_assert_eq!(h.deletions, 1);
        prop_assert_eq!(h.taps, 0);
    }

    #[test]
    fn repeated_move_is_idempotent(
        (x, y) in far_from_trash(),
        (mx, my) in far_from_trash(),
    ) {
        let mut h = Harness::at(0, 100);
        h.send(PointerEvent::down(x, y));
        let first = h.send(PointerEvent::moved(mx, my));
        let after_first = h.controller.position();
        let second = h.send(PointerEvent::moved(mx, my));
        prop_assert_eq!(first, second);
        prop_assert_eq!(h.controller.position(), after_first);
    }

    #[test]
    fn cancel_never_resolves(
        (x, y) in far_from_trash(),
        moves in proptest::collection::vec((0.0..1000.0f64, 0.0..2000.0f64), 0..6),
    ) {
        let mut h = Harness::at(0, 100);
        h.send(PointerEvent::down(x, y));
        for (mx, my) in moves {
            h.send(PointerEvent::moved(mx, my));
        }
        prop_assert_eq!(h.send(PointerEvent::cancel()), Outcome::Cancelled);
        prop_assert!(!h.controller.is_dragging());
        prop_assert_eq!(h.taps, 0);
        prop_assert_eq!(h.deletions, 0);
        prop_assert!(!h.signals.contains(&Signal::Removing));
    }
}
