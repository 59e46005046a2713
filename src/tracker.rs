//! Turns multitouch protocol-B reports into single-pointer events.
//!
//! Only slot 0 drives the bubble; every other contact is ignored.

use bubblectl::{PointerEvent, PointerPhase};

use crate::config::InputConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    Down,
    Up,
}

#[derive(Debug)]
pub struct TouchTracker {
    cur_slot: i32,
    active: bool,
    pending: Pending,
    moved: bool,
    // last raw position; the kernel only reports axes that changed
    x_raw: i32,
    y_raw: i32,
    // normalization
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
    screen_w: f64,
    screen_h: f64,
}

impl TouchTracker {
    pub fn new(input: &InputConfig, screen_w: i32, screen_h: i32) -> Self {
        let mut t = Self {
            cur_slot: 0,
            active: false,
            pending: Pending::None,
            moved: false,
            x_raw: 0,
            y_raw: 0,
            x_min: 0,
            x_max: 1,
            y_min: 0,
            y_max: 1,
            screen_w: f64::from(screen_w),
            screen_h: f64::from(screen_h),
        };
        t.set_norm_ranges(input.x_min, input.x_max, input.y_min, input.y_max);
        t
    }

    pub fn set_norm_ranges(&mut self, x_min: i32, x_max: i32, y_min: i32, y_max: i32) {
        self.x_min = x_min;
        self.x_max = x_max.max(x_min + 1);
        self.y_min = y_min;
        self.y_max = y_max.max(y_min + 1);
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot;
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        if self.cur_slot != 0 {
            return;
        }
        if tracking_id < 0 {
            if self.active || self.pending == Pending::Down {
                self.pending = Pending::Up;
            }
        } else {
            self.pending = Pending::Down;
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        if self.cur_slot == 0 && raw != self.x_raw {
            self.x_raw = raw;
            self.moved = true;
        }
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        if self.cur_slot == 0 && raw != self.y_raw {
            self.y_raw = raw;
            self.moved = true;
        }
    }

    fn position(&self) -> (f64, f64) {
        let nx = (f64::from(self.x_raw - self.x_min) / f64::from(self.x_max - self.x_min))
            .clamp(0.0, 1.0);
        let ny = (f64::from(self.y_raw - self.y_min) / f64::from(self.y_max - self.y_min))
            .clamp(0.0, 1.0);
        (nx * self.screen_w, ny * self.screen_h)
    }

    /// Closes a frame. Yields at most one event.
    pub fn on_syn_report(&mut self) -> Option<PointerEvent> {
        let pending = std::mem::replace(&mut self.pending, Pending::None);
        let moved = std::mem::take(&mut self.moved);
        let (x, y) = self.position();

        match pending {
            Pending::Down => {
                self.active = true;
                Some(PointerEvent::down(x, y))
            }
            Pending::Up if self.active => {
                self.active = false;
                Some(PointerEvent::up(x, y))
            }
            Pending::Up => None,
            Pending::None if self.active && moved => Some(PointerEvent::moved(x, y)),
            Pending::None => None,
        }
    }

    /// The kernel dropped events; whatever touch was in flight is lost.
    pub fn on_syn_dropped(&mut self) -> Option<PointerEvent> {
        self.pending = Pending::None;
        self.moved = false;
        if std::mem::take(&mut self.active) {
            Some(PointerEvent::new(PointerPhase::Cancel, 0.0, 0.0))
        } else {
            None
        }
    }
}
