//! Screen host backed by profile geometry instead of a real window system.

use log::trace;

use bubblectl::{Bounds, BubblePosition, HostError, ScreenHost, ScreenMetrics};

use crate::config::Profile;

#[derive(Debug, Clone)]
pub struct VirtualScreen {
    metrics: ScreenMetrics,
    bubble: BubblePosition,
    bubble_size: i32,
    trash_size: i32,
    trash_bottom_margin: i32,
}

impl VirtualScreen {
    pub fn from_profile(p: &Profile) -> Self {
        let mut screen = Self {
            metrics: ScreenMetrics::default(),
            bubble: BubblePosition::new(p.bubble.x, p.bubble.y),
            bubble_size: 0,
            trash_size: 0,
            trash_bottom_margin: 0,
        };
        screen.apply_profile(p);
        screen
    }

    /// Takes the new geometry but leaves the bubble where it is.
    pub fn apply_profile(&mut self, p: &Profile) {
        self.metrics = ScreenMetrics {
            width: p.screen.width,
            height: p.screen.height,
        };
        self.bubble_size = p.bubble.size;
        self.trash_size = p.trash.size;
        self.trash_bottom_margin = p.trash.bottom_margin;
    }

    pub fn bubble_position(&self) -> BubblePosition {
        self.bubble
    }
}

impl ScreenHost for VirtualScreen {
    fn screen_metrics(&self) -> Result<ScreenMetrics, HostError> {
        if self.metrics.width <= 0 || self.metrics.height <= 0 {
            return Err(HostError::MetricsUnavailable);
        }
        Ok(self.metrics)
    }

    /// A zero `bubble.size` reports a zero-sized box at the bubble's position.
    fn bubble_bounds(&self) -> Result<Bounds, HostError> {
        let size = self.bubble_size.max(0);
        Ok(Bounds {
            x: self.bubble.x,
            y: self.bubble.y,
            width: size,
            height: size,
        })
    }

    /// Centred horizontally, `bottom_margin` above the bottom edge.
    fn trash_bounds(&self) -> Result<Bounds, HostError> {
        if self.trash_size <= 0 {
            return Err(HostError::Unmeasured("trash"));
        }
        Ok(Bounds {
            x: (self.metrics.width - self.trash_size) / 2,
            y: self.metrics.height - self.trash_size - self.trash_bottom_margin,
            width: self.trash_size,
            height: self.trash_size,
        })
    }

    fn move_bubble(&mut self, position: BubblePosition) {
        trace!("bubble at ({}, {})", position.x, position.y);
        self.bubble = position;
    }
}
