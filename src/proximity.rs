//! Distance from the bubble to the trash target.

use log::debug;

use crate::host::{Bounds, ScreenHost};

pub const DEFAULT_TRASH_DISTANCE: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityDetector {
    threshold: f64,
}

impl Default for ProximityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TRASH_DISTANCE)
    }
}

impl ProximityDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Distance between the top-left corners of both boxes.
    pub fn distance(bubble: &Bounds, trash: &Bounds) -> f64 {
        let dx = f64::from(bubble.x) - f64::from(trash.x);
        let dy = f64::from(bubble.y) - f64::from(trash.y);
        dx.hypot(dy)
    }

    pub fn is_near_distance(&self, distance: f64) -> bool {
        distance < self.threshold
    }

    pub fn is_near(&self, bubble: &Bounds, trash: &Bounds) -> bool {
        self.is_near_distance(Self::distance(bubble, trash))
    }

    /// Queries both boxes fresh from the host. An unmeasured box is never near.
    pub fn check(&self, host: &dyn ScreenHost) -> bool {
        let bounds = host
            .bubble_bounds()
            .and_then(|bubble| host.trash_bounds().map(|trash| (bubble, trash)));
        match bounds {
            Ok((bubble, trash)) => self.is_near(&bubble, &trash),
            Err(e) => {
                debug!("proximity: {e}; treating as far");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn at(x: i32, y: i32) -> Bounds {
        Bounds {
            x,
            y,
            width: 64,
            height: 64,
        }
    }

    #[test]
    fn distance_uses_top_left_corners() {
        let d = ProximityDetector::distance(&at(0, 0), &at(300, 400));
        assert_abs_diff_eq!(d, 500.0);
    }

    #[test]
    fn threshold_is_strict() {
        let p = ProximityDetector::default();
        assert!(!p.is_near_distance(300.0));
        assert!(p.is_near_distance(299.9));
        assert!(!p.is_near(&at(0, 0), &at(300, 0)));
        assert!(p.is_near(&at(1, 0), &at(300, 0)));
    }

    #[test]
    fn sizes_do_not_matter() {
        let p = ProximityDetector::default();
        let huge = Bounds {
            x: 0,
            y: 0,
            width: 10_000,
            height: 10_000,
        };
        assert!(!p.is_near(&huge, &at(0, 300)));
    }
}
