//! Resting position after a drag is released.

use log::debug;

use crate::host::{BubblePosition, ScreenHost};

/// Left (`0`) or right (`screen_width - bubble_width`) edge, whichever side of
/// the screen centre the bubble's centre is on. Exactly at the centre goes right.
pub fn snap_x(x: i32, bubble_width: i32, screen_width: i32) -> i32 {
    let middle = screen_width / 2;
    if x.saturating_add(bubble_width / 2) < middle {
        0
    } else {
        screen_width - bubble_width
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EdgeSnapPlanner;

impl EdgeSnapPlanner {
    /// Plans the resting position for `current`. `y` never changes.
    ///
    /// An unmeasured bubble counts as zero wide, which puts the right edge
    /// target at `screen_width`. Without screen metrics there is nothing to
    /// snap against and `current` is returned as is.
    pub fn plan(&self, current: BubblePosition, host: &dyn ScreenHost) -> BubblePosition {
        let screen = match host.screen_metrics() {
            Ok(screen) => screen,
            Err(e) => {
                debug!("snap: {e}; leaving bubble at {current:?}");
                return current;
            }
        };
        let bubble_width = host.bubble_bounds().map(|b| b.width).unwrap_or_else(|e| {
            debug!("snap: {e}; assuming zero width");
            0
        });

        BubblePosition {
            x: snap_x(current.x, bubble_width, screen.width),
            y: current.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_half_snaps_left() {
        assert_eq!(snap_x(400, 100, 1000), 0);
        assert_eq!(snap_x(-250, 100, 1000), 0);
    }

    #[test]
    fn right_half_snaps_right() {
        assert_eq!(snap_x(600, 100, 1000), 900);
        assert_eq!(snap_x(1400, 100, 1000), 900);
    }

    #[test]
    fn centre_tie_goes_right() {
        // 450 + 50 == 500
        assert_eq!(snap_x(450, 100, 1000), 900);
        assert_eq!(snap_x(449, 100, 1000), 0);
    }

    #[test]
    fn unmeasured_width_targets_screen_width() {
        assert_eq!(snap_x(700, 0, 1080), 1080);
    }

    #[test]
    fn saturated_position_snaps_right() {
        assert_eq!(snap_x(i32::MAX, 100, 1000), 900);
        assert_eq!(snap_x(i32::MIN, 100, 1000), 0);
    }

    #[test]
    fn odd_sizes_use_integer_halves() {
        // middle = 1081 / 2 = 540, half width = 65 / 2 = 32
        assert_eq!(snap_x(508, 65, 1081), 1016);
        assert_eq!(snap_x(507, 65, 1081), 0);
    }
}
