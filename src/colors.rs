//! Panel levels used by the countdown and the calibration sweep.
//!
//! Only the red channel ramps. White is held at a constant low "on" value so
//! the device treats the panel as lit, green and blue stay dark.

use crate::MARKER_WHITE;
use crate::types::PanelLevels;
use palette::Srgb;

/// Every channel off.
pub const OFF: PanelLevels = PanelLevels::new(Srgb::new(0, 0, 0), 0);

/// Red marker at the given intensity.
#[inline]
pub const fn marker(intensity: u8) -> PanelLevels {
    PanelLevels::new(Srgb::new(intensity, 0, 0), MARKER_WHITE)
}

/// Largest per-increment step that keeps `increments` steps within 255.
///
/// Returns 0 when `increments` is 0 or larger than 255.
#[inline]
pub const fn ramp_step(increments: usize) -> u8 {
    if increments == 0 || increments > 255 {
        0
    } else {
        (255 / increments) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_only_ramps_red() {
        let levels = marker(120);
        assert_eq!(levels.rgb, Srgb::new(120, 0, 0));
        assert_eq!(levels.white, MARKER_WHITE);
    }

    #[test]
    fn ramp_step_truncates() {
        assert_eq!(ramp_step(60), 4);
        assert_eq!(ramp_step(3), 85);
        assert_eq!(ramp_step(7), 36);
        assert_eq!(ramp_step(255), 1);
        assert_eq!(ramp_step(256), 0);
        assert_eq!(ramp_step(0), 0);
    }
}
