//! Core types shared by the schedule builder, the player and the calibrator.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use palette::Srgb;

/// Identifier the device assigns to a single panel.
///
/// Opaque to this crate apart from being a 16-bit value on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(pub u16);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for PanelId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PanelId)
    }
}

/// Channel intensities for one panel: 8-bit RGB plus the white channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLevels {
    pub rgb: Srgb<u8>,
    pub white: u8,
}

impl PanelLevels {
    #[inline]
    pub const fn new(rgb: Srgb<u8>, white: u8) -> Self {
        Self { rgb, white }
    }
}

/// Where the device reports a panel to be.
///
/// Coordinates are in the device's layout units; `orientation` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPosition {
    pub panel: PanelId,
    pub x: i32,
    pub y: i32,
    pub orientation: i32,
}

/// One discrete, timed instruction of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationStep {
    /// Panel this step drives.
    pub panel: PanelId,

    /// Position within the panel's ramp, starting at 1.
    pub step_index: u16,

    /// Marker channel intensity.
    pub intensity: u8,

    /// How long the step is held before the next one is sent.
    pub hold: Duration,
}

/// Schedule construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// The panel order holds no panels.
    EmptyOrder,

    /// The countdown duration is zero.
    ZeroDuration,

    /// Step resolution outside `1..=255`.
    InvalidResolution(u16),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::EmptyOrder => {
                write!(f, "panel order is empty, nothing to animate")
            }
            ScheduleError::ZeroDuration => {
                write!(f, "countdown duration must be greater than zero")
            }
            ScheduleError::InvalidResolution(resolution) => {
                write!(
                    f,
                    "step resolution {} is out of range (expected 1 to 255)",
                    resolution
                )
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
