#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PanelOrder`**: Panel ids in confirmed left-to-right order
//! - **`CandidateOrder`**: An operator-proposed order, validated against the stored one
//! - **`Schedule`**: A countdown as timed per-panel brightness steps
//! - **`Player`**: Walks a schedule in real time over a `PanelCommandSink`
//! - **`Calibrator`**: Sweeps a candidate order across the panels and commits it
//! - **`CredentialStore`**: Where the device address, token and order are persisted
//! - **`PanelCommandSink`**: Trait for the device's streaming channel
//! - **`Pacer`**: Trait for wall-clock waits
//!
//! Commands carry 8-bit channel levels as `Srgb<u8>` plus a white channel.

use core::time::Duration;

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod bootstrap;
pub mod calibrator;
pub mod colors;
pub mod command;
pub mod nanoleaf;
pub mod order;
pub mod parsing;
pub mod player;
pub mod schedule;
pub mod store;
pub mod time;
pub mod types;

pub use bootstrap::{BootstrapError, BootstrapOptions, DeviceProvisioner, load_or_provision};
pub use calibrator::{CalibrationError, Calibrator};
pub use command::{PanelCommand, PanelCommandSink, SinkError};
pub use order::{CandidateOrder, OrderError, OrderMismatch, PanelOrder};
pub use parsing::{DurationParseError, parse_duration};
pub use player::{PlaybackError, PlaybackSummary, Player, PlayerState};
pub use schedule::{Schedule, ScheduleBuilder};
pub use store::{CredentialStore, DeviceConfig, DeviceCredentials, IniFileStore, MemoryStore, StoreError};
pub use time::{CancelToken, Interrupted, Pacer, ThreadPacer};
pub use types::{AnimationStep, PanelId, PanelLevels, PanelPosition, ScheduleError};

/// Brightness increments per panel in a countdown.
pub const DEFAULT_STEP_RESOLUTION: u16 = 60;

/// Largest supported panel count; the calibration ramp needs one intensity
/// unit per panel.
pub const MAX_PANELS: usize = 255;

/// Pause between panels during a calibration sweep.
pub const CALIBRATION_STEP_DELAY: Duration = Duration::from_millis(200);

/// White channel value that marks a panel as lit.
pub const MARKER_WHITE: u8 = 1;
