//! Panel-set commands and the sink that carries them to the device.

use crate::colors;
use crate::types::{PanelId, PanelLevels};
use core::time::Duration;

/// Sets one panel to the given levels, fading over `transition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelCommand {
    pub panel: PanelId,
    pub levels: PanelLevels,
    pub transition: Duration,
}

impl PanelCommand {
    /// Creates command.
    pub fn new(panel: PanelId, levels: PanelLevels, transition: Duration) -> Self {
        Self {
            panel,
            levels,
            transition,
        }
    }

    /// Instant switch to `levels`.
    pub fn instant(panel: PanelId, levels: PanelLevels) -> Self {
        Self::new(panel, levels, Duration::ZERO)
    }

    /// Instant switch to all channels off.
    pub fn reset(panel: PanelId) -> Self {
        Self::instant(panel, colors::OFF)
    }
}

/// Errors reported by a [`PanelCommandSink`].
#[derive(Debug)]
pub enum SinkError {
    /// The underlying socket failed.
    Io(std::io::Error),

    /// The stream was closed before the command could be sent.
    Closed,
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SinkError::Io(err) => write!(f, "stream i/o error: {}", err),
            SinkError::Closed => write!(f, "stream is closed"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(err) => Some(err),
            SinkError::Closed => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(err: std::io::Error) -> Self {
        SinkError::Io(err)
    }
}

/// Trait for the device's streaming channel.
///
/// Implementations are blocking and ordered: a command is handed to the
/// transport before `send` returns, and commands reach the device in the
/// order they were sent.
pub trait PanelCommandSink {
    /// Sends one panel-set command.
    fn send(&mut self, command: &PanelCommand) -> Result<(), SinkError>;
}

impl<S: PanelCommandSink + ?Sized> PanelCommandSink for &mut S {
    fn send(&mut self, command: &PanelCommand) -> Result<(), SinkError> {
        (**self).send(command)
    }
}
