//! Interactive panel-order calibration.
//!
//! The operator proposes a left-to-right order. The calibrator lights the
//! panels one at a time in that order with a brightening red marker, so a
//! wrong order shows up as a sweep that jumps around the array. A sweep that
//! finishes cleanly is committed to the credential store.

use crate::CALIBRATION_STEP_DELAY;
use crate::colors;
use crate::command::{PanelCommand, PanelCommandSink, SinkError};
use crate::order::{CandidateOrder, OrderMismatch, PanelOrder};
use crate::store::{CredentialStore, DeviceConfig, StoreError};
use crate::time::{Interrupted, Pacer};
use crate::types::PanelId;
use core::time::Duration;
use log::{debug, info};

/// Errors that stop a calibration run.
#[derive(Debug)]
pub enum CalibrationError {
    /// The candidate is not a permutation of the stored panels. Nothing was
    /// sent to the device.
    Validation(OrderMismatch),

    /// A sweep command could not be delivered.
    Transport { panel: PanelId, source: SinkError },

    /// The sweep was cancelled.
    Interrupted,

    /// The sweep finished but the new order could not be saved.
    Store(StoreError),
}

impl core::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CalibrationError::Validation(mismatch) => write!(f, "{}", mismatch),
            CalibrationError::Transport { panel, source } => {
                write!(f, "failed to light panel {}: {}", panel, source)
            }
            CalibrationError::Interrupted => write!(f, "calibration sweep interrupted"),
            CalibrationError::Store(err) => write!(f, "failed to save panel order: {}", err),
        }
    }
}

impl std::error::Error for CalibrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalibrationError::Validation(mismatch) => Some(mismatch),
            CalibrationError::Transport { source, .. } => Some(source),
            CalibrationError::Interrupted => None,
            CalibrationError::Store(err) => Some(err),
        }
    }
}

impl From<OrderMismatch> for CalibrationError {
    fn from(mismatch: OrderMismatch) -> Self {
        CalibrationError::Validation(mismatch)
    }
}

impl From<Interrupted> for CalibrationError {
    fn from(_: Interrupted) -> Self {
        CalibrationError::Interrupted
    }
}

/// Runs calibration sweeps over an exclusively owned sink.
pub struct Calibrator<S: PanelCommandSink, P: Pacer> {
    sink: S,
    pacer: P,
    step_delay: Duration,
}

impl<S: PanelCommandSink, P: Pacer> Calibrator<S, P> {
    /// Creates a calibrator with the default 200 ms between panels.
    pub fn new(sink: S, pacer: P) -> Self {
        Self {
            sink,
            pacer,
            step_delay: CALIBRATION_STEP_DELAY,
        }
    }

    /// Sets the pause after each lit panel.
    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Releases the sink and pacer.
    pub fn into_parts(self) -> (S, P) {
        (self.sink, self.pacer)
    }

    /// Validates `candidate`, sweeps it, and saves it as the new order.
    ///
    /// On any error the store is left untouched. Validation happens before the
    /// first command, so a rejected candidate never lights a panel.
    pub fn calibrate<C: CredentialStore>(
        &mut self,
        store: &mut C,
        config: &DeviceConfig,
        candidate: &CandidateOrder,
    ) -> Result<DeviceConfig, CalibrationError> {
        let order = config.panel_order.validate(candidate)?;
        self.sweep(&order)?;

        let updated = DeviceConfig {
            credentials: config.credentials.clone(),
            panel_order: order,
        };
        store.save(&updated).map_err(CalibrationError::Store)?;
        info!("saved new panel order {}", updated.panel_order);
        Ok(updated)
    }

    /// Lights `order` left to right without saving anything.
    ///
    /// Panel `k` (from 1) gets red at `floor(255 / len) * k`.
    pub fn sweep(&mut self, order: &PanelOrder) -> Result<(), CalibrationError> {
        let step = u16::from(colors::ramp_step(order.len()));
        info!("sweeping {} panels: {}", order.len(), order);

        for (position, panel) in (1u16..).zip(order.iter()) {
            // len <= MAX_PANELS keeps step * position within 255.
            let intensity = (step * position) as u8;
            debug!("panel {} at position {}, red {}", panel, position, intensity);
            self.sink
                .send(&PanelCommand::instant(panel, colors::marker(intensity)))
                .map_err(|source| CalibrationError::Transport { panel, source })?;
            self.pacer.pause(self.step_delay)?;
        }
        Ok(())
    }
}
