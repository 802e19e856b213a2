//! Countdown playback driver.
//!
//! Provides [`Player`], which walks a [`Schedule`] in real time: it blanks
//! every scheduled panel, then sends each step and holds it for the step's
//! duration before moving on.

use crate::command::{PanelCommand, PanelCommandSink, SinkError};
use crate::schedule::Schedule;
use crate::time::{Interrupted, Pacer};
use crate::types::PanelId;
use core::time::Duration;
use log::{debug, info};

/// The current state of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Nothing played yet.
    Idle,
    /// Blanking panels before the first step.
    Resetting,
    /// Sending steps.
    Running,
    /// Last step sent and held.
    Complete,
    /// Stopped early by a transport failure or an interruption.
    Aborted,
}

/// Outcome of a complete run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Panels blanked before the first step.
    pub panels_reset: usize,
    /// Steps sent.
    pub steps_sent: usize,
    /// Sum of the holds paced.
    pub paced: Duration,
}

/// Errors that abort playback.
#[derive(Debug)]
pub enum PlaybackError {
    /// A command could not be delivered.
    ///
    /// `step` is `None` when the failure happened while blanking panels.
    Transport {
        panel: PanelId,
        step: Option<usize>,
        source: SinkError,
    },
    /// Pacing was cancelled after `steps_sent` steps.
    Interrupted { steps_sent: usize },
}

impl core::fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PlaybackError::Transport {
                panel,
                step: None,
                source,
            } => write!(f, "failed to reset panel {}: {}", panel, source),
            PlaybackError::Transport {
                panel,
                step: Some(step),
                source,
            } => write!(
                f,
                "failed to send step {} to panel {}: {}",
                step + 1,
                panel,
                source
            ),
            PlaybackError::Interrupted { steps_sent } => {
                write!(f, "playback interrupted after {} steps", steps_sent)
            }
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlaybackError::Transport { source, .. } => Some(source),
            PlaybackError::Interrupted { .. } => None,
        }
    }
}

/// Drives a panel sink through countdown schedules.
///
/// The player owns the sink for its lifetime, so no other run can interleave
/// commands on the same stream.
pub struct Player<S: PanelCommandSink, P: Pacer> {
    sink: S,
    pacer: P,
    state: PlayerState,
}

impl<S: PanelCommandSink, P: Pacer> Player<S, P> {
    pub fn new(sink: S, pacer: P) -> Self {
        Self {
            sink,
            pacer,
            state: PlayerState::Idle,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Releases the sink and pacer.
    pub fn into_parts(self) -> (S, P) {
        (self.sink, self.pacer)
    }

    /// Plays `schedule` to the end.
    ///
    /// Panels are left showing the final step; nothing is reset afterwards,
    /// nor after an abort.
    pub fn play(&mut self, schedule: &Schedule) -> Result<PlaybackSummary, PlaybackError> {
        info!(
            "countdown: {} panels, {} steps of {:?} ({:?} per panel)",
            schedule.panels().len(),
            schedule.len(),
            schedule.step_hold(),
            schedule.panel_duration(),
        );

        self.state = PlayerState::Resetting;
        for panel in schedule.panels().iter() {
            if let Err(source) = self.sink.send(&PanelCommand::reset(panel)) {
                self.state = PlayerState::Aborted;
                return Err(PlaybackError::Transport {
                    panel,
                    step: None,
                    source,
                });
            }
        }

        self.state = PlayerState::Running;
        let resolution = usize::from(schedule.step_resolution());
        let panel_count = schedule.panels().len();
        let mut paced = Duration::ZERO;

        for (index, step) in schedule.steps().enumerate() {
            if step.step_index == 1 {
                info!(
                    "panel {} ({}/{})",
                    step.panel,
                    index / resolution + 1,
                    panel_count
                );
            }
            debug!(
                "step {}: panel {} intensity {}",
                step.step_index, step.panel, step.intensity
            );

            if let Err(source) = self.sink.send(&step.command()) {
                self.state = PlayerState::Aborted;
                return Err(PlaybackError::Transport {
                    panel: step.panel,
                    step: Some(index),
                    source,
                });
            }

            if let Err(Interrupted) = self.pacer.pause(step.hold) {
                self.state = PlayerState::Aborted;
                return Err(PlaybackError::Interrupted {
                    steps_sent: index + 1,
                });
            }
            paced += step.hold;
        }

        self.state = PlayerState::Complete;
        info!("countdown complete");
        Ok(PlaybackSummary {
            panels_reset: panel_count,
            steps_sent: schedule.len(),
            paced,
        })
    }
}
