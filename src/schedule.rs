use crate::DEFAULT_STEP_RESOLUTION;
use crate::colors;
use crate::command::PanelCommand;
use crate::order::PanelOrder;
use crate::types::{AnimationStep, PanelId, ScheduleError};
use core::time::Duration;

/// A countdown: every panel ramps its marker up to full, one after another.
///
/// Panels are lit in order. A panel runs its whole brightness ramp before the
/// next one starts, so a single light appears to travel across the array as
/// time runs out.
///
/// Steps are computed on demand from the order and the timing parameters; the
/// schedule does not store them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    order: PanelOrder,
    resolution: u16,
    step_size: u8,
    hold: Duration,
    total: Duration,
}

impl Schedule {
    /// Creates a new schedule builder.
    pub fn builder(total: Duration, order: &PanelOrder) -> ScheduleBuilder<'_> {
        ScheduleBuilder::new(total, order)
    }

    /// Builds a schedule with the default resolution of 60 steps per panel.
    pub fn build(total: Duration, order: &PanelOrder) -> Result<Schedule, ScheduleError> {
        ScheduleBuilder::new(total, order).build()
    }

    /// Returns the panels in playback order.
    pub fn panels(&self) -> &PanelOrder {
        &self.order
    }

    /// Brightness increments per panel.
    pub fn step_resolution(&self) -> u16 {
        self.resolution
    }

    /// Intensity added by each increment.
    pub fn step_size(&self) -> u8 {
        self.step_size
    }

    /// Hold time of every step.
    pub fn step_hold(&self) -> Duration {
        self.hold
    }

    /// Time spent on one panel's ramp.
    pub fn panel_duration(&self) -> Duration {
        self.hold * u32::from(self.resolution)
    }

    /// The duration the schedule was built for.
    pub fn requested_duration(&self) -> Duration {
        self.total
    }

    /// Sum of all step holds. Never exceeds [`Schedule::requested_duration`].
    pub fn total_duration(&self) -> Duration {
        self.hold * self.len() as u32
    }

    /// Total number of steps.
    pub fn len(&self) -> usize {
        self.order.len() * usize::from(self.resolution)
    }

    /// Always false for a built schedule.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the step at a flat position, if in range.
    pub fn step(&self, index: usize) -> Option<AnimationStep> {
        let resolution = usize::from(self.resolution);
        let panel = *self.order.ids().get(index / resolution)?;
        let step_index = (index % resolution + 1) as u16;
        Some(self.make_step(panel, step_index))
    }

    /// Iterates over all steps in playback order.
    pub fn steps(&self) -> Steps<'_> {
        Steps {
            schedule: self,
            next: 0,
        }
    }

    fn make_step(&self, panel: PanelId, step_index: u16) -> AnimationStep {
        // step_size * resolution <= 255 is guaranteed by the builder.
        let intensity = (u16::from(self.step_size) * step_index) as u8;
        AnimationStep {
            panel,
            step_index,
            intensity,
            hold: self.hold,
        }
    }
}

impl AnimationStep {
    /// The panel-set command that displays this step.
    pub fn command(&self) -> PanelCommand {
        PanelCommand::instant(self.panel, colors::marker(self.intensity))
    }
}

/// Iterator over a [`Schedule`]'s steps.
#[derive(Debug, Clone)]
pub struct Steps<'a> {
    schedule: &'a Schedule,
    next: usize,
}

impl Iterator for Steps<'_> {
    type Item = AnimationStep;

    fn next(&mut self) -> Option<AnimationStep> {
        let step = self.schedule.step(self.next)?;
        self.next += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.schedule.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Steps<'_> {}

/// Builder for validated countdown schedules.
#[derive(Debug)]
pub struct ScheduleBuilder<'a> {
    total: Duration,
    order: &'a PanelOrder,
    resolution: u16,
}

impl<'a> ScheduleBuilder<'a> {
    pub fn new(total: Duration, order: &'a PanelOrder) -> Self {
        Self {
            total,
            order,
            resolution: DEFAULT_STEP_RESOLUTION,
        }
    }

    /// Sets the number of brightness increments per panel.
    ///
    /// Default is 60.
    pub fn step_resolution(mut self, resolution: u16) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builds and validates the schedule.
    ///
    /// # Errors
    /// * `EmptyOrder` - No panels to animate
    /// * `ZeroDuration` - Nothing to count down
    /// * `InvalidResolution` - Resolution outside `1..=255`
    pub fn build(self) -> Result<Schedule, ScheduleError> {
        if self.order.is_empty() {
            return Err(ScheduleError::EmptyOrder);
        }
        if self.total.is_zero() {
            return Err(ScheduleError::ZeroDuration);
        }
        let step_size = colors::ramp_step(usize::from(self.resolution));
        if step_size == 0 {
            return Err(ScheduleError::InvalidResolution(self.resolution));
        }

        // floor(floor(total / panels) / resolution) == floor(total / (panels * resolution)),
        // so a single division in nanoseconds gives the per-step hold.
        let steps = self.order.len() as u128 * u128::from(self.resolution);
        let hold_nanos = self.total.as_nanos() / steps;
        let hold = Duration::new(
            (hold_nanos / 1_000_000_000) as u64,
            (hold_nanos % 1_000_000_000) as u32,
        );

        Ok(Schedule {
            order: self.order.clone(),
            resolution: self.resolution,
            step_size,
            hold,
            total: self.total,
        })
    }
}
