//! Pacing abstraction for real-time playback.
//!
//! Both the countdown player and the calibrator hold each command on the
//! panels for a fixed wall-clock interval. They do so through [`Pacer`] so
//! tests can record the requested holds instead of sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest single sleep before the cancellation flag is checked again.
const SLICE: Duration = Duration::from_millis(50);

/// The pacing loop was stopped from outside (e.g. Ctrl+C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl core::fmt::Display for Interrupted {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "interrupted")
    }
}

impl std::error::Error for Interrupted {}

/// Trait for abstracting wall-clock waits.
pub trait Pacer {
    /// Blocks the calling thread for `duration`.
    ///
    /// Returns `Err(Interrupted)` if the wait was cut short; the caller must
    /// not send further commands in that case.
    fn pause(&mut self, duration: Duration) -> Result<(), Interrupted>;
}

impl<P: Pacer + ?Sized> Pacer for &mut P {
    fn pause(&mut self, duration: Duration) -> Result<(), Interrupted> {
        (**self).pause(duration)
    }
}

/// Shared flag used to stop a running [`ThreadPacer`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// [`Pacer`] backed by `std::thread::sleep`.
///
/// Sleeps in short slices against an absolute deadline so that a cancel
/// request is honoured promptly without stretching the hold.
#[derive(Debug, Clone, Default)]
pub struct ThreadPacer {
    cancel: CancelToken,
}

impl ThreadPacer {
    pub fn new(cancel: CancelToken) -> Self {
        Self { cancel }
    }
}

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration) -> Result<(), Interrupted> {
        let deadline = Instant::now() + duration;
        loop {
            if self.cancel.is_cancelled() {
                return Err(Interrupted);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            std::thread::sleep(remaining.min(SLICE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_pacer_waits_at_least_the_requested_duration() {
        let mut pacer = ThreadPacer::default();
        let start = Instant::now();
        pacer.pause(Duration::from_millis(20)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn cancelled_pacer_returns_interrupted() {
        let token = CancelToken::new();
        let mut pacer = ThreadPacer::new(token.clone());
        token.cancel();

        let start = Instant::now();
        assert_eq!(pacer.pause(Duration::from_secs(10)), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn zero_pause_returns_immediately() {
        let mut pacer = ThreadPacer::default();
        assert_eq!(pacer.pause(Duration::ZERO), Ok(()));
    }
}
