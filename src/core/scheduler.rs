use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Time source and one-shot timer capability injected into the capture engine.
///
/// A scheduled timer is reported back to the engine through `Recorder::on_timer`
/// once its delay elapses, unless it was cancelled first.
pub trait Scheduler {
    fn now(&self) -> DateTime<Utc>;

    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Timer due at `deadline`; a deadline already in the past fires on the next turn.
    fn schedule_at(&mut self, deadline: DateTime<Utc>) -> TimerId {
        let delay = (deadline - self.now()).to_std().unwrap_or(Duration::ZERO);
        self.schedule(delay)
    }

    fn cancel(&mut self, timer: TimerId);
}
