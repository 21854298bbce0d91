use crate::core::{Scheduler, TimerId};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Deterministic clock for driving debounce windows in tests.
#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: DateTime<Utc>,
    next_id: u64,
    pending: BTreeMap<TimerId, DateTime<Utc>>,
}

impl VirtualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: start,
            next_id: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn starting_at_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: DateTime<Utc>) -> Option<TimerId> {
        let (id, deadline) = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= until)
            .min_by_key(|(id, deadline)| (**deadline, **id))
            .map(|(id, deadline)| (*id, *deadline))?;

        self.pending.remove(&id);
        if deadline > self.now {
            self.now = deadline;
        }
        Some(id)
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) {
        if now > self.now {
            self.now = now;
        }
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::starting_at_millis(1_700_000_000_000)
    }
}

impl Scheduler for VirtualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let delay = chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero());
        self.pending.insert(id, self.now + delay);
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        self.pending.remove(&timer);
    }
}

/// Wall-clock scheduler backed by tokio tasks. Must be used inside a runtime.
///
/// Fired timer ids arrive on the receiver returned by `new`.
pub struct TokioScheduler {
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    fired: mpsc::UnboundedSender<TimerId>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                next_id: 0,
                tasks: HashMap::new(),
                fired: tx,
            },
            rx,
        )
    }

    pub fn active_timers(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(id);
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(task) = self.tasks.remove(&timer) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
