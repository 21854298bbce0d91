use crate::steps::{Step, StepId};
use chrono::{DateTime, Utc};

/// Ordered collection of captured steps. Iteration order is capture order.
#[derive(Debug, Clone, Default)]
pub struct StepStore {
    steps: Vec<Step>,
    last_id: Option<StepId>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl StepStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the id and timestamp for the next step.
    ///
    /// Ids stay strictly increasing and timestamps non-decreasing even when the
    /// clock reports the same millisecond twice or steps backwards. Ids are never
    /// reused after `clear`.
    pub fn allocate(&mut self, now: DateTime<Utc>) -> (StepId, DateTime<Utc>) {
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        let millis = timestamp.timestamp_millis().max(0) as u64;
        let id = match self.last_id {
            Some(StepId(last)) if last >= millis => StepId(last + 1),
            _ => StepId(millis),
        };

        self.last_id = Some(id);
        self.last_timestamp = Some(timestamp);
        (id, timestamp)
    }

    pub fn append(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Removes the step with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: StepId) -> bool {
        let before = self.steps.len();
        self.steps.retain(|step| step.id != id);
        self.steps.len() != before
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }
}

impl<'a> IntoIterator for &'a StepStore {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
