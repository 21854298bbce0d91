use crate::core::{Scheduler, TimerId};
use crate::dom::DomElement;
use chrono::{DateTime, Utc};
use std::time::Duration;

fn deadline(since: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    since + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero())
}

#[derive(Debug, Clone, PartialEq)]
struct PendingHover {
    element: DomElement,
    timer: TimerId,
}

/// Time-gated hover: a hover commits only after the pointer stays on one element
/// for the full delay.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverDebouncer {
    delay: Duration,
    last_hovered: Option<DomElement>,
    pending: Option<PendingHover>,
}

impl HoverDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_hovered: None,
            pending: None,
        }
    }

    /// Pointer entered `element`. Re-entering the current element is a no-op and
    /// does not restart the timer. Returns whether a new timer was started.
    pub fn hover<S: Scheduler>(&mut self, element: &DomElement, scheduler: &mut S) -> bool {
        let now = scheduler.now();
        self.hover_at(element, now, scheduler)
    }

    /// Like [`HoverDebouncer::hover`], with the dwell measured from `since`,
    /// the moment the pointer actually entered the element.
    pub fn hover_at<S: Scheduler>(
        &mut self,
        element: &DomElement,
        since: DateTime<Utc>,
        scheduler: &mut S,
    ) -> bool {
        if self
            .last_hovered
            .as_ref()
            .is_some_and(|last| last.is_same_node(element))
        {
            return false;
        }

        self.cancel_timer(scheduler);
        let timer = scheduler.schedule_at(deadline(since, self.delay));
        self.last_hovered = Some(element.clone());
        self.pending = Some(PendingHover {
            element: element.clone(),
            timer,
        });
        true
    }

    /// Drops any in-flight hover and forgets the last hovered element.
    pub fn reset<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.cancel_timer(scheduler);
        self.last_hovered = None;
    }

    /// Returns the element to commit if `timer` is the live hover timer.
    pub fn fire(&mut self, timer: TimerId) -> Option<DomElement> {
        match &self.pending {
            Some(pending) if pending.timer == timer => self.pending.take().map(|p| p.element),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_element(&self) -> Option<&DomElement> {
        self.pending.as_ref().map(|p| &p.element)
    }

    fn cancel_timer<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending.timer);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingInput {
    pub element: DomElement,
    pub value: String,
    timer: TimerId,
}

/// Trailing debounce for text entry. Each keystroke restarts the window; only the
/// last value is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct InputDebouncer {
    window: Duration,
    pending: Option<PendingInput>,
}

impl InputDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Records the latest value for `element` and restarts the window.
    ///
    /// If another element still had a pending value, it is handed back so the
    /// caller can commit it right away.
    pub fn keystroke<S: Scheduler>(
        &mut self,
        element: &DomElement,
        value: impl Into<String>,
        scheduler: &mut S,
    ) -> Option<PendingInput> {
        let now = scheduler.now();
        self.keystroke_at(element, value, now, scheduler)
    }

    /// Like [`InputDebouncer::keystroke`], with the window starting at `since`.
    pub fn keystroke_at<S: Scheduler>(
        &mut self,
        element: &DomElement,
        value: impl Into<String>,
        since: DateTime<Utc>,
        scheduler: &mut S,
    ) -> Option<PendingInput> {
        let flushed = match self.pending.take() {
            Some(previous) => {
                scheduler.cancel(previous.timer);
                (!previous.element.is_same_node(element)).then_some(previous)
            }
            None => None,
        };

        let timer = scheduler.schedule_at(deadline(since, self.window));
        self.pending = Some(PendingInput {
            element: element.clone(),
            value: value.into(),
            timer,
        });
        flushed
    }

    pub fn fire(&mut self, timer: TimerId) -> Option<PendingInput> {
        match &self.pending {
            Some(pending) if pending.timer == timer => self.pending.take(),
            _ => None,
        }
    }

    /// Discards the pending value without committing it.
    pub fn cancel<S: Scheduler>(&mut self, scheduler: &mut S) {
        if let Some(pending) = self.pending.take() {
            scheduler.cancel(pending.timer);
        }
    }

    pub fn pending(&self) -> Option<&PendingInput> {
        self.pending.as_ref()
    }
}
