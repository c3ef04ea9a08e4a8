use std::time::{Duration, Instant};

/// A single cancellable deferred task.
///
/// Scheduling replaces whatever is pending, so a burst of triggers inside the
/// quiet period yields one run, `delay` after the last trigger. The owner
/// polls it from its event loop; nothing runs on another thread.
#[derive(Debug)]
pub struct Debouncer<T> {
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    task: T,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `task` to run `delay` after `now`. Returns true when this
    /// cancelled an earlier pending task.
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> bool {
        self.pending
            .replace(Pending {
                deadline: now + delay,
                task,
            })
            .is_some()
    }

    pub fn cancel_pending(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.task)
    }

    /// How long the event loop may sleep before the pending task is due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(now))
    }

    /// Hand out the pending task once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.cancel_pending(),
            _ => None,
        }
    }
}
