//! Cancellable one-shot timers for the cooperative core.
//!
//! Nothing in the playback core blocks: every delay is a scheduled task
//! that the host pumps out with `pop_due`. Each call site keeps the
//! returned `TimerId` and cancels it when the behavior it drives is torn
//! down; a leaked handle means two chains ticking the same state.

use std::time::{Duration, Instant};

/// Handle to a scheduled task.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<T> {
    id: TimerId,
    due: Instant,
    task: T,
}

/// Pending one-shot tasks, fired in due order.
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `task` to fire once `due` has passed.
    pub fn schedule(&mut self, due: Instant, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, due, task });
        id
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: T) -> TimerId {
        self.schedule(now + delay, task)
    }

    /// Cancel a pending task. Returns false when it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Remove and return the earliest task due at or before `now`.
    /// Ties resolve in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let mut best: Option<usize> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.due > now {
                continue;
            }
            match best {
                Some(b) => {
                    let current = &self.entries[b];
                    if entry.due < current.due
                        || (entry.due == current.due && entry.id.0 < current.id.0)
                    {
                        best = Some(i);
                    }
                }
                None => best = Some(i),
            }
        }
        best.map(|i| self.entries.remove(i).task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
