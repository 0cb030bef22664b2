//! Cooperative timer queue.
//!
//! Everything that "waits" in capsule is an entry in a [`TimerQueue`]: the
//! periodic sweep, per-task animation frames, disposal delays. Nothing runs on
//! its own; the owner drains due entries with [`TimerQueue::pop_due`] from its
//! event loop turn.
//!
//! Cancellation is lazy. A cancelled entry is dropped from the pending map and
//! its heap node is skipped when it surfaces.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Identity of one scheduled entry. Never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Min-heap of `(due_ms, id)` plus the job payload for each live id.
#[derive(Debug)]
pub struct TimerQueue<J> {
    heap: BinaryHeap<Reverse<(u64, TimerId)>>,
    pending: HashMap<TimerId, J>,
    next_id: u64,
}

impl<J> Default for TimerQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}

impl<J> TimerQueue<J> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `job` to become due at `due_ms`.
    ///
    /// Entries with equal due times fire in scheduling order.
    pub fn schedule_at(&mut self, due_ms: u64, job: J) -> TimerHandle {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((due_ms, id)));
        self.pending.insert(id, job);
        TimerHandle(Some(id))
    }

    /// Drop a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Pop the earliest entry due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, u64, J)> {
        while let Some(Reverse((due, id))) = self.heap.peek().copied() {
            if due > now_ms {
                return None;
            }
            self.heap.pop();
            if let Some(job) = self.pending.remove(&id) {
                return Some((id, due, job));
            }
        }
        None
    }

    /// Due time of the earliest live entry.
    pub fn next_due(&mut self) -> Option<u64> {
        while let Some(Reverse((due, id))) = self.heap.peek().copied() {
            if self.pending.contains_key(&id) {
                return Some(due);
            }
            self.heap.pop();
        }
        None
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Number of live (uncancelled, unfired) entries.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.pending.clear();
    }
}

/// Owned reference to at most one scheduled entry.
///
/// Dropping a handle does not cancel the entry; owners cancel explicitly so
/// a superseded task can never be touched by a stale callback.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TimerHandle(Option<TimerId>);

impl TimerHandle {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn id(&self) -> Option<TimerId> {
        self.0
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    /// Cancel the referenced entry, if any, and disarm the handle.
    pub fn cancel<J>(&mut self, queue: &mut TimerQueue<J>) -> bool {
        match self.0.take() {
            Some(id) => queue.cancel(id),
            None => false,
        }
    }

    /// Disarm after the referenced entry fired. Ignores other ids.
    pub fn fired(&mut self, id: TimerId) {
        if self.0 == Some(id) {
            self.0 = None;
        }
    }

    /// Cancel whatever is referenced and take ownership of `next`.
    pub fn replace<J>(&mut self, queue: &mut TimerQueue<J>, next: TimerHandle) {
        self.cancel(queue);
        *self = next;
    }
}
