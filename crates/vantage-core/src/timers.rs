//! Pending timed actions keyed by the thing that owns them.
//!
//! The runner never sleeps: it asks for `next_deadline`, arms one native
//! timeout, and calls `drain_due` when it fires. Cancelling an owner drops
//! all of its entries, so a stale wake-up simply finds nothing to do.

use web_time::Instant;

struct Timer<K, A> {
    deadline: Instant,
    seq: u64,
    owner: K,
    action: A,
}

pub struct TimerQueue<K, A> {
    entries: Vec<Timer<K, A>>,
    seq: u64,
}

impl<K, A> Default for TimerQueue<K, A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            seq: 0,
        }
    }
}

impl<K: PartialEq, A> TimerQueue<K, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, owner: K, deadline: Instant, action: A) {
        let seq = self.seq;
        self.seq += 1;
        self.entries.push(Timer {
            deadline,
            seq,
            owner,
            action,
        });
    }

    /// Drops every pending entry of `owner`; returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: &K) -> usize {
        let before = self.entries.len();
        self.entries.retain(|t| t.owner != *owner);
        let n = before - self.entries.len();
        if n > 0 {
            log::trace!("cancelled {n} pending timer(s)");
        }
        n
    }

    pub fn has_pending(&self, owner: &K) -> bool {
        self.entries.iter().any(|t| t.owner == *owner)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|t| t.deadline).min()
    }

    /// Removes and returns every entry due at `now`, earliest first; entries
    /// sharing a deadline come out in scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(K, A)> {
        let (mut due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|t| t.deadline <= now);
        self.entries = rest;
        due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| (t.owner, t.action)).collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
