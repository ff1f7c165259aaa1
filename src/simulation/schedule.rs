//! Virtual clock and the queue of delayed spawn work.
//!
//! Nothing here runs on its own: the owner advances the clock and pops whatever
//! became due, in due-time order and then in scheduling order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::atomic::{self, AtomicBool};
use std::sync::Arc;
use std::time::Duration;

use bevy::math::Vec2;

/// Shared cancellation flag for a repeating task.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, atomic::Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(atomic::Ordering::Relaxed)
    }
}

/// Delayed work. Positions and categories that depend on randomness are drawn when the
/// action fires, not when it is scheduled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingAction {
    /// One bean of a burst, jittered around `origin`.
    BurstBean { origin: Vec2 },
    /// One bean of a shower, random x at the top edge.
    ShowerBean,
    /// Start a whole shower (page-load shower).
    Shower { count: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Duration,
    seq: u64,
    action: PendingAction,
}

impl Pending {
    fn key(&self) -> (Duration, u64) {
        (self.due, self.seq)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    now: Duration,
    /// Min-heap on `(due, seq)`; equal dues pop in scheduling order.
    pending: BinaryHeap<Reverse<Pending>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    pub fn schedule(&mut self, delay: Duration, action: PendingAction) {
        self.schedule_at(self.now + delay, action);
    }

    pub fn schedule_at(&mut self, due: Duration, action: PendingAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Reverse(Pending { due, seq, action }));
    }

    /// Earliest action whose due time has been reached, with that due time.
    pub fn pop_due(&mut self) -> Option<(Duration, PendingAction)> {
        match self.pending.peek() {
            Some(Reverse(p)) if p.due <= self.now => {
                let Reverse(p) = self.pending.pop()?;
                Some((p.due, p.action))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// The self-rescheduling ambient spawn loop.
#[derive(Debug, Clone)]
pub(crate) struct AmbientTask {
    pub token: CancelToken,
    pub next_due: Duration,
}
