//! Cancellable delayed actions
//!
//! Spawn pacing, preview hiding and the post-catch judge delay are scheduled
//! here instead of as free-floating callbacks. Entries fire in (due tick,
//! insertion) order, and the whole queue is cleared when a round resets so no
//! stale action can reach the next round.

use serde::{Deserialize, Serialize};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    /// Hide the challenge preview and start dropping sushi
    EndPreview,
    /// Drop the next sushi
    SpawnNext,
    /// Judge the plate once the last drop is resolved
    Judge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    /// Insertion order, breaks ties between equal due ticks
    seq: u64,
    due_tick: u64,
    action: TimerAction,
}

/// Pending timers, ordered by due tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` to fire once `now + delay_ticks` is reached
    pub fn schedule(&mut self, now: u64, delay_ticks: u64, action: TimerAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            seq,
            due_tick: now + delay_ticks,
            action,
        });
    }

    pub fn cancel_all(&mut self) {
        if !self.timers.is_empty() {
            log::debug!("Cancelling {} pending timers", self.timers.len());
        }
        self.timers.clear();
    }

    /// Remove and return every action due at or before `now`, in firing order
    pub fn drain_due(&mut self, now: u64) -> Vec<TimerAction> {
        let mut due: Vec<Timer> = Vec::new();
        self.timers.retain(|t| {
            if t.due_tick <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due_tick, t.seq));
        due.into_iter().map(|t| t.action).collect()
    }

    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.timers.iter().any(|t| t.action == action)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(0, 30, TimerAction::Judge);
        q.schedule(0, 10, TimerAction::SpawnNext);
        q.schedule(0, 10, TimerAction::EndPreview);

        assert!(q.drain_due(5).is_empty());
        assert_eq!(
            q.drain_due(10),
            vec![TimerAction::SpawnNext, TimerAction::EndPreview]
        );
        assert_eq!(q.len(), 1);
        assert_eq!(q.drain_due(100), vec![TimerAction::Judge]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_drained_timers_fire_once() {
        let mut q = TimerQueue::new();
        q.schedule(0, 10, TimerAction::SpawnNext);
        assert_eq!(q.drain_due(10), vec![TimerAction::SpawnNext]);
        assert!(q.drain_due(20).is_empty());
    }

    #[test]
    fn test_cancel_all_prevents_stale_fire() {
        let mut q = TimerQueue::new();
        q.schedule(0, 60, TimerAction::SpawnNext);
        q.schedule(0, 120, TimerAction::Judge);
        q.cancel_all();
        assert!(q.drain_due(u64::MAX).is_empty());
        assert!(!q.is_pending(TimerAction::SpawnNext));
    }
}
