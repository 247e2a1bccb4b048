//! Single-shot timers on the runtime's virtual clock
//!
//! Every timer is stamped with the generation it was scheduled under. The
//! runtime bumps its generation whenever the level restarts or is replaced,
//! so a timer that survives a reset is recognised as stale and dropped.

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What happens when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Death cue finished: restart the current level
    RestartLevel,
    /// Win cue finished: generate the next level
    NextLevel,
    /// One second of the trap countdown elapsed
    TrapTick,
    /// Hear cue finished: accept hear requests again
    HearFinished,
}

#[derive(Debug, Clone, Copy)]
pub struct Scheduled {
    pub id: TimerId,
    pub due_ms: u64,
    pub generation: u64,
    pub event: TimerEvent,
}

/// Pending timers, fired earliest first (ties in scheduling order)
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<Scheduled>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, generation: u64, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled {
            id,
            due_ms,
            generation,
            event,
        });
        id
    }

    /// Returns false if the timer already fired or was cancelled
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|t| t.due_ms).min()
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Scheduled> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id.0))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(idx))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
