//! Deferred events scheduled against the simulation clock
//!
//! Nothing blocks: callers push an event with a delay and collect it from
//! `advance` once enough simulated time has passed. Dropping or clearing the
//! queue cancels everything still pending.

/// Events the level schedules for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// The goal celebration window is over
    EndCelebration,
    /// Finish the level and move on
    CompleteLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    fire_at: f64,
    event: T,
}

#[derive(Debug)]
pub struct TimerQueue<T> {
    now: f64,
    next_id: u64,
    /// Kept in schedule order; ties fire in that order
    pending: Vec<Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Schedule `event` to fire `delay` seconds from now
    pub fn schedule(&mut self, delay: f32, event: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            fire_at: self.now + f64::from(delay.max(0.0)),
            event,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Drop every pending event; returns how many were cancelled
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Move the clock forward and return due events, earliest first.
    /// Non-positive `dt` never fires anything.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        if dt <= 0.0 {
            return Vec::new();
        }
        self.now += f64::from(dt);

        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.fire_at <= now);
        self.pending = waiting;
        // Stable sort keeps schedule order among equal deadlines
        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at));
        due.into_iter().map(|p| p.event).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
