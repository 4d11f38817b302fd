//=========================================================================
// Timer Queue
//=========================================================================
//
// Delayed and repeating events on a virtual clock.
//
// Architecture:
//   schedule() ──► entries ──advance(dt)──► fired (deadline, then id order)
//
// The clock only moves when the owner calls `advance`, so every delay in
// the reel is deterministic under test.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== TimerHandle =========================================================

/// Identifies a scheduled timer for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

//=== Fired ===============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    pub event: E,
    /// Virtual time the timer was due.
    pub at: Duration,
}

//=== Entry ===============================================================

#[derive(Debug)]
struct Entry<E> {
    handle: TimerHandle,
    deadline: Duration,
    interval: Option<Duration>,
    /// Remaining firings for repeating timers, `None` = unbounded.
    remaining: Option<u32>,
    event: E,
}

//=== TimerQueue ==========================================================

#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<E>>,
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|entry| entry.handle == handle)
    }

    //--- Scheduling -------------------------------------------------------

    /// Fires `event` once after `delay`.
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerHandle {
        self.push(delay, None, None, event)
    }

    /// Fires `event` after `delay`, then every `interval`.
    ///
    /// `count` bounds the total number of firings; `None` repeats until
    /// cancelled.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero or `count` is `Some(0)`.
    pub fn schedule_repeating(
        &mut self,
        delay: Duration,
        interval: Duration,
        count: Option<u32>,
        event: E,
    ) -> TimerHandle {
        assert!(!interval.is_zero(), "Repeating timer needs a non-zero interval");
        assert!(count != Some(0), "Repeating timer needs at least one firing");
        self.push(delay, Some(interval), count, event)
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.handle != handle);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn push(
        &mut self,
        delay: Duration,
        interval: Option<Duration>,
        remaining: Option<u32>,
        event: E,
    ) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            deadline: self.now + delay,
            interval,
            remaining,
            event,
        });
        handle
    }

    //--- Advancing --------------------------------------------------------

    /// Moves the clock forward and returns every event that came due,
    /// ordered by deadline and then by scheduling order. A repeating
    /// timer fires once per elapsed interval.
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired<E>> {
        self.now += dt;
        let mut fired = Vec::new();

        while let Some(index) = self.next_due() {
            let entry = &mut self.entries[index];
            let at = entry.deadline;
            let handle = entry.handle;

            let finished = match (entry.interval, entry.remaining.as_mut()) {
                (None, _) => true,
                (Some(_), Some(remaining)) if *remaining <= 1 => true,
                (Some(interval), remaining) => {
                    if let Some(remaining) = remaining {
                        *remaining -= 1;
                    }
                    entry.deadline += interval;
                    false
                }
            };

            let event = if finished {
                self.entries.remove(index).event
            } else {
                self.entries[index].event.clone()
            };
            fired.push(Fired { handle, event, at });
        }

        fired
    }

    fn next_due(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= self.now)
            .min_by_key(|(_, entry)| (entry.deadline, entry.handle))
            .map(|(index, _)| index)
    }
}

impl<E: Clone> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn events<E: Clone>(fired: Vec<Fired<E>>) -> Vec<E> {
        fired.into_iter().map(|f| f.event).collect()
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(100), "unlock");

        assert!(timers.advance(ms(99)).is_empty());
        assert_eq!(events(timers.advance(ms(1))), vec!["unlock"]);
        assert!(timers.advance(ms(1000)).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(300), "c");
        timers.schedule(ms(100), "a");
        timers.schedule(ms(100), "b");

        assert_eq!(events(timers.advance(ms(500))), vec!["a", "b", "c"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule(ms(100), 1);
        assert!(timers.is_pending(handle));
        assert!(timers.cancel(handle));
        assert!(!timers.cancel(handle));
        assert!(timers.advance(ms(200)).is_empty());
    }

    #[test]
    fn bounded_repeat_fires_exact_count() {
        let mut timers = TimerQueue::new();
        timers.schedule_repeating(ms(1000), ms(125), Some(80), "drop");

        let mut total = 0;
        for _ in 0..2000 {
            total += timers.advance(ms(16)).len();
        }
        assert_eq!(total, 80);
        assert!(timers.is_empty());
    }

    #[test]
    fn repeat_catches_up_within_one_advance() {
        let mut timers = TimerQueue::new();
        timers.schedule_repeating(ms(0), ms(100), None, ());
        let fired = timers.advance(ms(350));
        let times: Vec<_> = fired.iter().map(|f| f.at).collect();
        assert_eq!(times, vec![ms(0), ms(100), ms(200), ms(300)]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn unbounded_repeat_stops_on_cancel() {
        let mut timers = TimerQueue::new();
        let handle = timers.schedule_repeating(ms(100), ms(100), None, ());
        assert_eq!(timers.advance(ms(250)).len(), 2);
        timers.cancel(handle);
        assert!(timers.advance(ms(1000)).is_empty());
    }

    #[test]
    #[should_panic(expected = "non-zero interval")]
    fn zero_interval_is_rejected() {
        let mut timers = TimerQueue::new();
        timers.schedule_repeating(ms(0), ms(0), None, ());
    }
}
