use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Identifies one scheduled completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

/// Timer entry with wake time and the completion it fires
#[derive(Debug, Clone)]
pub struct Timer {
    pub wake_time: Instant,
    pub id: TimerId,
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.wake_time == other.wake_time && self.id == other.id
    }
}

impl Eq for Timer {}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap; equal wake times fire in scheduling order
        other
            .wake_time
            .cmp(&self.wake_time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Min-heap of pending completions keyed by wake time
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn schedule(&mut self, id: TimerId, wake_time: Instant) {
        self.heap.push(Timer { wake_time, id });
    }

    /// Get the next wake time without removing the timer
    pub fn peek_wake_time(&self) -> Option<Instant> {
        self.heap.peek().map(|timer| timer.wake_time)
    }

    /// Pop all timers that are ready (wake_time <= now), earliest first
    pub fn pop_ready(&mut self, now: Instant) -> Vec<TimerId> {
        let mut ready = Vec::new();
        while self.heap.peek().is_some_and(|timer| timer.wake_time <= now) {
            if let Some(timer) = self.heap.pop() {
                ready.push(timer.id);
            }
        }
        ready
    }

    /// Pop every timer regardless of wake time, earliest first
    pub fn drain(&mut self) -> Vec<TimerId> {
        let mut all = Vec::with_capacity(self.heap.len());
        while let Some(timer) = self.heap.pop() {
            all.push(timer.id);
        }
        all
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timer_ordering() {
        let now = Instant::now();
        let later = Timer {
            wake_time: now + Duration::from_millis(100),
            id: TimerId(1),
        };
        let sooner = Timer {
            wake_time: now + Duration::from_millis(50),
            id: TimerId(2),
        };

        // Earlier wake time has the higher priority
        assert!(sooner > later);
    }

    #[test]
    fn test_timer_queue_order() {
        let now = Instant::now();
        let mut queue = TimerQueue::new();

        queue.schedule(TimerId(1), now + Duration::from_millis(300));
        queue.schedule(TimerId(2), now + Duration::from_millis(100));
        queue.schedule(TimerId(3), now + Duration::from_millis(200));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop_ready(now + Duration::from_millis(150)), vec![TimerId(2)]);
        assert_eq!(queue.pop_ready(now + Duration::from_millis(250)), vec![TimerId(3)]);
        assert_eq!(queue.pop_ready(now + Duration::from_millis(350)), vec![TimerId(1)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_wake_times_fire_in_schedule_order() {
        let now = Instant::now();
        let mut queue = TimerQueue::new();
        for id in [4, 1, 3, 2] {
            queue.schedule(TimerId(id), now);
        }

        assert_eq!(
            queue.pop_ready(now),
            vec![TimerId(1), TimerId(2), TimerId(3), TimerId(4)]
        );
    }

    #[test]
    fn test_peek_and_drain() {
        let now = Instant::now();
        let mut queue = TimerQueue::new();
        assert!(queue.peek_wake_time().is_none());

        queue.schedule(TimerId(1), now + Duration::from_secs(10));
        queue.schedule(TimerId(2), now + Duration::from_secs(5));
        assert_eq!(queue.peek_wake_time(), Some(now + Duration::from_secs(5)));

        assert_eq!(queue.drain(), vec![TimerId(2), TimerId(1)]);
        assert!(queue.is_empty());
    }
}
