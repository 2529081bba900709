use super::timer::{TimerId, TimerQueue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shared scheduler handle; animations and the host loop hold clones.
pub type SharedScheduler = Rc<AnimationScheduler>;

type Completion = Box<dyn FnOnce()>;

/// Longest delay a completion can be scheduled for.
const MAX_DELAY: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[derive(Default)]
struct SchedulerState {
    timers: TimerQueue,
    pending: HashMap<TimerId, Completion>,
    next_id: u64,
}

/// Runs deferred animation completions when the host advances time.
///
/// No internal borrow is held while a completion runs, so completions may
/// schedule further work.
#[derive(Default)]
pub struct AnimationScheduler {
    state: RefCell<SchedulerState>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedScheduler {
        Rc::new(Self::new())
    }

    /// Schedule `completion` to run once `delay` has elapsed from now.
    /// Delays longer than a year are clamped to one.
    pub fn schedule(&self, delay: Duration, completion: impl FnOnce() + 'static) -> TimerId {
        let now = Instant::now();
        let wake_time = now.checked_add(delay.min(MAX_DELAY)).unwrap_or(now);
        self.schedule_at(wake_time, completion)
    }

    pub fn schedule_at(&self, wake_time: Instant, completion: impl FnOnce() + 'static) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id);
        state.next_id += 1;
        state.timers.schedule(id, wake_time);
        state.pending.insert(id, Box::new(completion));
        id
    }

    /// Run every completion due at `now`. Returns how many ran.
    pub fn tick(&self, now: Instant) -> usize {
        let ready = {
            let mut state = self.state.borrow_mut();
            let ids = state.timers.pop_ready(now);
            take_completions(&mut state, ids)
        };
        run(ready)
    }

    /// Run every pending completion, including ones scheduled while finishing.
    pub fn finish_all(&self) -> usize {
        let mut total = 0;
        loop {
            let ready = {
                let mut state = self.state.borrow_mut();
                let ids = state.timers.drain();
                take_completions(&mut state, ids)
            };
            if ready.is_empty() {
                return total;
            }
            total += run(ready);
        }
    }

    pub fn next_wake_time(&self) -> Option<Instant> {
        self.state.borrow().timers.peek_wake_time()
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }
}

fn take_completions(state: &mut SchedulerState, ids: Vec<TimerId>) -> Vec<Completion> {
    ids.into_iter()
        .filter_map(|id| state.pending.remove(&id))
        .collect()
}

fn run(completions: Vec<Completion>) -> usize {
    let count = completions.len();
    for completion in completions {
        completion();
    }
    if count > 0 {
        tracing::trace!(count, "animation completions ran");
    }
    count
}
