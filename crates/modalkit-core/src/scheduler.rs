#![forbid(unsafe_code)]

//! Single-threaded task scheduler on a virtual clock.
//!
//! The scheduler is the event loop's timer queue: callbacks are deferred to
//! the next tick ([`Scheduler::defer`]) or delayed by a duration
//! ([`Scheduler::after`]). Nothing runs until the host drives the clock with
//! [`Scheduler::tick`], [`Scheduler::advance`], or [`Scheduler::pump`], so
//! scheduling from inside a callback never re-enters the caller.
//!
//! # Invariants
//!
//! - Tasks run in `(due, sequence)` order: earlier deadlines first, ties in
//!   scheduling order.
//! - While a task runs, [`Scheduler::now`] equals its due time (or the
//!   current time, whichever is later).
//! - No internal borrow is held while a task runs; tasks may schedule or
//!   cancel other tasks freely.
//! - A cancelled task never runs.
//!
//! # Failure Modes
//!
//! - A task that always re-defers itself makes `tick()` loop forever. Use
//!   `after()` with a non-zero delay for polling.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Task {
    id: TaskId,
    due: Instant,
    callback: Box<dyn FnOnce()>,
}

struct SchedulerInner {
    now: Instant,
    next_seq: u64,
    tasks: Vec<Task>,
}

/// Cloneable handle to a shared task queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("pending", &inner.tasks.len())
            .finish()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a scheduler whose clock starts at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a scheduler whose clock starts at `now`.
    #[must_use]
    pub fn starting_at(now: Instant) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                now,
                next_seq: 0,
                tasks: Vec::new(),
            })),
        }
    }

    /// Current time on the scheduler clock.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.inner.borrow().now
    }

    /// Run `callback` on the next tick.
    pub fn defer(&self, callback: impl FnOnce() + 'static) -> TaskId {
        self.after(Duration::ZERO, callback)
    }

    /// Run `callback` once `delay` has elapsed.
    pub fn after(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TaskId {
        let mut inner = self.inner.borrow_mut();
        let id = TaskId(inner.next_seq);
        inner.next_seq += 1;
        let due = inner.now + delay;
        inner.tasks.push(Task {
            id,
            due,
            callback: Box::new(callback),
        });
        id
    }

    /// Cancel a pending task. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        inner.tasks.len() != before
    }

    /// Whether a task is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner.borrow().tasks.iter().any(|t| t.id == id)
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Run everything due now (deferred callbacks and expired timers),
    /// including tasks they defer in turn.
    pub fn tick(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Move the clock forward by `delta`, running every task whose deadline
    /// falls inside the window. Returns the number of tasks run.
    pub fn advance(&self, delta: Duration) -> usize {
        let target = self.now() + delta;
        self.run_until(target)
    }

    /// Move the clock to `now` (if later than the current time) and run due
    /// tasks. This is the entry point for hosts driving a real clock.
    pub fn pump(&self, now: Instant) -> usize {
        let target = now.max(self.now());
        self.run_until(target)
    }

    /// Keep advancing to the next deadline until the queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(due) = self.next_due() {
            let target = due.max(self.now());
            ran += self.run_until(target);
        }
        ran
    }

    /// The earliest pending deadline.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.inner.borrow().tasks.iter().map(|t| t.due).min()
    }

    fn run_until(&self, target: Instant) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            (task.callback)();
            ran += 1;
        }
        self.inner.borrow_mut().now = target;
        if ran > 0 {
            tracing::trace!(ran, "scheduler ran tasks");
        }
        ran
    }

    fn pop_due(&self, target: Instant) -> Option<Task> {
        let mut inner = self.inner.borrow_mut();
        let idx = inner
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        let task = inner.tasks.swap_remove(idx);
        if task.due > inner.now {
            inner.now = task.due;
        }
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn deferred_task_waits_for_tick() {
        let sched = Scheduler::new();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        sched.defer(move || h.set(true));
        assert!(!hit.get());
        assert_eq!(sched.tick(), 1);
        assert!(hit.get());
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let sched = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, delay) in [("c", 30), ("a", 10), ("b", 20), ("a2", 10)] {
            let l = Rc::clone(&log);
            sched.after(ms(delay), move || l.borrow_mut().push(name));
        }
        sched.advance(ms(15));
        assert_eq!(*log.borrow(), ["a", "a2"]);
        sched.advance(ms(100));
        assert_eq!(*log.borrow(), ["a", "a2", "b", "c"]);
    }

    #[test]
    fn clock_reads_due_time_inside_task() {
        let start = Instant::now();
        let sched = Scheduler::starting_at(start);
        let seen = Rc::new(Cell::new(None));
        let s = sched.clone();
        let out = Rc::clone(&seen);
        sched.after(ms(250), move || out.set(Some(s.now())));
        sched.advance(ms(1000));
        assert_eq!(seen.get(), Some(start + ms(250)));
        assert_eq!(sched.now(), start + ms(1000));
    }

    #[test]
    fn chained_timers_inside_window_run() {
        let sched = Scheduler::new();
        let hit = Rc::new(Cell::new(0));
        let s = sched.clone();
        let h = Rc::clone(&hit);
        sched.after(ms(100), move || {
            h.set(h.get() + 1);
            let h2 = Rc::clone(&h);
            s.after(ms(100), move || h2.set(h2.get() + 1));
        });
        sched.advance(ms(150));
        assert_eq!(hit.get(), 1);
        sched.advance(ms(50));
        assert_eq!(hit.get(), 2);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let sched = Scheduler::new();
        let hit = Rc::new(Cell::new(false));
        let h = Rc::clone(&hit);
        let id = sched.after(ms(10), move || h.set(true));
        assert!(sched.is_pending(id));
        assert!(sched.cancel(id));
        assert!(!sched.cancel(id));
        sched.run_until_idle();
        assert!(!hit.get());
    }

    #[test]
    fn run_until_idle_drains_everything() {
        let sched = Scheduler::new();
        let count = Rc::new(Cell::new(0));
        for d in [5, 500, 5000] {
            let c = Rc::clone(&count);
            sched.after(ms(d), move || c.set(c.get() + 1));
        }
        assert_eq!(sched.run_until_idle(), 3);
        assert_eq!(count.get(), 3);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn pump_never_moves_clock_backwards() {
        let start = Instant::now();
        let sched = Scheduler::starting_at(start);
        sched.advance(ms(100));
        sched.pump(start);
        assert_eq!(sched.now(), start + ms(100));
    }

    proptest! {
        #[test]
        fn survivors_run_by_deadline_then_schedule_order(
            tasks in proptest::collection::vec((0u64..50, any::<bool>()), 1..24),
        ) {
            let sched = Scheduler::new();
            let log = Rc::new(RefCell::new(Vec::new()));
            let mut cancelled = Vec::new();
            for (seq, &(delay, cancel)) in tasks.iter().enumerate() {
                let l = Rc::clone(&log);
                let id = sched.after(ms(delay), move || l.borrow_mut().push(seq));
                if cancel {
                    cancelled.push(id);
                }
            }
            for id in cancelled {
                prop_assert!(sched.cancel(id));
            }

            let mut expected: Vec<usize> = (0..tasks.len()).filter(|&seq| !tasks[seq].1).collect();
            expected.sort_by_key(|&seq| (tasks[seq].0, seq));
            prop_assert_eq!(sched.run_until_idle(), expected.len());
            prop_assert_eq!(&*log.borrow(), &expected);
            prop_assert_eq!(sched.pending(), 0);
        }
    }
}
