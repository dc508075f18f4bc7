//! Deferred execution on the host's event loop.
//!
//! Nothing here blocks: a task is handed to the scheduler and the caller
//! returns immediately. Cancellation is cooperative through `CancelToken`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Run `task` once, no earlier than `delay` from now.
    fn schedule(&self, delay: Duration, task: Task);
}

/// Shared flag checked by a task chain before doing any more work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

/// Virtual-time scheduler. Tasks run only from `advance`/`run_until_idle`,
/// in due-time order (FIFO among equal due times).
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Duration>,
    seq: Cell<u64>,
    queue: RefCell<Vec<Pending>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move virtual time forward by `by`, running every task that falls due,
    /// including ones scheduled by tasks run along the way.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(pending) = self.pop_due(target) {
            self.now.set(pending.due);
            (pending.task)();
        }
        self.now.set(target);
    }

    /// Run tasks until the queue is empty. Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(pending) = self.pop_due(Duration::MAX) {
            self.now.set(pending.due);
            (pending.task)();
            ran += 1;
        }
        ran
    }

    fn pop_due(&self, limit: Duration) -> Option<Pending> {
        let mut queue = self.queue.borrow_mut();
        let idx = queue
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= limit)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;
        Some(queue.swap_remove(idx))
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.queue.borrow_mut().push(Pending {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_run_in_due_order() {
        let sched = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(30, "c"), (10, "a"), (20, "b")] {
            let log = log.clone();
            sched.schedule(
                Duration::from_millis(delay),
                Box::new(move || log.borrow_mut().push(name)),
            );
        }
        sched.advance(Duration::from_millis(25));
        assert_eq!(log.borrow().as_slice(), ["a", "b"]);
        assert_eq!(sched.pending(), 1);
        sched.advance(Duration::from_millis(5));
        assert_eq!(log.borrow().as_slice(), ["a", "b", "c"]);
    }

    #[test]
    fn test_rescheduled_tasks_run_within_same_advance() {
        let sched = Rc::new(ManualScheduler::new());
        let count = Rc::new(Cell::new(0));

        fn tick(sched: Rc<ManualScheduler>, count: Rc<Cell<u32>>) {
            count.set(count.get() + 1);
            if count.get() < 5 {
                let s = sched.clone();
                sched.schedule(Duration::from_millis(15), Box::new(move || tick(s, count)));
            }
        }

        let s = sched.clone();
        let c = count.clone();
        sched.schedule(Duration::from_millis(15), Box::new(move || tick(s, c)));
        sched.advance(Duration::from_millis(75));
        assert_eq!(count.get(), 5);
        assert_eq!(sched.now(), Duration::from_millis(75));
    }

    #[test]
    fn test_not_yet_due_tasks_wait() {
        let sched = ManualScheduler::new();
        let ran = Rc::new(Cell::new(false));
        let r = ran.clone();
        sched.schedule(Duration::from_millis(15), Box::new(move || r.set(true)));
        sched.advance(Duration::from_millis(14));
        assert!(!ran.get());
        sched.advance(Duration::from_millis(1));
        assert!(ran.get());
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_run_until_idle_counts() {
        let sched = ManualScheduler::new();
        sched.schedule(Duration::from_millis(1), Box::new(|| {}));
        sched.schedule(Duration::from_millis(2), Box::new(|| {}));
        assert_eq!(sched.run_until_idle(), 2);
        assert_eq!(sched.pending(), 0);
    }
}
