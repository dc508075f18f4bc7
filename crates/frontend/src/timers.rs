use std::time::Duration;

use gloo_timers::callback::Timeout;
use map_comment_shared::scheduler::{Scheduler, Task};

/// Runs tasks through `setTimeout`, yielding to the browser between them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        // Cancellation is handled by the caller's token; the timeout just fires.
        Timeout::new(millis, task).forget();
    }
}
