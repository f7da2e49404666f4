//! Cooperative task scheduling for the single-threaded engine.
//!
//! Nothing here sleeps. Work is recorded as a [`Task`] with a deadline (or
//! for the next frame) and handed back by [`Scheduler::due`] when the host
//! ticks. Deadlines are hints: a late tick simply runs everything overdue.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Release the global dragging gate after a drag or resize stop.
    SettleDrag,
    /// Readiness poll before the one-shot push that follows entering edit
    /// mode. `attempt` counts polls already made.
    EnterEditPush { attempt: u8 },
    /// Run every queued push that was deferred to this frame.
    FlushFrame,
}

#[derive(Debug)]
struct Delayed {
    deadline: Instant,
    seq: u64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    delayed: Vec<Delayed>,
    frame: Vec<Task>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_after(&mut self, now: Instant, delay: Duration, task: Task) {
        self.seq += 1;
        self.delayed.push(Delayed {
            deadline: now + delay,
            seq: self.seq,
            task,
        });
    }

    /// Run `task` on the next tick. Identical frame tasks collapse.
    pub fn next_frame(&mut self, task: Task) {
        if !self.frame.contains(&task) {
            self.frame.push(task);
        }
    }

    /// Take every task that should run at `now`: frame tasks first, then
    /// overdue delayed tasks by deadline and insertion order.
    pub fn due(&mut self, now: Instant) -> Vec<Task> {
        let mut ready: Vec<Task> = std::mem::take(&mut self.frame);

        let (mut overdue, pending): (Vec<Delayed>, Vec<Delayed>) = std::mem::take(&mut self.delayed)
            .into_iter()
            .partition(|d| d.deadline <= now);
        self.delayed = pending;
        overdue.sort_by_key(|d| (d.deadline, d.seq));
        ready.extend(overdue.into_iter().map(|d| d.task));
        ready
    }

    /// Drop a pending task. Returns whether one was found.
    pub fn cancel(&mut self, task: &Task) -> bool {
        self.cancel_where(|t| t == task) > 0
    }

    /// Drop every pending task matching `pred`; returns how many went.
    pub fn cancel_where(&mut self, pred: impl Fn(&Task) -> bool) -> usize {
        let before = self.len();
        self.delayed.retain(|d| !pred(&d.task));
        self.frame.retain(|t| !pred(t));
        before - self.len()
    }

    pub fn is_scheduled(&self, task: &Task) -> bool {
        self.frame.contains(task) || self.delayed.iter().any(|d| &d.task == task)
    }

    pub fn len(&self) -> usize {
        self.delayed.len() + self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.delayed.clear();
        self.frame.clear();
    }
}

/// What must be true before the entering push may run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub hydrated: bool,
    pub measured: bool,
}

impl Readiness {
    pub fn is_ready(&self, library_ready: bool) -> bool {
        self.hydrated && self.measured && library_ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_tasks_run_on_next_tick_and_collapse() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        scheduler.next_frame(Task::FlushFrame);
        scheduler.next_frame(Task::FlushFrame);
        assert_eq!(scheduler.due(now), vec![Task::FlushFrame]);
        assert!(scheduler.due(now).is_empty());
    }

    #[test]
    fn delayed_tasks_wait_for_deadline_in_order() {
        let mut scheduler = Scheduler::new();
        let start = Instant::now();
        scheduler.schedule_after(start, Duration::from_millis(100), Task::EnterEditPush { attempt: 0 });
        scheduler.schedule_after(start, Duration::from_millis(50), Task::SettleDrag);

        assert!(scheduler.due(start + Duration::from_millis(10)).is_empty());
        assert_eq!(
            scheduler.due(start + Duration::from_millis(60)),
            vec![Task::SettleDrag]
        );
        // late tick still runs the overdue task
        assert_eq!(
            scheduler.due(start + Duration::from_secs(5)),
            vec![Task::EnterEditPush { attempt: 0 }]
        );
        assert!(scheduler.is_empty());
    }

    #[test]
    fn cancel_and_clear() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        scheduler.schedule_after(now, Duration::from_millis(50), Task::SettleDrag);
        scheduler.next_frame(Task::FlushFrame);
        assert!(scheduler.is_scheduled(&Task::SettleDrag));
        assert!(scheduler.cancel(&Task::SettleDrag));
        assert!(!scheduler.cancel(&Task::SettleDrag));
        assert_eq!(scheduler.len(), 1);
        scheduler.schedule_after(now, Duration::ZERO, Task::EnterEditPush { attempt: 3 });
        assert_eq!(
            scheduler.cancel_where(|t| matches!(t, Task::EnterEditPush { .. })),
            1
        );
        scheduler.clear();
        assert!(scheduler.is_empty());
    }

    #[test]
    fn readiness_needs_all_three() {
        let mut readiness = Readiness::default();
        assert!(!readiness.is_ready(true));
        readiness.hydrated = true;
        readiness.measured = true;
        assert!(!readiness.is_ready(false));
        assert!(readiness.is_ready(true));
    }
}
