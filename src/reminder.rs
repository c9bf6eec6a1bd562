//! Minute-granularity reminders for incomplete tasks.
//!
//! Once per period the monitor reads the live task list, truncates "now" and
//! every task time to their minute bucket, and raises a [`Reminder`] for each
//! incomplete task whose bucket equals the current one. A minute the timer
//! sleeps through is never replayed.

use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::models::{Task, TaskId};
use crate::utils::{local_now, minute_bucket, parse_task_time};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Source of the current local wall-clock time
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        local_now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: Option<TaskId>,
    pub title: String,
    pub due: NaiveDateTime,
}

impl Reminder {
    pub fn message(&self) -> String {
        format!("Time to start: {}", self.title)
    }
}

/// Incomplete tasks scheduled in the same minute as `now`
pub fn due_reminders(tasks: &[Task], now: NaiveDateTime) -> Vec<Reminder> {
    let bucket = minute_bucket(now);
    tasks
        .iter()
        .filter(|task| !task.completed)
        .filter_map(|task| {
            let due = minute_bucket(parse_task_time(&task.time)?);
            (due == bucket).then(|| Reminder {
                task_id: task.id.clone(),
                title: task.title.clone(),
                due,
            })
        })
        .collect()
}

pub struct ReminderMonitor<C: Clock = LocalClock> {
    tasks: watch::Receiver<Vec<Task>>,
    clock: C,
    period: Duration,
    notify: mpsc::UnboundedSender<Reminder>,
    current_bucket: Option<NaiveDateTime>,
    notified: HashSet<(Option<TaskId>, String)>,
}

impl ReminderMonitor<LocalClock> {
    pub fn new(tasks: watch::Receiver<Vec<Task>>, notify: mpsc::UnboundedSender<Reminder>) -> Self {
        Self::with_clock(tasks, notify, LocalClock)
    }
}

impl<C: Clock> ReminderMonitor<C> {
    pub fn with_clock(
        tasks: watch::Receiver<Vec<Task>>,
        notify: mpsc::UnboundedSender<Reminder>,
        clock: C,
    ) -> Self {
        Self {
            tasks,
            clock,
            period: DEFAULT_PERIOD,
            notify,
            current_bucket: None,
            notified: HashSet::new(),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run one scan against the live list. Returns how many reminders were sent.
    ///
    /// A task already reminded about in the current minute is skipped, so a
    /// timer that fires twice inside one minute does not alert twice.
    pub fn check(&mut self) -> usize {
        let now = self.clock.now();
        let bucket = minute_bucket(now);
        if self.current_bucket != Some(bucket) {
            self.current_bucket = Some(bucket);
            self.notified.clear();
        }

        let due = {
            let tasks = self.tasks.borrow();
            due_reminders(&tasks, now)
        };

        let mut sent = 0;
        for reminder in due {
            let key = (reminder.task_id.clone(), reminder.title.clone());
            if !self.notified.insert(key) {
                continue;
            }
            info!(title = %reminder.title, due = %reminder.due, "task reminder");
            if self.notify.send(reminder).is_ok() {
                sent += 1;
            }
        }
        sent
    }

    /// Start ticking. The first scan happens one period from now.
    /// Dropping the returned handle stops the timer.
    pub fn start(mut self) -> ReminderHandle {
        let task = tokio::spawn(async move {
            debug!(period_secs = self.period.as_secs(), "reminder monitor started");
            let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if self.notify.is_closed() {
                    debug!("reminder receiver gone, stopping monitor");
                    break;
                }
                self.check();
            }
        });
        ReminderHandle { task: Some(task) }
    }
}

/// Owns the running monitor; the timer lives exactly as long as this handle.
pub struct ReminderHandle {
    task: Option<JoinHandle<()>>,
}

impl ReminderHandle {
    pub fn cancel(mut self) {
        self.stop();
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("reminder monitor cancelled");
        }
    }
}

impl Drop for ReminderHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
