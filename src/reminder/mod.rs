//! Task reminders
//!
//! A task with a reminder is notified once its reminder time has passed, then again every `cooldown` until it is marked as done (or until the user acknowledges a notification, which restarts the cooldown). \
//! The decisions only depend on the state of the task and on the current time, so that evaluating them more often than needed never notifies more than once per cooldown.
//!
//! * [`Scheduler`] applies these decisions: it dispatches notifications and stamps tasks
//! * [`Ticker`] owns the recurring cadence, and re-runs the scheduler whenever the task list changes

use chrono::{DateTime, Duration, Utc};

use crate::notification::{Notification, ReminderPayload, Trigger};
use crate::task::Task;

mod scheduler;
pub use scheduler::Scheduler;
mod ticker;
pub use ticker::{ticker, Ticker, TickerHandle};

/// How long to wait before notifying the same task again
pub fn default_cooldown() -> Duration {
    Duration::hours(2)
}

/// How often reminders are evaluated, unless configured otherwise
pub fn default_poll_period() -> std::time::Duration {
    std::time::Duration::from_secs(5 * 60)
}

/// Where a task stands in its reminder cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderState {
    /// No reminder
    Unscheduled,
    /// The reminder time is not reached yet
    Pending,
    /// A notification should be dispatched now
    Due,
    /// A notification has been dispatched, and the cooldown is not over
    Notified,
    /// The task is done, it will never be notified
    Inactive,
}

pub fn reminder_state(task: &Task, now: DateTime<Utc>, cooldown: Duration) -> ReminderState {
    if task.done() {
        return ReminderState::Inactive;
    }
    let reminder_date = match task.reminder_date() {
        None => return ReminderState::Unscheduled,
        Some(date) => date,
    };
    if now < reminder_date {
        return ReminderState::Pending;
    }
    match task.last_notified_at() {
        Some(last) if now - last < cooldown => ReminderState::Notified,
        _ => ReminderState::Due,
    }
}

/// Whether a notification should be dispatched for this task right now
pub fn is_due(task: &Task, now: DateTime<Utc>, cooldown: Duration) -> bool {
    reminder_state(task, now, cooldown) == ReminderState::Due
}

/// The notification that reminds of a task.
///
/// It is delivered at the reminder time of the task, or immediately if that is already past
pub fn notification_for(task: &Task, now: DateTime<Utc>) -> Notification {
    let when = task.reminder_date().unwrap_or(now);
    Notification {
        title: format!("Reminder: {}", task.text()),
        body: String::from("You have a task to do."),
        payload: ReminderPayload { task_id: task.id().clone() },
        trigger: Trigger::for_instant(when, now),
    }
}
