use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::notification::PermissionStatus;
use crate::task::{Task, TaskId};
use crate::task_list::TaskList;
use crate::traits::{NotificationDispatcher, Storage};

use super::{is_due, notification_for};


/// Dispatches the notifications of due reminders, and keeps track of them in the task list.
///
/// Clones share the same task list, dispatcher and permission state.
pub struct Scheduler<S, D>
where
    S: Storage,
    D: NotificationDispatcher,
{
    tasks: Arc<Mutex<TaskList<S>>>,
    dispatcher: Arc<D>,
    cooldown: Duration,
    /// Whether the user allows notifications. This is assumed until [`Scheduler::ensure_permission`] tells otherwise
    allowed: Arc<AtomicBool>,
}

impl<S, D> Clone for Scheduler<S, D>
where
    S: Storage,
    D: NotificationDispatcher,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            dispatcher: Arc::clone(&self.dispatcher),
            cooldown: self.cooldown,
            allowed: Arc::clone(&self.allowed),
        }
    }
}

impl<S, D> Scheduler<S, D>
where
    S: Storage,
    D: NotificationDispatcher,
{
    pub fn new(tasks: Arc<Mutex<TaskList<S>>>, dispatcher: Arc<D>, cooldown: Duration) -> Self {
        Self { tasks, dispatcher, cooldown, allowed: Arc::new(AtomicBool::new(true)) }
    }

    pub fn tasks(&self) -> Arc<Mutex<TaskList<S>>> {
        Arc::clone(&self.tasks)
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn notifications_allowed(&self) -> bool {
        self.allowed.load(Ordering::SeqCst)
    }

    /// Check whether notifications are allowed, and ask the user for it if needed.
    ///
    /// A denial is not an error: reminders are simply not dispatched anymore.
    pub async fn ensure_permission(&self) -> PermissionStatus {
        let status = match self.dispatcher.permission_status().await {
            Ok(PermissionStatus::Granted) => PermissionStatus::Granted,
            Ok(_) => self.dispatcher.request_permission().await.unwrap_or_else(|err| {
                log::warn!("Unable to request the notification permission: {}", err);
                PermissionStatus::Denied
            }),
            Err(err) => {
                log::warn!("Unable to get the notification permission: {}", err);
                PermissionStatus::Denied
            },
        };

        let allowed = status == PermissionStatus::Granted;
        let was_allowed = self.allowed.swap(allowed, Ordering::SeqCst);
        if allowed == false && was_allowed {
            log::warn!("Notifications are not allowed. Task reminders will not be delivered");
        }
        status
    }

    /// Dispatch a notification for every due task, and remember it.
    ///
    /// Returns the ids of the tasks that have been notified
    pub async fn evaluate(&self, now: DateTime<Utc>) -> Vec<TaskId> {
        if self.notifications_allowed() == false {
            log::trace!("Notifications are not allowed, skipping the reminder evaluation");
            return Vec::new();
        }

        let due: Vec<Task> = {
            let tasks = self.tasks.lock().await;
            tasks.tasks().iter()
                .filter(|task| is_due(task, now, self.cooldown))
                .cloned()
                .collect()
        };
        if due.is_empty() {
            return Vec::new();
        }

        let mut notified = Vec::new();
        for task in &due {
            if self.dispatch(task, now).await {
                notified.push(task.id().clone());
            }
        }

        self.tasks.lock().await.mark_notified(&notified, now).await;
        notified
    }

    /// Set (or change) the reminder of a task, and immediately request its notification.
    ///
    /// Returns `false` in case there is no such task
    pub async fn set_reminder(&self, task_id: &str, reminder_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let updated = self.tasks.lock().await.set_reminder_date(task_id, Some(reminder_date)).await;
        let task = match updated {
            None => {
                log::warn!("Cannot set a reminder on unknown task {}", task_id);
                return false;
            },
            Some(task) => task,
        };

        if self.notifications_allowed() && self.dispatch(&task, now).await {
            self.tasks.lock().await.mark_notified(&[task.id().clone()], now).await;
        }
        true
    }

    /// Remove the reminder of a task
    pub async fn clear_reminder(&self, task_id: &str) -> bool {
        self.tasks.lock().await.set_reminder_date(task_id, None).await.is_some()
    }

    /// The user has seen a notification about this task
    pub async fn acknowledge(&self, task_id: &str, now: DateTime<Utc>) {
        let mut tasks = self.tasks.lock().await;
        if tasks.get(task_id).is_none() {
            log::debug!("Received a notification receipt for unknown task {}", task_id);
            return;
        }
        tasks.mark_notified(&[task_id.to_string()], now).await;
    }

    async fn dispatch(&self, task: &Task, now: DateTime<Utc>) -> bool {
        let notification = notification_for(task, now);
        log::debug!("Notifying task {} ({:?})", task.id(), notification.trigger);
        match self.dispatcher.schedule_notification(notification).await {
            Ok(handle) => {
                log::trace!("Notification {:?} scheduled for task {}", handle, task.id());
                true
            },
            Err(err) => {
                log::warn!("Unable to schedule a notification for task {}: {}", task.id(), err);
                false
            },
        }
    }
}
