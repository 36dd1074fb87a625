//! The to-do list, backed by a [`Storage`]

use chrono::{DateTime, Utc};

use crate::error::{BoxError, ValidationError};
use crate::settings::TASKS_KEY;
use crate::task::{Task, TaskId};
use crate::traits::Storage;


/// The list of tasks. Every mutation is written back to the storage
#[derive(Debug)]
pub struct TaskList<S: Storage> {
    storage: S,
    tasks: Vec<Task>,
}

impl<S: Storage> TaskList<S> {
    /// Load the list from its storage. Missing or corrupt data gives an empty list
    pub async fn load(storage: S) -> Self {
        let tasks = match storage.get_item(TASKS_KEY).await {
            Err(err) => {
                log::warn!("Unable to read stored tasks: {}. Starting with no task", err);
                Vec::new()
            },
            Ok(None) => Vec::new(),
            Ok(Some(content)) => serde_json::from_str(&content).unwrap_or_else(|err| {
                log::warn!("Invalid stored tasks: {}. Starting with no task", err);
                Vec::new()
            }),
        };
        Self { storage, tasks }
    }

    pub fn new(storage: S) -> Self {
        Self { storage, tasks: Vec::new() }
    }

    pub async fn persist(&self) -> Result<(), BoxError> {
        let content = serde_json::to_string(&self.tasks)?;
        self.storage.set_item(TASKS_KEY, &content).await
    }

    async fn persist_or_warn(&self) {
        if let Err(err) = self.persist().await {
            log::warn!("Unable to save tasks: {}", err);
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Add a new task. Its text is trimmed, and must not be empty
    pub async fn add_task(&mut self, text: &str, now: DateTime<Utc>) -> Result<TaskId, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyTaskText);
        }

        let mut created_at = now;
        while self.get(&created_at.timestamp_millis().to_string()).is_some() {
            created_at = created_at + chrono::Duration::milliseconds(1);
        }
        let task = Task::new(text.to_string(), created_at);
        let id = task.id().clone();
        self.tasks.push(task);

        self.persist_or_warn().await;
        Ok(id)
    }

    /// Flip the "done" flag of a task. Returns its new value, or `None` if there is no such task
    pub async fn toggle_done(&mut self, id: &str) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id() == id)?;
        let done = task.done() == false;
        task.set_done(done);

        self.persist_or_warn().await;
        Some(done)
    }

    /// Delete a task. This is a no-op if it does not exist
    pub async fn delete_task(&mut self, id: &str) {
        let count_before = self.tasks.len();
        self.tasks.retain(|task| task.id() != id);
        if self.tasks.len() != count_before {
            self.persist_or_warn().await;
        }
    }

    /// Set (or remove) the reminder of a task. This restarts its notification cycle.
    ///
    /// Returns the updated task, or `None` if there is no such task
    pub async fn set_reminder_date(&mut self, id: &str, reminder_date: Option<DateTime<Utc>>) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id() == id)?;
        task.set_reminder_date(reminder_date);
        let updated = task.clone();

        self.persist_or_warn().await;
        Some(updated)
    }

    /// Stamp the last notification time of several tasks at once. Unknown ids are ignored
    pub async fn mark_notified(&mut self, ids: &[TaskId], at: DateTime<Utc>) {
        let mut changed = false;
        for task in self.tasks.iter_mut().filter(|task| ids.contains(task.id())) {
            task.mark_notified(at);
            changed = true;
        }
        if changed {
            self.persist_or_warn().await;
        }
    }

    /// Tasks still to do: the ones without a reminder, and the ones reminded today
    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.tasks.iter()
            .filter(|task| task.done() == false)
            .filter(|task| match task.reminder_date() {
                None => true,
                Some(date) => is_same_day(date, now),
            })
            .collect()
    }

    pub fn done(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.done()).collect()
    }

    /// Undone tasks with a reminder today
    pub fn today_reminders(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.reminders(|date| is_same_day(date, now))
    }

    /// Undone tasks with a reminder on another day than today
    pub fn upcoming_reminders(&self, now: DateTime<Utc>) -> Vec<&Task> {
        self.reminders(|date| is_same_day(date, now) == false)
    }

    fn reminders<F: Fn(DateTime<Utc>) -> bool>(&self, day_filter: F) -> Vec<&Task> {
        self.tasks.iter()
            .filter(|task| task.done() == false)
            .filter(|task| task.reminder_date().map(&day_filter).unwrap_or(false))
            .collect()
    }

    /// The share of tasks that are done, between 0 and 1 (0 for an empty list)
    pub fn completion_ratio(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.done().len() as f64 / self.tasks.len() as f64
    }
}

fn is_same_day(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    date.date_naive() == now.date_naive()
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use crate::storage::MemoryStorage;

    #[tokio::test]
    async fn task_crud() {
        let storage = MemoryStorage::new();
        let mut list = TaskList::load(storage.clone()).await;
        let now = Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap();

        assert_eq!(list.add_task("   ", now).await, Err(ValidationError::EmptyTaskText));
        let id = list.add_task("  Buy a calculator ", now).await.unwrap();
        let other = list.add_task("Print the report", now).await.unwrap();
        assert_ne!(id, other);
        assert_eq!(list.get(&id).unwrap().text(), "Buy a calculator");

        assert_eq!(list.toggle_done(&id).await, Some(true));
        assert_eq!(list.toggle_done("nope").await, None);
        assert_eq!(list.completion_ratio(), 0.5);

        let reloaded = TaskList::load(storage.clone()).await;
        assert_eq!(reloaded.tasks(), list.tasks());

        list.delete_task(&id).await;
        list.delete_task(&id).await;
        assert_eq!(list.tasks().len(), 1);
    }

    #[tokio::test]
    async fn task_views() {
        let mut list = TaskList::new(MemoryStorage::new());
        let now = Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap();

        let plain = list.add_task("No reminder", now).await.unwrap();
        let today = list.add_task("Reminded today", now).await.unwrap();
        let later = list.add_task("Reminded next week", now).await.unwrap();
        let done = list.add_task("Done already", now).await.unwrap();
        list.set_reminder_date(&today, Some(now + Duration::hours(4))).await;
        list.set_reminder_date(&later, Some(now + Duration::days(7))).await;
        list.toggle_done(&done).await;

        let ids = |tasks: Vec<&Task>| tasks.iter().map(|t| t.id().clone()).collect::<Vec<_>>();
        assert_eq!(ids(list.active(now)), vec![plain, today.clone()]);
        assert_eq!(ids(list.today_reminders(now)), vec![today]);
        assert_eq!(ids(list.upcoming_reminders(now)), vec![later]);
        assert_eq!(ids(list.done()), vec![done]);
    }

    #[tokio::test]
    async fn corrupt_storage_gives_an_empty_list() {
        let storage = MemoryStorage::new();
        storage.set_item(TASKS_KEY, "[{\"id\": 12}]").await.unwrap();
        let list = TaskList::load(storage).await;
        assert!(list.tasks().is_empty());
    }
}
