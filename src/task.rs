//! To-do tasks

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// The identity of a task. This is built from its creation time
pub type TaskId = String;

/// A to-do task, that may have a reminder
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    text: String,
    done: bool,

    /// When set, this task takes part in the reminder schedule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reminder_date: Option<DateTime<Utc>>,
    /// The last time a notification for this task has been dispatched or acknowledged.
    /// This is the only memory the scheduler has of "did I already nag about this?"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_notified_at: Option<DateTime<Utc>>,
}


impl Task {
    /// Create a brand new task, created at `created_at`
    pub fn new(text: String, created_at: DateTime<Utc>) -> Self {
        let id = created_at.timestamp_millis().to_string();
        Self::new_with_parameters(id, text, false, None, None)
    }

    /// Create a new Task instance, e.g. one that has been persisted already
    pub fn new_with_parameters(id: TaskId, text: String, done: bool,
                               reminder_date: Option<DateTime<Utc>>,
                               last_notified_at: Option<DateTime<Utc>>) -> Self
    {
        Self { id, text, done, reminder_date, last_notified_at }
    }

    pub fn id(&self) -> &TaskId     { &self.id   }
    pub fn text(&self) -> &str      { &self.text }
    pub fn done(&self) -> bool      { self.done  }
    pub fn reminder_date(&self) -> Option<DateTime<Utc>>    { self.reminder_date    }
    pub fn last_notified_at(&self) -> Option<DateTime<Utc>> { self.last_notified_at }

    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    /// Change the reminder time.
    /// This forgets about previous notifications, so that the cooldown cycle starts over
    pub fn set_reminder_date(&mut self, reminder_date: Option<DateTime<Utc>>) {
        self.reminder_date = reminder_date;
        self.last_notified_at = None;
    }

    /// Remember that this task has been notified (or that a notification has been seen) at `at`
    pub fn mark_notified(&mut self, at: DateTime<Utc>) {
        self.last_notified_at = Some(at);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn changing_the_reminder_clears_the_last_notification() {
        let now = Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap();
        let mut task = Task::new("Revise maths".to_string(), now);
        assert_eq!(task.id(), &now.timestamp_millis().to_string());

        task.set_reminder_date(Some(now));
        task.mark_notified(now);
        assert_eq!(task.last_notified_at(), Some(now));

        task.set_reminder_date(Some(now + chrono::Duration::hours(1)));
        assert_eq!(task.last_notified_at(), None);
    }

    #[test]
    fn serde_task() {
        let json = r#"{"id":"1757491200000","text":"Buy a calculator","done":false,"reminderDate":"2025-09-10T08:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.reminder_date(), Some(Utc.with_ymd_and_hms(2025, 9, 10, 8, 0, 0).unwrap()));
        assert_eq!(task.last_notified_at(), None);

        let back = serde_json::to_string(&task).unwrap();
        assert!(back.contains("\"reminderDate\""));
        assert!(back.contains("lastNotifiedAt") == false);
    }
}
