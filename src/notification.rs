//! Notifications requested to the platform, and the receipts it sends back

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::TaskId;

/// When a notification should be delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Immediate,
    At(DateTime<Utc>),
}

impl Trigger {
    /// Deliver at `when`, or right now if `when` is already past
    pub fn for_instant(when: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if when <= now {
            Trigger::Immediate
        } else {
            Trigger::At(when)
        }
    }
}

/// Data attached to a notification, that comes back in the [`Receipt`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPayload {
    pub task_id: TaskId,
}

/// A notification request
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub payload: ReminderPayload,
    pub trigger: Trigger,
}

/// An opaque handle the platform gives back when a notification has been scheduled
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DispatchHandle(pub String);

impl DispatchHandle {
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Sent by the platform when the user has received (or opened) a notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub payload: ReminderPayload,
}

impl Receipt {
    pub fn for_task(task_id: TaskId) -> Self {
        Self { payload: ReminderPayload { task_id } }
    }
}


/// See [`receipt_channel`]
pub type ReceiptSender = tokio::sync::mpsc::UnboundedSender<Receipt>;
/// See [`receipt_channel`]
pub type ReceiptReceiver = tokio::sync::mpsc::UnboundedReceiver<Receipt>;

/// Create a channel the platform glue can push notification receipts into
pub fn receipt_channel() -> (ReceiptSender, ReceiptReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
