//! The seams between this crate and the outside world

use async_trait::async_trait;

use crate::error::BoxError;
use crate::notification::{DispatchHandle, Notification, PermissionStatus};

/// Something that provides the raw text of a calendar feed
#[async_trait]
pub trait FeedSource {
    /// Download the current content of the feed.
    /// This can be a long process, and may fail (e.g. in case the server is unreachable)
    async fn fetch(&self) -> Result<String, BoxError>;
}

/// A key-value store of whole documents (e.g. the platform storage of a mobile app)
#[async_trait]
pub trait Storage {
    /// Returns the document stored under `key`, or `None` if there is none (e.g. on first run)
    async fn get_item(&self, key: &str) -> Result<Option<String>, BoxError>;
    /// Replace the document stored under `key`
    async fn set_item(&self, key: &str, value: &str) -> Result<(), BoxError>;
}

/// The notification service of the platform.
///
/// Delivery is best-effort. Receipts are not reported here, but on a [`ReceiptSender`](crate::notification::ReceiptSender)
#[async_trait]
pub trait NotificationDispatcher {
    async fn permission_status(&self) -> Result<PermissionStatus, BoxError>;
    /// Ask the user for the permission to notify. Returns the resulting status
    async fn request_permission(&self) -> Result<PermissionStatus, BoxError>;
    async fn schedule_notification(&self, notification: Notification) -> Result<DispatchHandle, BoxError>;
}
