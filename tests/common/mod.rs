//! Mocks shared by the integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use student_planner::notification::{DispatchHandle, Notification, PermissionStatus};
use student_planner::storage::MemoryStorage;
use student_planner::traits::{FeedSource, NotificationDispatcher, Storage};
use student_planner::BoxError;

pub mod mock_behaviour;
pub use mock_behaviour::MockBehaviour;


/// A feed that serves a fixed text
pub struct MockFeed {
    content: Mutex<String>,
    behaviour: Arc<Mutex<MockBehaviour>>,
    /// When set, every fetch waits for this to be notified before answering
    gate: Option<Arc<Notify>>,
}

impl MockFeed {
    pub fn new(content: &str) -> Self {
        Self {
            content: Mutex::new(content.to_string()),
            behaviour: Arc::new(Mutex::new(MockBehaviour::new())),
            gate: None,
        }
    }

    pub fn with_behaviour(content: &str, behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self { behaviour, ..Self::new(content) }
    }

    pub fn with_gate(content: &str, gate: Arc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::new(content) }
    }

    pub fn set_content(&self, content: &str) {
        *self.content.lock().unwrap() = content.to_string();
    }
}

#[async_trait]
impl FeedSource for MockFeed {
    async fn fetch(&self) -> Result<String, BoxError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.behaviour.lock().unwrap().can_fetch()?;
        let content = self.content.lock().unwrap().clone();
        Ok(content)
    }
}


/// A dispatcher that records every notification it is asked for
pub struct MockDispatcher {
    permission: Mutex<PermissionStatus>,
    /// The status the user will choose when asked
    answer: PermissionStatus,
    pub permission_requests: Mutex<u32>,
    pub scheduled: Mutex<Vec<Notification>>,
    behaviour: Arc<Mutex<MockBehaviour>>,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::with_permission(PermissionStatus::Granted, PermissionStatus::Granted)
    }

    pub fn with_permission(current: PermissionStatus, answer: PermissionStatus) -> Self {
        Self {
            permission: Mutex::new(current),
            answer,
            permission_requests: Mutex::new(0),
            scheduled: Mutex::new(Vec::new()),
            behaviour: Arc::new(Mutex::new(MockBehaviour::new())),
        }
    }

    pub fn with_behaviour(behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self { behaviour, ..Self::new() }
    }

    pub fn scheduled(&self) -> Vec<Notification> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationDispatcher for MockDispatcher {
    async fn permission_status(&self) -> Result<PermissionStatus, BoxError> {
        Ok(*self.permission.lock().unwrap())
    }

    async fn request_permission(&self) -> Result<PermissionStatus, BoxError> {
        *self.permission_requests.lock().unwrap() += 1;
        let mut permission = self.permission.lock().unwrap();
        *permission = self.answer;
        Ok(*permission)
    }

    async fn schedule_notification(&self, notification: Notification) -> Result<DispatchHandle, BoxError> {
        self.behaviour.lock().unwrap().can_schedule_notification()?;
        self.scheduled.lock().unwrap().push(notification);
        Ok(DispatchHandle::random())
    }
}


/// A memory storage whose writes can be made to fail
#[derive(Clone)]
pub struct MockStorage {
    inner: MemoryStorage,
    behaviour: Arc<Mutex<MockBehaviour>>,
}

impl MockStorage {
    /// `inner` holds what has actually been written
    pub fn new(inner: MemoryStorage, behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self { inner, behaviour }
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, BoxError> {
        self.inner.get_item(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), BoxError> {
        self.behaviour.lock().unwrap().can_set_item()?;
        self.inner.set_item(key, value).await
    }
}
