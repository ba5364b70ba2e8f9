//! User-visible, non-blocking notifications ("toasts").
//!
//! The store publishes one notification per settled remote operation. Any
//! number of surfaces may subscribe; each subscription receives every
//! notification published after it was created.

use std::sync::{Mutex, mpsc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, message)
    }

    fn with_level(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            level,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Receiving end of a [`NotificationCenter`] subscription.
#[derive(Debug)]
pub struct NotificationStream {
    receiver: mpsc::Receiver<Notification>,
}

impl NotificationStream {
    /// Try to receive a notification without blocking.
    pub fn try_recv(&self) -> Option<Notification> {
        self.receiver.try_recv().ok()
    }

    /// Everything published since the last drain.
    pub fn drain(&self) -> Vec<Notification> {
        self.receiver.try_iter().collect()
    }
}

/// Broadcast fan-out of notifications.
///
/// Publishing never fails the caller: a poisoned lock or a dropped subscriber
/// only means that notification is not shown.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    subscribers: Mutex<Vec<mpsc::Sender<Notification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!(text = %notification.message, "notify"),
            NotificationLevel::Error => tracing::warn!(text = %notification.message, "notify"),
        }

        let Ok(mut subs) = self.subscribers.lock() else {
            tracing::error!("notification subscribers lock poisoned; dropping notification");
            return;
        };

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(notification.clone()).is_ok());
    }

    pub fn subscribe(&self) -> NotificationStream {
        let (tx, rx) = mpsc::channel();

        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        NotificationStream { receiver: rx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}
