// src/notifier.rs

use std::{
    collections::{HashMap, VecDeque},
    fmt,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{config::OUTBOX_LIMIT, models::grading_record::UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The user never opened a private conversation with the bot.
    ChannelClosed(UserId),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::ChannelClosed(user) => {
                write!(f, "user {} has no open private channel", user)
            }
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Private-message delivery to a single user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Marks `user` as reachable, as happens when they start the bot.
    async fn open(&self, user: UserId);

    async fn notify(&self, user: UserId, text: &str) -> Result<(), DeliveryError>;
}

/// Queues private messages per user until the chat gateway collects them.
///
/// Delivery only succeeds for users who opened their channel first, which
/// mirrors chat platforms refusing bot DMs to users who never started the bot.
/// A queue holds at most [`OUTBOX_LIMIT`] messages; the oldest go first.
#[derive(Debug, Default)]
pub struct Outbox {
    queues: Mutex<HashMap<UserId, VecDeque<String>>>,
}

impl Outbox {
    /// Removes and returns everything queued for `user`.
    pub async fn drain(&self, user: UserId) -> Vec<String> {
        self.queues
            .lock()
            .await
            .get_mut(&user)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn open(&self, user: UserId) {
        self.queues.lock().await.entry(user).or_default();
    }

    async fn notify(&self, user: UserId, text: &str) -> Result<(), DeliveryError> {
        match self.queues.lock().await.get_mut(&user) {
            Some(queue) => {
                if queue.len() >= OUTBOX_LIMIT {
                    queue.pop_front();
                    tracing::warn!("Outbox for {} is full, dropped oldest message", user);
                }
                queue.push_back(text.to_string());
                Ok(())
            }
            None => Err(DeliveryError::ChannelClosed(user)),
        }
    }
}
