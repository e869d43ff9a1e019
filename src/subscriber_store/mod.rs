use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewSubscriberRecord, Subscriber, UnsubscribeToken};

#[cfg(test)]
pub mod in_memory;
mod postgres;

pub use postgres::PgSubscriberStore;

/// In-place mutation of an existing subscriber. There is no delete.
#[derive(Debug, Clone)]
pub enum SubscriberUpdate {
    Reactivate {
        subscribed_at: DateTime<Utc>,
        unsubscribe_token: UnsubscribeToken,
    },
    Deactivate {
        unsubscribed_at: DateTime<Utc>,
    },
}

/// CRUD over the subscribers collection, keyed by email.
///
/// Calls are independent round trips: a `find_by_email` followed by an
/// `insert` is not atomic. Uniqueness of `email` is enforced by the store
/// itself, and losing that race surfaces as `StoreError::DuplicateEmail`.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError>;

    async fn insert(&self, record: &NewSubscriberRecord) -> Result<Uuid, StoreError>;

    async fn update(&self, id: Uuid, update: SubscriberUpdate) -> Result<(), StoreError>;

    /// Active subscribers, oldest subscription first.
    async fn query_active(&self) -> Result<Vec<Subscriber>, StoreError>;
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("A subscriber with this email already exists.")]
    DuplicateEmail,
    #[error("Failed to execute a query against the subscriber store.")]
    Unavailable(#[source] sqlx::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::utils::error_chain_fmt(self, f)
    }
}
