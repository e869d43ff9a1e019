use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{StoreError, SubscriberStore, SubscriberUpdate};
use crate::domain::{NewSubscriberRecord, Subscriber};

/// Store used by unit tests: a vector behind a mutex, with a switch that makes
/// every call fail the way an unreachable database would.
#[derive(Default)]
pub struct InMemorySubscriberStore {
    subscribers: Mutex<Vec<Subscriber>>,
    unavailable: bool,
}

impl InMemorySubscriberStore {
    pub fn new() -> InMemorySubscriberStore {
        InMemorySubscriberStore::default()
    }

    pub fn unavailable() -> InMemorySubscriberStore {
        InMemorySubscriberStore {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_subscribers(subscribers: Vec<Subscriber>) -> InMemorySubscriberStore {
        InMemorySubscriberStore {
            subscribers: Mutex::new(subscribers),
            unavailable: false,
        }
    }

    pub fn all(&self) -> Vec<Subscriber> {
        self.subscribers.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            return Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        self.check_available()?;

        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .find(|subscriber| subscriber.email == email)
            .cloned())
    }

    async fn insert(&self, record: &NewSubscriberRecord) -> Result<Uuid, StoreError> {
        self.check_available()?;

        let email: &str = record.email.as_ref();
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.iter().any(|subscriber| subscriber.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = Uuid::new_v4();
        subscribers.push(Subscriber {
            id,
            email: email.to_string(),
            active: true,
            subscribed_at: record.subscribed_at,
            unsubscribed_at: None,
            unsubscribe_token: record.unsubscribe_token.to_string(),
            source: record
                .source
                .as_ref()
                .map(|source| source.to_string()),
        });

        Ok(id)
    }

    async fn update(&self, id: Uuid, update: SubscriberUpdate) -> Result<(), StoreError> {
        self.check_available()?;

        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(subscriber) = subscribers.iter_mut().find(|subscriber| subscriber.id == id) {
            match update {
                SubscriberUpdate::Reactivate {
                    subscribed_at,
                    unsubscribe_token,
                } => {
                    subscriber.active = true;
                    subscriber.subscribed_at = subscribed_at;
                    subscriber.unsubscribe_token = unsubscribe_token.to_string();
                }
                SubscriberUpdate::Deactivate { unsubscribed_at } => {
                    subscriber.active = false;
                    subscriber.unsubscribed_at = Some(unsubscribed_at);
                }
            }
        }

        Ok(())
    }

    async fn query_active(&self) -> Result<Vec<Subscriber>, StoreError> {
        self.check_available()?;

        let mut active: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|subscriber| subscriber.active)
            .cloned()
            .collect();
        active.sort_by_key(|subscriber| subscriber.subscribed_at);

        Ok(active)
    }
}
