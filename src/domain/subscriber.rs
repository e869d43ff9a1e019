use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A stored subscriber as read back from the subscriber store.
///
/// `email` is kept as a raw string: rows written before a validation change
/// must still be readable, so callers that need a deliverable address parse it
/// into a `SubscriberEmail` themselves.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub active: bool,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub unsubscribe_token: String,
    pub source: Option<String>,
}

impl Subscriber {
    pub fn is_active(&self) -> bool {
        self.active
    }
}
