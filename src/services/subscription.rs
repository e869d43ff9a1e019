use chrono::Utc;
use secrecy::Secret;

use super::SubscriptionError;
use crate::domain::{
    NewSubscriber, NewSubscriberBody, NewSubscriberRecord, Subscriber, UnsubscribeToken,
};
use crate::subscriber_store::{SubscriberStore, SubscriberUpdate};

#[derive(Debug)]
pub enum SubscribeOutcome {
    Subscribed(Subscriber),
    Reactivated(Subscriber),
}

impl SubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubscribeOutcome::Subscribed(_) => "Successfully subscribed to the newsletter!",
            SubscribeOutcome::Reactivated(_) => {
                "Welcome back! Your subscription has been reactivated."
            }
        }
    }

    pub fn subscriber(&self) -> &Subscriber {
        match self {
            SubscribeOutcome::Subscribed(subscriber) => subscriber,
            SubscribeOutcome::Reactivated(subscriber) => subscriber,
        }
    }
}

/// Creates a subscriber, or reactivates the existing record when the email
/// was unsubscribed. An already active email is rejected.
#[tracing::instrument(
    name = "Subscribing an email to the newsletter",
    skip(store, secret, email, source),
    fields(subscriber_email = %email)
)]
pub async fn subscribe(
    store: &dyn SubscriberStore,
    secret: &Secret<String>,
    email: String,
    source: Option<String>,
) -> Result<SubscribeOutcome, SubscriptionError> {
    let new_subscriber: NewSubscriber = NewSubscriberBody { email, source }
        .try_into()
        .map_err(SubscriptionError::InvalidInput)?;
    let email: &str = new_subscriber.email.as_ref();

    let subscribed_at = Utc::now();
    let unsubscribe_token = UnsubscribeToken::generate(email, secret);

    match store.find_by_email(email).await? {
        None => {
            let record = NewSubscriberRecord {
                email: new_subscriber.email.clone(),
                source: new_subscriber.source.clone(),
                subscribed_at,
                unsubscribe_token: unsubscribe_token.clone(),
            };
            let id = store.insert(&record).await?;

            tracing::info!("New subscriber {} created", id);

            Ok(SubscribeOutcome::Subscribed(Subscriber {
                id,
                email: email.to_string(),
                active: true,
                subscribed_at,
                unsubscribed_at: None,
                unsubscribe_token: unsubscribe_token.to_string(),
                source: record
                    .source
                    .as_ref()
                    .map(|source| source.to_string()),
            }))
        }
        Some(existing) if existing.is_active() => Err(SubscriptionError::AlreadySubscribed),
        Some(existing) => {
            store
                .update(
                    existing.id,
                    SubscriberUpdate::Reactivate {
                        subscribed_at,
                        unsubscribe_token: unsubscribe_token.clone(),
                    },
                )
                .await?;

            tracing::info!("Subscriber {} reactivated", existing.id);

            Ok(SubscribeOutcome::Reactivated(Subscriber {
                active: true,
                subscribed_at,
                unsubscribe_token: unsubscribe_token.to_string(),
                ..existing
            }))
        }
    }
}
