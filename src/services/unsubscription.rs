use chrono::Utc;
use secrecy::Secret;

use super::SubscriptionError;
use crate::domain::{Subscriber, SubscriberEmail, UnsubscribeToken};
use crate::subscriber_store::{SubscriberStore, SubscriberUpdate};

#[derive(Debug)]
pub enum UnsubscribeOutcome {
    Unsubscribed(Subscriber),
    // Only produced by the token path
    AlreadyUnsubscribed(Subscriber),
}

impl UnsubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            UnsubscribeOutcome::Unsubscribed(_) => "Successfully unsubscribed from the newsletter.",
            UnsubscribeOutcome::AlreadyUnsubscribed(_) => {
                "You are already unsubscribed from the newsletter."
            }
        }
    }
}

#[tracing::instrument(
    name = "Unsubscribing an email from the newsletter",
    skip(store, email),
    fields(subscriber_email = %email)
)]
pub async fn unsubscribe_by_email(
    store: &dyn SubscriberStore,
    email: String,
) -> Result<UnsubscribeOutcome, SubscriptionError> {
    let email = SubscriberEmail::parse(email).map_err(SubscriptionError::InvalidInput)?;

    let subscriber = store
        .find_by_email(email.as_ref())
        .await?
        .ok_or(SubscriptionError::NotFound)?;

    if !subscriber.is_active() {
        return Err(SubscriptionError::AlreadyInactive);
    }

    deactivate(store, subscriber).await
}

/// Unsubscribes through an emailed link.
///
/// The token is checked before the store is queried, so a wrong token never
/// reveals whether the email is known. Unsubscribing an inactive email this
/// way succeeds, unlike `unsubscribe_by_email`.
#[tracing::instrument(
    name = "Unsubscribing an email through its unsubscribe token",
    skip(store, secret, email, token),
    fields(subscriber_email = %email)
)]
pub async fn unsubscribe_by_token(
    store: &dyn SubscriberStore,
    secret: &Secret<String>,
    email: &str,
    token: &str,
) -> Result<UnsubscribeOutcome, SubscriptionError> {
    if !UnsubscribeToken::verify(email, token, secret) {
        tracing::warn!("Rejected an invalid unsubscribe token");
        return Err(SubscriptionError::InvalidToken);
    }

    let subscriber = store
        .find_by_email(email)
        .await?
        .ok_or(SubscriptionError::NotFound)?;

    if !subscriber.is_active() {
        return Ok(UnsubscribeOutcome::AlreadyUnsubscribed(subscriber));
    }

    deactivate(store, subscriber).await
}

async fn deactivate(
    store: &dyn SubscriberStore,
    subscriber: Subscriber,
) -> Result<UnsubscribeOutcome, SubscriptionError> {
    let unsubscribed_at = Utc::now();

    store
        .update(subscriber.id, SubscriberUpdate::Deactivate { unsubscribed_at })
        .await?;

    tracing::info!("Subscriber {} deactivated", subscriber.id);

    Ok(UnsubscribeOutcome::Unsubscribed(Subscriber {
        active: false,
        unsubscribed_at: Some(unsubscribed_at),
        ..subscriber
    }))
}
