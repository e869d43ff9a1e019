use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscription_source::SubscriptionSource;
use crate::domain::unsubscribe_token::UnsubscribeToken;

/// Validated input of a subscription request.
#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub source: Option<SubscriptionSource>,
}

#[derive(Deserialize, Debug)]
pub struct NewSubscriberBody {
    pub email: String,
    pub source: Option<String>,
}

impl TryFrom<NewSubscriberBody> for NewSubscriber {
    type Error = String;

    fn try_from(body: NewSubscriberBody) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(body.email)?;
        let source = body.source.map(SubscriptionSource::parse).transpose()?;

        Ok(NewSubscriber { email, source })
    }
}

/// Everything the store needs to create a fresh, active subscriber.
#[derive(Debug, Clone)]
pub struct NewSubscriberRecord {
    pub email: SubscriberEmail,
    pub source: Option<SubscriptionSource>,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribe_token: UnsubscribeToken,
}
