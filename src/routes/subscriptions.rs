use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};

use super::MessageBody;
use crate::domain::NewSubscriberBody;
use crate::services::{self, SubscriptionError};
use crate::startup::UnsubscribeSecret;
use crate::subscriber_store::SubscriberStore;

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(body, store, secret),
    fields(
        subscriber_email = %body.email,
        source = ?body.source
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriberBody>,
    store: web::Data<dyn SubscriberStore>,
    secret: web::Data<UnsubscribeSecret>,
) -> Result<HttpResponse, SubscriptionError> {
    let NewSubscriberBody { email, source } = body.into_inner();

    let outcome = services::subscribe(store.get_ref(), &secret.0, email, source).await?;

    Ok(HttpResponse::Ok().json(MessageBody {
        message: outcome.message(),
    }))
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedSubscriber {
    email: String,
    subscribed_at: DateTime<Utc>,
    source: Option<String>,
}

#[derive(serde::Serialize)]
struct SubscriberList {
    count: usize,
    subscribers: Vec<ListedSubscriber>,
}

// Unauthenticated. Unsubscribe tokens are never part of the listing.
#[tracing::instrument(name = "Listing active subscribers handler", skip(store))]
pub async fn handle_list_subscribers(
    store: web::Data<dyn SubscriberStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let subscribers: Vec<ListedSubscriber> = store
        .query_active()
        .await?
        .into_iter()
        .map(|subscriber| ListedSubscriber {
            email: subscriber.email,
            subscribed_at: subscriber.subscribed_at,
            source: subscriber.source,
        })
        .collect();

    Ok(HttpResponse::Ok().json(SubscriberList {
        count: subscribers.len(),
        subscribers,
    }))
}
