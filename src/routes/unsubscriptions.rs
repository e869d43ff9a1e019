use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::MessageBody;
use crate::services::{self, SubscriptionError};
use crate::startup::UnsubscribeSecret;
use crate::subscriber_store::SubscriberStore;

#[derive(Deserialize, Debug)]
pub struct UnsubscribeBody {
    pub email: String,
}

#[tracing::instrument(
    name = "Unsubscribe by email handler",
    skip(body, store),
    fields(subscriber_email = %body.email)
)]
pub async fn handle_unsubscribe(
    body: web::Json<UnsubscribeBody>,
    store: web::Data<dyn SubscriberStore>,
) -> Result<HttpResponse, SubscriptionError> {
    let outcome = services::unsubscribe_by_email(store.get_ref(), body.into_inner().email).await?;

    Ok(HttpResponse::Ok().json(MessageBody {
        message: outcome.message(),
    }))
}

// Both are optional so that a truncated link gets a JSON 400 instead of the
// query extractor's plain text one.
#[derive(Deserialize, Debug)]
pub struct UnsubscribeLinkParameters {
    pub token: Option<String>,
    pub email: Option<String>,
}

/// Target of the link sent at the bottom of every newsletter.
#[tracing::instrument(
    name = "Unsubscribe link handler",
    skip(parameters, store, secret),
    fields(subscriber_email = ?parameters.email)
)]
pub async fn handle_unsubscribe_link(
    parameters: web::Query<UnsubscribeLinkParameters>,
    store: web::Data<dyn SubscriberStore>,
    secret: web::Data<UnsubscribeSecret>,
) -> Result<HttpResponse, SubscriptionError> {
    let UnsubscribeLinkParameters { token, email } = parameters.into_inner();

    let (token, email) = match (token, email) {
        (Some(token), Some(email)) if !token.is_empty() && !email.is_empty() => (token, email),
        _ => {
            return Err(SubscriptionError::InvalidInput(
                "Both token and email are required".into(),
            ))
        }
    };

    let outcome =
        services::unsubscribe_by_token(store.get_ref(), &secret.0, &email, &token).await?;

    Ok(HttpResponse::Ok().json(MessageBody {
        message: outcome.message(),
    }))
}
