mod health_check;
mod subscriptions;
mod unsubscriptions;

pub use health_check::health_check;
pub use subscriptions::{handle_create_subscription, handle_list_subscribers};
pub use unsubscriptions::{handle_unsubscribe, handle_unsubscribe_link};

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::services::SubscriptionError;

#[derive(serde::Serialize)]
pub struct MessageBody<'a> {
    pub message: &'a str,
}

#[derive(serde::Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

impl ResponseError for SubscriptionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::AlreadySubscribed => StatusCode::CONFLICT,
            SubscriptionError::AlreadyInactive => StatusCode::CONFLICT,
            SubscriptionError::NotFound => StatusCode::NOT_FOUND,
            SubscriptionError::InvalidToken => StatusCode::FORBIDDEN,
            SubscriptionError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            SubscriptionError::StoreUnavailable(_) => {
                tracing::error!(error.cause_chain = ?self, "Subscriber store failure");
                // Store details stay in the logs
                String::from("Internal server error")
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody { error: &message })
    }
}
