//! Subscriber state machine.
//!
//! ```text
//!           subscribe()                 subscribe()
//!    [absent] ----------> [active] <------------------ [inactive]
//!                             |          (reactivation)
//!           unsubscribe*()    |
//!                             v
//!                         [inactive]
//! ```
//!
//! There is no transition back to `absent`: subscribers are never deleted.

pub mod subscription;
pub mod unsubscription;

pub use subscription::{subscribe, SubscribeOutcome};
pub use unsubscription::{unsubscribe_by_email, unsubscribe_by_token, UnsubscribeOutcome};

use crate::subscriber_store::StoreError;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum SubscriptionError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Email is already subscribed")]
    AlreadySubscribed,
    #[error("Email is already unsubscribed")]
    AlreadyInactive,
    #[error("Email not found in subscribers list")]
    NotFound,
    #[error("Invalid unsubscribe token")]
    InvalidToken,
    #[error("The subscriber store is unavailable")]
    StoreUnavailable(#[source] StoreError),
}

impl std::fmt::Debug for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<StoreError> for SubscriptionError {
    fn from(err: StoreError) -> Self {
        match err {
            // Another request inserted the same email between our lookup and our insert
            StoreError::DuplicateEmail => SubscriptionError::AlreadySubscribed,
            err @ StoreError::Unavailable(_) => SubscriptionError::StoreUnavailable(err),
        }
    }
}
