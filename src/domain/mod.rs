pub mod new_subscriber;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscription_source;
pub mod unsubscribe_token;

pub use new_subscriber::{NewSubscriber, NewSubscriberBody, NewSubscriberRecord};
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
pub use subscription_source::SubscriptionSource;
pub use unsubscribe_token::UnsubscribeToken;
