use secrecy::Secret;

use super::digest::NewsletterIssue;
use crate::domain::{SubscriberEmail, UnsubscribeToken};
use crate::email_client::EmailClient;
use crate::subscriber_store::{StoreError, SubscriberStore};

/// Builds the one-click unsubscribe link embedded in every newsletter.
pub fn unsubscribe_link(base_url: &str, email: &SubscriberEmail, secret: &Secret<String>) -> String {
    let token = UnsubscribeToken::generate(email.as_ref(), secret);

    format!(
        "{}/unsubscribe?token={}&email={}",
        base_url.trim_end_matches('/'),
        token,
        urlencoding::encode(email.as_ref())
    )
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
    // Stored emails that no longer pass validation
    pub skipped: usize,
}

impl DeliveryReport {
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed + self.skipped
    }

    /// A run that reached nobody failed, including one with no active
    /// subscribers at all.
    pub fn succeeded(&self) -> bool {
        self.delivered > 0
    }
}

/// Sends `issue` to every active subscriber, one at a time.
///
/// A failed send is logged and counted, it never aborts the batch. Only a
/// failure to read the subscriber list is returned as an error.
#[tracing::instrument(
    name = "Delivering a newsletter issue to active subscribers",
    skip(store, email_client, issue, base_url, secret),
    fields(subject = %issue.subject)
)]
pub async fn deliver_issue(
    store: &dyn SubscriberStore,
    email_client: &EmailClient,
    issue: &NewsletterIssue,
    base_url: &str,
    secret: &Secret<String>,
) -> Result<DeliveryReport, StoreError> {
    let subscribers = store.query_active().await?;
    if subscribers.is_empty() {
        tracing::warn!("No active subscribers found");
    }
    let mut report = DeliveryReport::default();

    for subscriber in subscribers {
        let email = match SubscriberEmail::parse(subscriber.email) {
            Ok(email) => email,
            Err(err) => {
                tracing::warn!(
                    subscriber_id = %subscriber.id,
                    "Skipping a subscriber with an invalid stored email: {}",
                    err
                );
                report.skipped += 1;
                continue;
            }
        };

        let html = issue.personalized_html(&unsubscribe_link(base_url, &email, secret));

        match email_client.send_email(&email, &issue.subject, &html).await {
            Ok(()) => report.delivered += 1,
            Err(err) => {
                tracing::error!(
                    error.cause_chain = ?err,
                    "Failed to deliver the newsletter to {}",
                    email
                );
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        delivered = report.delivered,
        failed = report.failed,
        skipped = report.skipped,
        "Newsletter delivery finished"
    );

    Ok(report)
}
