use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::{StoreError, SubscriberStore, SubscriberUpdate};
use crate::domain::{NewSubscriberRecord, Subscriber};

// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgSubscriberStore {
    db_pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(db_pool: PgPool) -> PgSubscriberStore {
        PgSubscriberStore { db_pool }
    }
}

fn subscriber_from_row(row: PgRow) -> Subscriber {
    Subscriber {
        id: row.get("id"),
        email: row.get("email"),
        active: row.get("active"),
        subscribed_at: row.get("subscribed_at"),
        unsubscribed_at: row.get("unsubscribed_at"),
        unsubscribe_token: row.get("unsubscribe_token"),
        source: row.get("source"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(name = "Find a subscriber by email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, email, active, subscribed_at, unsubscribed_at, unsubscribe_token, source
            FROM subscribers
            WHERE email = $1
            "#,
        )
        .bind(email)
        .map(subscriber_from_row)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Unavailable(err)
        })
    }

    #[tracing::instrument(
        name = "Insert a new subscriber into the database",
        skip(self, record),
        fields(subscriber_email = %record.email)
    )]
    async fn insert(&self, record: &NewSubscriberRecord) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO subscribers (id, email, active, subscribed_at, unsubscribe_token, source)
            VALUES ($1, $2, TRUE, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(record.email.as_ref())
        .bind(record.subscribed_at)
        .bind(record.unsubscribe_token.as_ref())
        .bind(record.source.as_ref().map(AsRef::<str>::as_ref))
        .execute(&self.db_pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                tracing::warn!("Subscriber was inserted concurrently: {:?}", err);
                return StoreError::DuplicateEmail;
            }
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Unavailable(err)
        })?;

        Ok(id)
    }

    #[tracing::instrument(name = "Update a subscriber in the database", skip(self, update))]
    async fn update(&self, id: Uuid, update: SubscriberUpdate) -> Result<(), StoreError> {
        let query = match update {
            SubscriberUpdate::Reactivate {
                subscribed_at,
                unsubscribe_token,
            } => sqlx::query(
                r#"
                UPDATE subscribers
                SET active = TRUE, subscribed_at = $2, unsubscribe_token = $3
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(subscribed_at)
            .bind(unsubscribe_token.to_string()),
            SubscriberUpdate::Deactivate { unsubscribed_at } => sqlx::query(
                r#"
                UPDATE subscribers
                SET active = FALSE, unsubscribed_at = $2
                WHERE id = $1
                "#,
            )
            .bind(id)
            .bind(unsubscribed_at),
        };

        query.execute(&self.db_pool).await.map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Unavailable(err)
        })?;

        Ok(())
    }

    #[tracing::instrument(name = "Get active subscribers", skip(self))]
    async fn query_active(&self) -> Result<Vec<Subscriber>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, email, active, subscribed_at, unsubscribed_at, unsubscribe_token, source
            FROM subscribers
            WHERE active = TRUE
            ORDER BY subscribed_at
            "#,
        )
        .map(subscriber_from_row)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to execute query: {:?}", err);
            StoreError::Unavailable(err)
        })
    }
}
