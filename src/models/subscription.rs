use crate::domain::{SubscriptionStatus, ValidationError};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;

#[derive(Debug, Clone)]
pub struct SubscriptionRecord {
    pub id: i64,
    pub email: String,
    pub topic: String,
    pub optional_text: Option<String>,
    pub repository_name: Option<String>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PgRow> for SubscriptionRecord {
    type Error = sqlx::Error;

    fn try_from(row: PgRow) -> Result<Self, Self::Error> {
        let status: String = row.try_get("subscription_status")?;
        let status =
            SubscriptionStatus::try_from(status).map_err(|e| sqlx::Error::ColumnDecode {
                index: "subscription_status".into(),
                source: e.into(),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            topic: row.try_get("topic")?,
            optional_text: row.try_get("optional_text")?,
            repository_name: row.try_get("repository_name")?,
            status,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// A row that was read but could not be decoded into a `SubscriptionRecord`.
#[derive(Debug, Clone)]
pub struct MalformedSubscription {
    pub id: i64,
    pub error: ValidationError,
}

/// One row as read from the store. A malformed row only costs that row.
pub type StoredSubscription = Result<SubscriptionRecord, MalformedSubscription>;

fn decode_row(row: PgRow) -> Result<StoredSubscription, sqlx::Error> {
    // Without an id there is nothing to report against, so that stays fatal.
    let id: i64 = row.try_get("id")?;

    let stored = SubscriptionRecord::try_from(row).map_err(|e| MalformedSubscription {
        id,
        error: ValidationError::Row(e.to_string()),
    });

    Ok(stored)
}

/// Read access to persisted subscriptions.
pub trait SubscriptionStore {
    fn fetch_by_status(
        &self,
        status: SubscriptionStatus,
    ) -> impl Future<Output = Result<Vec<StoredSubscription>, sqlx::Error>> + Send;
}

impl SubscriptionStore for PgPool {
    async fn fetch_by_status(
        &self,
        status: SubscriptionStatus,
    ) -> Result<Vec<StoredSubscription>, sqlx::Error> {
        sqlx::query(
            r#"
              SELECT
                id,
                email,
                topic,
                optional_text,
                repository_name,
                subscription_status,
                created_at
              FROM subscriptions
              WHERE subscription_status = $1
              ORDER BY id
            "#,
        )
        .bind(status.as_ref())
        .fetch_all(self)
        .await?
        .into_iter()
        .map(decode_row)
        .collect()
    }
}

#[tracing::instrument(name = "Reading active subscriptions", skip_all)]
pub async fn get_active_subscriptions<S>(store: &S) -> Result<Vec<StoredSubscription>, sqlx::Error>
where
    S: SubscriptionStore,
{
    store.fetch_by_status(SubscriptionStatus::Subscribed).await
}
