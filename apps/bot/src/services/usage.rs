use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::{NewUsageEvent, UsageStats};

/// Append-only request log with rolling usage counts
#[async_trait]
pub trait UsageRecorder: Send + Sync {
    /// Records one lookup
    async fn append(&self, event: &NewUsageEvent) -> AppResult<()>;

    /// Counts lookups in the last 24 hours, last 30 days, and overall
    async fn stats(&self) -> AppResult<UsageStats>;
}

/// Request log stored in the `request_logs` SQLite table
#[derive(Clone)]
pub struct SqliteUsageRecorder {
    pool: SqlitePool,
}

impl SqliteUsageRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a lookup with an explicit timestamp
    pub async fn append_at(&self, event: &NewUsageEvent, at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO request_logs (timestamp, user_id, username, car_plate, response)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(at)
        .bind(event.user_id)
        .bind(&event.label)
        .bind(&event.registration)
        .bind(&event.report)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Usage counts relative to `now`
    pub async fn stats_at(&self, now: DateTime<Utc>) -> AppResult<UsageStats> {
        Ok(UsageStats {
            last_day: self.count_since(now - Duration::hours(24)).await?,
            last_month: self.count_since(now - Duration::days(30)).await?,
            all_time: self.count_all().await?,
        })
    }

    async fn count_since(&self, since: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM request_logs WHERE timestamp >= $1")
                .bind(since)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn count_all(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM request_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl UsageRecorder for SqliteUsageRecorder {
    async fn append(&self, event: &NewUsageEvent) -> AppResult<()> {
        self.append_at(event, Utc::now()).await
    }

    async fn stats(&self) -> AppResult<UsageStats> {
        self.stats_at(Utc::now()).await
    }
}
