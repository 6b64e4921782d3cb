//! Integration tests for the SQLite request log
//!
//! Uses an in-memory database with the real migrations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use motbot::config::DatabaseConfig;
use motbot::db;
use motbot::models::{NewUsageEvent, UsageStats};
use motbot::services::{SqliteUsageRecorder, UsageRecorder};

/// A single connection keeps the in-memory database alive for the pool
async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// (timestamp, user_id, username, car_plate, response), newest first
type LogRow = (DateTime<Utc>, i64, String, String, String);

async fn log_rows(pool: &SqlitePool) -> Vec<LogRow> {
    sqlx::query_as(
        r#"
        SELECT timestamp, user_id, username, car_plate, response
        FROM request_logs
        ORDER BY timestamp DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .expect("Failed to read request log")
}

fn event(user_id: i64, registration: &str) -> NewUsageEvent {
    NewUsageEvent {
        user_id,
        label: format!("user{}", user_id),
        registration: registration.to_string(),
        report: format!("report for {}", registration),
    }
}

#[tokio::test]
async fn test_empty_log_has_zero_stats() {
    let recorder = SqliteUsageRecorder::new(memory_pool().await);

    let stats = recorder.stats().await.unwrap();

    assert_eq!(stats, UsageStats::default());
}

#[tokio::test]
async fn test_stats_windows() {
    let recorder = SqliteUsageRecorder::new(memory_pool().await);
    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

    let ages = [
        Duration::minutes(5),
        Duration::hours(23),
        Duration::hours(25),
        Duration::days(10),
        Duration::days(29),
        Duration::days(31),
        Duration::days(400),
    ];
    for (i, age) in ages.iter().enumerate() {
        recorder
            .append_at(&event(i as i64, "AB12CDE"), now - *age)
            .await
            .unwrap();
    }

    let stats = recorder.stats_at(now).await.unwrap();

    assert_eq!(
        stats,
        UsageStats {
            last_day: 2,
            last_month: 5,
            all_time: 7,
        }
    );
    assert!(stats.last_day <= stats.last_month);
    assert!(stats.last_month <= stats.all_time);
}

#[tokio::test]
async fn test_append_stores_all_fields() {
    let pool = memory_pool().await;
    let recorder = SqliteUsageRecorder::new(pool.clone());

    recorder.append(&event(42, "AB12CDE")).await.unwrap();

    let rows = log_rows(&pool).await;
    assert_eq!(rows.len(), 1);
    let (timestamp, user_id, username, car_plate, response) = &rows[0];
    assert_eq!(*user_id, 42);
    assert_eq!(username, "user42");
    assert_eq!(car_plate, "AB12CDE");
    assert_eq!(response, "report for AB12CDE");
    assert!(Utc::now() - *timestamp < Duration::minutes(1));

    let stats = recorder.stats().await.unwrap();
    assert_eq!(stats.last_day, 1);
    assert_eq!(stats.all_time, 1);
}

#[tokio::test]
async fn test_append_at_keeps_given_timestamps() {
    let pool = memory_pool().await;
    let recorder = SqliteUsageRecorder::new(pool.clone());
    let now = Utc::now();

    recorder
        .append_at(&event(1, "OLD1"), now - Duration::days(2))
        .await
        .unwrap();
    recorder
        .append_at(&event(2, "NEW1"), now - Duration::minutes(1))
        .await
        .unwrap();
    recorder
        .append_at(&event(3, "MID1"), now - Duration::hours(3))
        .await
        .unwrap();

    let rows = log_rows(&pool).await;
    let plates: Vec<&str> = rows.iter().map(|row| row.3.as_str()).collect();

    assert_eq!(plates, vec!["NEW1", "MID1", "OLD1"]);
}

#[tokio::test]
async fn test_create_pool_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("requests.db");
    let config = DatabaseConfig {
        path: path.to_string_lossy().into_owned(),
        max_connections: 2,
    };

    let pool = db::create_pool(&config).await.unwrap();
    db::run_migrations(&pool).await.unwrap();

    let recorder = SqliteUsageRecorder::new(pool.clone());
    recorder.append(&event(7, "XY99ZZZ")).await.unwrap();
    assert_eq!(recorder.stats().await.unwrap().all_time, 1);

    pool.close().await;
    assert!(path.exists());
}
