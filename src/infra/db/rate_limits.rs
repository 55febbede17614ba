use std::time::Duration;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::rate_limit::{AttemptInfo, RateLimitStore};
use crate::application::repos::RepoError;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct AttemptRow {
    attempt_count: i32,
    window_started_at: OffsetDateTime,
}

#[async_trait]
impl RateLimitStore for PostgresRepositories {
    /// One upsert per attempt; an expired window restarts at a count of one.
    async fn record_attempt(&self, key: &str, window: Duration) -> Result<AttemptInfo, RepoError> {
        let row = sqlx::query_as::<_, AttemptRow>(
            "INSERT INTO rate_limits (key, window_started_at, attempt_count) \
             VALUES ($1, now(), 1) \
             ON CONFLICT (key) DO UPDATE SET \
             attempt_count = CASE \
                 WHEN rate_limits.window_started_at <= now() - make_interval(secs => $2) THEN 1 \
                 ELSE rate_limits.attempt_count + 1 END, \
             window_started_at = CASE \
                 WHEN rate_limits.window_started_at <= now() - make_interval(secs => $2) THEN now() \
                 ELSE rate_limits.window_started_at END \
             RETURNING attempt_count, window_started_at",
        )
        .bind(key)
        .bind(window.as_secs_f64())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(AttemptInfo {
            attempt_count: row.attempt_count,
            window_started_at: row.window_started_at,
        })
    }

    async fn cleanup_expired(&self, before: OffsetDateTime) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM rate_limits WHERE window_started_at < $1")
            .bind(before)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
