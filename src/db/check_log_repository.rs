use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

use crate::models::check_log::CheckLog;
use crate::models::url::UrlStatus;
use crate::services::probe::ProbeResult;

pub struct CheckLogRepository<'a> {
    pub pool: &'a MySqlPool,
}

impl<'a> CheckLogRepository<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// Appends one history row for a completed probe attempt.
    pub async fn insert(&self, url_id: u64, result: &ProbeResult) -> Result<u64, sqlx::Error> {
        let error_message = if result.error_message.is_empty() {
            None
        } else {
            Some(result.error_message.as_str())
        };

        let res = sqlx::query(
            r#"
            INSERT INTO logs (url_id, status, response_time, response_code, error_message)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(url_id)
        .bind(result.status.as_str())
        .bind(result.response_time_ms)
        .bind(result.response_code)
        .bind(error_message)
        .execute(self.pool)
        .await?;

        Ok(res.last_insert_id())
    }

    pub async fn list_for_url(
        &self,
        url_id: u64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CheckLog>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, url_id, status, response_time, response_code, error_message, checked_at
            FROM logs
            WHERE url_id = ?
            ORDER BY checked_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(url_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    pub async fn latest_for_url(&self, url_id: u64) -> Result<Option<CheckLog>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, url_id, status, response_time, response_code, error_message, checked_at
            FROM logs
            WHERE url_id = ?
            ORDER BY checked_at DESC
            LIMIT 1
            "#,
        )
        .bind(url_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| map_row(&row)).transpose()
    }

    pub async fn count_for_url(&self, url_id: u64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE url_id = ?")
            .bind(url_id)
            .fetch_one(self.pool)
            .await
    }
}

fn map_row(row: &MySqlRow) -> Result<CheckLog, sqlx::Error> {
    let status: String = row.try_get("status")?;

    Ok(CheckLog {
        id: row.try_get("id")?,
        url_id: row.try_get("url_id")?,
        status: status.parse().unwrap_or(UrlStatus::Error),
        response_time: row.try_get("response_time")?,
        response_code: row.try_get("response_code")?,
        error_message: row.try_get("error_message")?,
        checked_at: row.try_get("checked_at").ok(),
    })
}
