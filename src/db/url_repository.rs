use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

use crate::models::url::{CheckInterval, CheckTarget, MonitoredUrl, UrlStatus};
use crate::services::probe::ProbeResult;

pub struct UrlRepository<'a> {
    pub pool: &'a MySqlPool,
}

impl<'a> UrlRepository<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }

    /// All targets currently assigned to an interval tag.
    pub async fn list_for_interval(&self, interval: CheckInterval) -> Result<Vec<CheckTarget>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, url FROM urls WHERE `interval` = ?")
            .bind(interval.as_str())
            .fetch_all(self.pool)
            .await?;

        let mut targets = Vec::with_capacity(rows.len());
        for row in rows {
            targets.push(CheckTarget {
                id: row.try_get("id")?,
                url: row.try_get("url")?,
            });
        }
        Ok(targets)
    }

    /// Last-write-wins update of a target's current state after a probe.
    pub async fn record_check(&self, url_id: u64, result: &ProbeResult) -> Result<u64, sqlx::Error> {
        let res = sqlx::query(
            "UPDATE urls SET status = ?, response_time = ?, last_checked = NOW() WHERE id = ?",
        )
        .bind(result.status.as_str())
        .bind(result.response_time_ms)
        .bind(url_id)
        .execute(self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    pub async fn create(
        &self,
        user_id: u64,
        url: &str,
        name: &str,
        interval: CheckInterval,
        result: &ProbeResult,
    ) -> Result<u64, sqlx::Error> {
        tracing::info!(
            "Creating URL -> user_id: {}, name: '{}', url: '{}', interval: {}",
            user_id, name, url, interval
        );

        let res = sqlx::query(
            r#"
            INSERT INTO urls (user_id, url, name, `interval`, status, response_time, last_checked)
            VALUES (?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(user_id)
        .bind(url)
        .bind(name)
        .bind(interval.as_str())
        .bind(result.status.as_str())
        .bind(result.response_time_ms)
        .execute(self.pool)
        .await?;

        Ok(res.last_insert_id())
    }

    /// Whether `url` is already monitored by this user, optionally ignoring
    /// one row (the row being edited).
    pub async fn is_duplicate(
        &self,
        user_id: u64,
        url: &str,
        exclude_id: Option<u64>,
    ) -> Result<bool, sqlx::Error> {
        let row = match exclude_id {
            Some(id) => {
                sqlx::query("SELECT id FROM urls WHERE user_id = ? AND url = ? AND id != ?")
                    .bind(user_id)
                    .bind(url)
                    .bind(id)
                    .fetch_optional(self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT id FROM urls WHERE user_id = ? AND url = ?")
                    .bind(user_id)
                    .bind(url)
                    .fetch_optional(self.pool)
                    .await?
            }
        };

        Ok(row.is_some())
    }

    pub async fn exists(&self, url_id: u64) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE id = ?")
            .bind(url_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn get_by_id(&self, url_id: u64, user_id: u64) -> Result<Option<MonitoredUrl>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, url, name, `interval`, status, response_time, last_checked, created_at
            FROM urls
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(url_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| map_row(&row)).transpose()
    }

    pub async fn list_by_user(
        &self,
        user_id: u64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<MonitoredUrl>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, url, name, `interval`, status, response_time, last_checked, created_at
            FROM urls
            WHERE user_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_row).collect()
    }

    pub async fn count_by_user(&self, user_id: u64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM urls WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
    }

    /// Edit of url and/or name. A url change carries a fresh probe result so
    /// the current-state columns stay truthful.
    pub async fn update(
        &self,
        url_id: u64,
        user_id: u64,
        url: &str,
        name: &str,
        probed: Option<&ProbeResult>,
    ) -> Result<u64, sqlx::Error> {
        let res = match probed {
            Some(result) => {
                sqlx::query(
                    r#"
                    UPDATE urls
                    SET url = ?, name = ?, status = ?, response_time = ?, last_checked = NOW()
                    WHERE id = ? AND user_id = ?
                    "#,
                )
                .bind(url)
                .bind(name)
                .bind(result.status.as_str())
                .bind(result.response_time_ms)
                .bind(url_id)
                .bind(user_id)
                .execute(self.pool)
                .await?
            }
            None => {
                sqlx::query("UPDATE urls SET name = ? WHERE id = ? AND user_id = ?")
                    .bind(name)
                    .bind(url_id)
                    .bind(user_id)
                    .execute(self.pool)
                    .await?
            }
        };

        Ok(res.rows_affected())
    }

    /// Deletes an owned URL; its history rows go with it via cascade.
    pub async fn delete(&self, url_id: u64, user_id: u64) -> Result<u64, sqlx::Error> {
        let res = sqlx::query("DELETE FROM urls WHERE id = ? AND user_id = ?")
            .bind(url_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if res.rows_affected() > 0 {
            tracing::info!("Deleted url_id: {}", url_id);
        } else {
            tracing::warn!("No URL found to delete with id: {}", url_id);
        }

        Ok(res.rows_affected())
    }
}

fn map_row(row: &MySqlRow) -> Result<MonitoredUrl, sqlx::Error> {
    let interval: String = row.try_get("interval")?;
    let status: String = row.try_get("status")?;

    Ok(MonitoredUrl {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        url: row.try_get("url")?,
        name: row.try_get::<Option<String>, _>("name")?.unwrap_or_default(),
        interval: interval.parse().unwrap_or(CheckInterval::SixHour),
        status: status.parse().unwrap_or(UrlStatus::Error),
        response_time: row.try_get("response_time")?,
        last_checked: row.try_get("last_checked").ok(),
        created_at: row.try_get("created_at").ok(),
    })
}
