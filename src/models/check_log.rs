use serde::Serialize;
use time::OffsetDateTime;
use crate::models::url::UrlStatus;
use crate::utils::datetime::serialize_offset_datetime;

/// One append-only check history entry. Never mutated after insert.
#[derive(Debug, Serialize)]
pub struct CheckLog {
    pub id: u64,
    pub url_id: u64,
    pub status: UrlStatus,
    pub response_time: i32,
    pub response_code: i32,
    pub error_message: Option<String>,
    #[serde(serialize_with = "serialize_offset_datetime")]
    pub checked_at: Option<OffsetDateTime>,
}
