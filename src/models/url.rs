use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use crate::utils::datetime::serialize_offset_datetime;

/// Scheduling bucket a monitored URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckInterval {
    #[serde(rename = "6hr")]
    SixHour,
    #[serde(rename = "12hr")]
    TwelveHour,
}

impl CheckInterval {
    pub const ALL: [CheckInterval; 2] = [CheckInterval::SixHour, CheckInterval::TwelveHour];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInterval::SixHour => "6hr",
            CheckInterval::TwelveHour => "12hr",
        }
    }
}

impl fmt::Display for CheckInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6hr" => Ok(CheckInterval::SixHour),
            "12hr" => Ok(CheckInterval::TwelveHour),
            other => Err(format!("unknown interval: {}", other)),
        }
    }
}

/// Classification of the most recent probe of a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    Online,
    Offline,
    Error,
}

impl UrlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlStatus::Online => "online",
            UrlStatus::Offline => "offline",
            UrlStatus::Error => "error",
        }
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(UrlStatus::Online),
            "offline" => Ok(UrlStatus::Offline),
            "error" => Ok(UrlStatus::Error),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonitoredUrl {
    pub id: u64,
    pub user_id: u64,
    pub url: String,
    pub name: String,
    pub interval: CheckInterval,
    pub status: UrlStatus,
    pub response_time: i32,
    #[serde(serialize_with = "serialize_offset_datetime")]
    pub last_checked: Option<OffsetDateTime>,
    #[serde(serialize_with = "serialize_offset_datetime")]
    pub created_at: Option<OffsetDateTime>,
}

/// The subset of a `urls` row the batch pipeline needs.
#[derive(Debug, Clone)]
pub struct CheckTarget {
    pub id: u64,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_round_trips_through_str() {
        for interval in CheckInterval::ALL {
            assert_eq!(interval.as_str().parse::<CheckInterval>(), Ok(interval));
        }
    }

    #[test]
    fn unknown_interval_is_rejected() {
        assert!("3hr".parse::<CheckInterval>().is_err());
        assert!("".parse::<CheckInterval>().is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [UrlStatus::Online, UrlStatus::Offline, UrlStatus::Error] {
            assert_eq!(status.as_str().parse::<UrlStatus>(), Ok(status));
        }
    }
}
