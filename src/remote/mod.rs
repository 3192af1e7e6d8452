//! The remote record service: per-month rows stored under `(year, month)`.

mod http;
mod memory;

pub use http::HttpRemote;
pub use memory::MemoryRemote;

use crate::model::{Month, Row};
use crate::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One month of rows as stored remotely.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    pub month: Month,
    pub year: i32,
    pub rows: Vec<Row>,
    #[serde(default, deserialize_with = "deserialize_updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Stores and fetches month records.
///
/// A fetch for a month that has never been saved is `Ok(None)`, not an error.
#[async_trait::async_trait]
pub trait Remote: Send {
    /// Creates or replaces the record for `(year, month)` and returns it as stored.
    async fn save_month(&mut self, year: i32, month: Month, rows: &[Row]) -> Result<MonthRecord>;

    async fn fetch_month(&mut self, year: i32, month: Month) -> Result<Option<MonthRecord>>;

    /// Every stored month of `year`, in no particular order.
    async fn fetch_year(&mut self, year: i32) -> Result<Vec<MonthRecord>>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_month(&mut self, year: i32, month: Month) -> Result<bool>;
}

/// Accepts RFC 3339 timestamps as well as naive ones, which are taken to be UTC.
fn deserialize_updated_at<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_month_record_parses_service_response() {
        let json = r#"{
            "month": "January",
            "year": 2024,
            "rows": [{"id": 1, "receiver": "City Transit", "transport": "85.00"}],
            "updated_at": "2024-01-31T18:30:00.123456"
        }"#;
        let record: MonthRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.month, Month::January);
        assert_eq!(record.rows[0].receiver(), "City Transit");
        let updated = record.updated_at.unwrap();
        assert_eq!(updated.day(), 31);
        assert_eq!(updated.hour(), 18);
    }

    #[test]
    fn test_month_record_updated_at_variants() {
        let with_offset = r#"{"month": "May", "year": 2024, "rows": [], "updated_at": "2024-05-01T10:00:00+02:00"}"#;
        let record: MonthRecord = serde_json::from_str(with_offset).unwrap();
        assert_eq!(record.updated_at.unwrap().hour(), 8);

        let missing = r#"{"month": "May", "year": 2024, "rows": []}"#;
        let record: MonthRecord = serde_json::from_str(missing).unwrap();
        assert!(record.updated_at.is_none());

        let null = r#"{"month": "May", "year": 2024, "rows": [], "updated_at": null}"#;
        assert!(serde_json::from_str::<MonthRecord>(null)
            .unwrap()
            .updated_at
            .is_none());

        let bad = r#"{"month": "May", "year": 2024, "rows": [], "updated_at": "yesterday"}"#;
        assert!(serde_json::from_str::<MonthRecord>(bad).is_err());
    }
}
