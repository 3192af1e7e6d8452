//! An in-memory `Remote`, for tests and for running without a record service.

use crate::model::{Month, Row};
use crate::remote::{MonthRecord, Remote};
use crate::Result;
use chrono::Utc;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryRemote {
    records: BTreeMap<(i32, Month), MonthRecord>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, year: i32, month: Month) -> Option<&MonthRecord> {
        self.records.get(&(year, month))
    }
}

#[async_trait::async_trait]
impl Remote for MemoryRemote {
    async fn save_month(&mut self, year: i32, month: Month, rows: &[Row]) -> Result<MonthRecord> {
        let record = MonthRecord {
            month,
            year,
            rows: rows.to_vec(),
            updated_at: Some(Utc::now()),
        };
        self.records.insert((year, month), record.clone());
        Ok(record)
    }

    async fn fetch_month(&mut self, year: i32, month: Month) -> Result<Option<MonthRecord>> {
        Ok(self.records.get(&(year, month)).cloned())
    }

    async fn fetch_year(&mut self, year: i32) -> Result<Vec<MonthRecord>> {
        Ok(self
            .records
            .range((year, Month::FIRST)..=(year, Month::LAST))
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn delete_month(&mut self, year: i32, month: Month) -> Result<bool> {
        Ok(self.records.remove(&(year, month)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;

    #[tokio::test]
    async fn test_save_fetch_delete() {
        let mut remote = MemoryRemote::new();
        assert!(remote.fetch_month(2024, Month::May).await.unwrap().is_none());

        let rows = vec![Row::empty(1).with(Field::Deposit, "100")];
        let saved = remote.save_month(2024, Month::May, &rows).await.unwrap();
        assert!(saved.updated_at.is_some());

        let fetched = remote.fetch_month(2024, Month::May).await.unwrap().unwrap();
        assert_eq!(fetched.rows, rows);
        assert!(remote.fetch_month(2023, Month::May).await.unwrap().is_none());

        assert!(remote.delete_month(2024, Month::May).await.unwrap());
        assert!(!remote.delete_month(2024, Month::May).await.unwrap());
        assert!(remote.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_year_only_returns_that_year() {
        let mut remote = MemoryRemote::new();
        remote.save_month(2024, Month::March, &[]).await.unwrap();
        remote.save_month(2024, Month::January, &[]).await.unwrap();
        remote.save_month(2025, Month::January, &[]).await.unwrap();

        let months: Vec<Month> = remote
            .fetch_year(2024)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.month)
            .collect();
        assert_eq!(months, vec![Month::January, Month::March]);
        assert_eq!(remote.len(), 3);
    }
}
