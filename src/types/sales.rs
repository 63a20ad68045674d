//! Historical sales record data structures

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One store/item/day observation from the historical sales file.
///
/// Calendar fields are derived from `date` on demand so a record can never
/// disagree with itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Observation day (`YYYY-MM-DD`)
    pub date: NaiveDate,

    /// Store identifier
    pub store: u32,

    /// Item identifier
    pub item: u32,

    /// Units sold that day
    pub sales: u32,
}

impl SalesRecord {
    /// Create a new sales record
    pub fn new(date: NaiveDate, store: u32, item: u32, sales: u32) -> Self {
        Self {
            date,
            store,
            item,
            sales,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Day of week, Monday = 0 .. Sunday = 6
    pub fn dayofweek(&self) -> u32 {
        self.date.weekday().num_days_from_monday()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_calendar_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let record = SalesRecord::new(date, 3, 7, 42);

        assert_eq!(record.year(), 2024);
        assert_eq!(record.month(), 3);
        assert_eq!(record.day(), 15);
        assert_eq!(record.dayofweek(), 4); // Friday
    }

    #[test]
    fn test_sales_record_serialization() {
        let date = NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
        let record = SalesRecord::new(date, 1, 1, 13);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"2013-01-01\""));

        let deserialized: SalesRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
