//! Feature construction for sales model inference.
//!
//! Turns a (store, item, date) triple into the feature record the
//! regressor was trained on. Field names and order must match the model
//! schema exactly; see `models::schema`.

use crate::types::sales::SalesRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Integers at or above 2^24 lose precision as `f32`.
pub const MAX_EXACT_FEATURE: f32 = 16_777_216.0;

/// Canonical feature order used at training time.
pub const FEATURE_NAMES: [&str; 6] = ["store", "item", "year", "month", "day", "dayofweek"];

/// Integer encoding of the weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayConvention {
    /// Monday = 0 .. Sunday = 6
    #[default]
    Monday,
    /// Sunday = 0 .. Saturday = 6
    Sunday,
}

impl WeekdayConvention {
    pub fn encode(&self, date: NaiveDate) -> u32 {
        match self {
            WeekdayConvention::Monday => date.weekday().num_days_from_monday(),
            WeekdayConvention::Sunday => date.weekday().num_days_from_sunday(),
        }
    }
}

/// Single-row model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub store: u32,
    pub item: u32,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub dayofweek: u32,
}

impl FeatureRecord {
    /// Named values in canonical order.
    pub fn to_row(&self) -> FeatureRow {
        FEATURE_NAMES
            .iter()
            .zip(self.to_vec())
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    /// Positional view, same order as `FEATURE_NAMES`.
    ///
    /// Ids must stay below `MAX_EXACT_FEATURE` to survive the cast;
    /// `ModelSchema::validate` rejects rows that do not.
    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            self.store as f32,
            self.item as f32,
            self.year as f32,
            self.month as f32,
            self.day as f32,
            self.dayofweek as f32,
        ]
    }
}

/// Ordered (name, value) pairs handed to the predictor.
///
/// Rows built from a `FeatureRecord` are always well formed. Rows can also
/// be assembled by hand, so the predictor validates every one it receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(String, f32)>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f32) {
        self.columns.push((name.into(), value));
    }

    pub fn with(mut self, name: impl Into<String>, value: f32) -> Self {
        self.push(name, value);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> Vec<f32> {
        self.columns.iter().map(|(_, value)| *value).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, f32)> for FeatureRow {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Builds feature records from calendar dates.
///
/// Store and item are passed through untouched, even when they lie outside
/// the range seen in training.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureBuilder {
    convention: WeekdayConvention,
}

impl FeatureBuilder {
    /// Create a builder with the Monday = 0 convention.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_convention(convention: WeekdayConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> WeekdayConvention {
        self.convention
    }

    /// Decompose `date` into the model's calendar features.
    pub fn build(&self, store: u32, item: u32, date: NaiveDate) -> FeatureRecord {
        FeatureRecord {
            store,
            item,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            dayofweek: self.convention.encode(date),
        }
    }

    /// Same decomposition for a historical record.
    pub fn from_record(&self, record: &SalesRecord) -> FeatureRecord {
        self.build(record.store, record.item, record.date)
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_NAMES.len()
    }

    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_decomposition() {
        let builder = FeatureBuilder::new();
        let features = builder.build(2, 9, ymd(2024, 3, 15));

        assert_eq!(
            features,
            FeatureRecord {
                store: 2,
                item: 9,
                year: 2024,
                month: 3,
                day: 15,
                dayofweek: 4,
            }
        );
    }

    #[test]
    fn test_reference_prediction_input() {
        let features = FeatureBuilder::new().build(1, 1, ymd(2018, 1, 5));

        assert_eq!(features.to_vec(), vec![1.0, 1.0, 2018.0, 1.0, 5.0, 4.0]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = FeatureBuilder::new();
        let date = ymd(2017, 12, 31);

        assert_eq!(builder.build(10, 50, date), builder.build(10, 50, date));
        assert_eq!(builder.build(10, 50, date).dayofweek, 6); // Sunday
    }

    #[test]
    fn test_sunday_convention() {
        let builder = FeatureBuilder::with_convention(WeekdayConvention::Sunday);

        assert_eq!(builder.build(1, 1, ymd(2017, 12, 31)).dayofweek, 0);
        assert_eq!(builder.build(1, 1, ymd(2024, 3, 15)).dayofweek, 5);
    }

    #[test]
    fn test_out_of_range_ids_pass_through() {
        let features = FeatureBuilder::new().build(9_999, 0, ymd(2019, 6, 1));

        assert_eq!(features.store, 9_999);
        assert_eq!(features.item, 0);
    }

    #[test]
    fn test_row_order_matches_names() {
        let builder = FeatureBuilder::new();
        let row = builder.build(3, 4, ymd(2016, 2, 29)).to_row();

        assert_eq!(row.len(), builder.feature_count());
        assert_eq!(row.names().collect::<Vec<_>>(), builder.feature_names());
        assert_eq!(row.values(), vec![3.0, 4.0, 2016.0, 2.0, 29.0, 0.0]);
    }

    #[test]
    fn test_from_record() {
        let record = SalesRecord::new(ymd(2013, 1, 1), 1, 1, 13);
        let features = FeatureBuilder::new().from_record(&record);

        assert_eq!(features.year, record.year());
        assert_eq!(features.dayofweek, record.dayofweek());
    }
}
