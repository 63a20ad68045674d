//! CSV sales history loader.
//!
//! Expected columns (header required, extra columns ignored):
//!   date, store, item, sales

use crate::types::sales::SalesRecord;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Read-only historical sales, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
}

impl SalesDataset {
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Load sales records from a CSV file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open dataset '{}'", path.display()))?;

        let dataset = load_sales(file)
            .with_context(|| format!("Failed to load dataset '{}'", path.display()))?;

        info!(
            path = %path.display(),
            records = dataset.len(),
            "Sales dataset loaded"
        );

        Ok(dataset)
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` records in file order.
    pub fn head(&self, n: usize) -> &[SalesRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Smallest and largest store id observed.
    pub fn store_range(&self) -> Option<(u32, u32)> {
        min_max(self.records.iter().map(|r| r.store))
    }

    /// Smallest and largest item id observed.
    pub fn item_range(&self) -> Option<(u32, u32)> {
        min_max(self.records.iter().map(|r| r.item))
    }
}

/// Load sales records from a CSV reader.
pub fn load_sales<R: Read>(reader: R) -> Result<SalesDataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (line_num, result) in csv_reader.deserialize().enumerate() {
        let record: SalesRecord =
            result.with_context(|| format!("CSV parse error at line {}", line_num + 2))?;
        records.push(record);
    }

    if records.is_empty() {
        bail!("dataset contains no sales records");
    }

    Ok(SalesDataset { records })
}

fn min_max(values: impl Iterator<Item = u32>) -> Option<(u32, u32)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE_CSV: &str = "\
date,store,item,sales
2013-01-01,1,1,13
2013-01-02,1,1,11
2013-01-01, 2 ,1,19
2013-01-01,1,5,7
2014-02-10,3,2,40
";

    #[test]
    fn test_load_sample_csv() {
        let dataset = load_sales(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 5);

        let first = &dataset.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2013, 1, 1).unwrap());
        assert_eq!(first.store, 1);
        assert_eq!(first.sales, 13);

        // whitespace trimmed
        assert_eq!(dataset.records()[2].store, 2);
    }

    #[test]
    fn test_observed_ranges() {
        let dataset = load_sales(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.store_range(), Some((1, 3)));
        assert_eq!(dataset.item_range(), Some((1, 5)));
    }

    #[test]
    fn test_head_is_bounded() {
        let dataset = load_sales(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(dataset.head(2).len(), 2);
        assert_eq!(dataset.head(50).len(), 5);
    }

    #[test]
    fn test_extra_columns_ignored_and_order_free() {
        let csv = "id,sales,item,store,date\n0,5,2,3,2015-07-04\n";
        let dataset = load_sales(csv.as_bytes()).unwrap();
        assert_eq!(dataset.records()[0].store, 3);
        assert_eq!(dataset.records()[0].item, 2);
        assert_eq!(dataset.records()[0].sales, 5);
    }

    #[test]
    fn test_bad_row_reports_line() {
        let csv = "date,store,item,sales\n2013-01-01,1,1,13\n2013-13-01,1,1,9\n";
        let err = load_sales(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_negative_sales_rejected() {
        let csv = "date,store,item,sales\n2013-01-01,1,1,-4\n";
        assert!(load_sales(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let csv = "date,store,item,sales\n";
        assert!(load_sales(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = SalesDataset::load_file("/nonexistent/train.csv").unwrap_err();
        assert!(err.to_string().contains("Failed to open dataset"));
    }
}
