//! Descriptive aggregations over the sales history.
//!
//! Everything here is read-only and recomputed on demand; the dataset is
//! small enough that nothing is cached.

use crate::dataset::SalesDataset;
use chrono::Weekday;
use std::collections::{BTreeMap, HashSet};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFigures {
    pub total_sales: u64,
    pub store_count: usize,
    pub item_count: usize,
}

/// Sales total for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub sales: u64,
    /// Change from the previous month in percent; `None` for the first
    /// month or when the previous total is zero.
    pub pct_change: Option<f64>,
}

/// One equal-width bin of the sales distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Five-number summary of daily sales for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemSpread {
    pub item: u32,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Column labels of `correlation_matrix`.
pub const CORRELATION_COLUMNS: [&str; 5] = ["year", "month", "day", "dayofweek", "sales"];

pub fn key_figures(dataset: &SalesDataset) -> KeyFigures {
    let records = dataset.records();
    let stores: HashSet<u32> = records.iter().map(|r| r.store).collect();
    let items: HashSet<u32> = records.iter().map(|r| r.item).collect();

    KeyFigures {
        total_sales: records.iter().map(|r| r.sales as u64).sum(),
        store_count: stores.len(),
        item_count: items.len(),
    }
}

/// Per-month totals in chronological order.
pub fn monthly_totals(dataset: &SalesDataset) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for record in dataset.records() {
        *by_month.entry((record.year(), record.month())).or_insert(0) += record.sales as u64;
    }

    let mut previous: Option<u64> = None;
    by_month
        .into_iter()
        .map(|((year, month), sales)| {
            let pct_change = match previous {
                Some(prev) if prev > 0 => Some((sales as f64 - prev as f64) / prev as f64 * 100.0),
                _ => None,
            };
            previous = Some(sales);
            MonthlyTotal {
                year,
                month,
                sales,
                pct_change,
            }
        })
        .collect()
}

/// Mean daily sales per weekday, Monday first. Weekdays with no
/// observations are omitted.
pub fn weekday_means(dataset: &SalesDataset) -> Vec<(Weekday, f64)> {
    let mut sums = [0u64; 7];
    let mut counts = [0u64; 7];
    for record in dataset.records() {
        let idx = record.dayofweek() as usize;
        sums[idx] += record.sales as u64;
        counts[idx] += 1;
    }

    let mut day = Weekday::Mon;
    let mut means = Vec::with_capacity(7);
    for idx in 0..7 {
        if counts[idx] > 0 {
            means.push((day, sums[idx] as f64 / counts[idx] as f64));
        }
        day = day.succ();
    }
    means
}

/// Total sales per store, best first.
pub fn totals_by_store(dataset: &SalesDataset) -> Vec<(u32, u64)> {
    ranked(dataset.records().iter().map(|r| (r.store, r.sales as u64)))
}

/// Total sales per item, best first.
pub fn totals_by_item(dataset: &SalesDataset) -> Vec<(u32, u64)> {
    ranked(dataset.records().iter().map(|r| (r.item, r.sales as u64)))
}

/// Total sales per year, chronological.
pub fn totals_by_year(dataset: &SalesDataset) -> Vec<(i32, u64)> {
    let mut by_year: BTreeMap<i32, u64> = BTreeMap::new();
    for record in dataset.records() {
        *by_year.entry(record.year()).or_insert(0) += record.sales as u64;
    }
    by_year.into_iter().collect()
}

/// Best `n` (store, item) combinations by total sales.
pub fn top_store_items(dataset: &SalesDataset, n: usize) -> Vec<((u32, u32), u64)> {
    let mut ranked = ranked(
        dataset
            .records()
            .iter()
            .map(|r| ((r.store, r.item), r.sales as u64)),
    );
    ranked.truncate(n);
    ranked
}

/// Per-item spread of daily sales, items ascending. Quartiles interpolate
/// linearly between order statistics at position `q * (n - 1)`.
pub fn item_distribution(dataset: &SalesDataset) -> Vec<ItemSpread> {
    let mut by_item: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for record in dataset.records() {
        by_item.entry(record.item).or_default().push(record.sales as f64);
    }

    by_item
        .into_iter()
        .map(|(item, mut sales)| {
            sales.sort_by(|a, b| a.total_cmp(b));
            ItemSpread {
                item,
                min: sales[0],
                q1: quantile(&sales, 0.25),
                median: quantile(&sales, 0.5),
                q3: quantile(&sales, 0.75),
                max: sales[sales.len() - 1],
            }
        })
        .collect()
}

/// Linear-interpolation quantile of non-empty sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Equal-width histogram of daily sales over [min, max].
pub fn sales_histogram(dataset: &SalesDataset, bins: usize) -> Vec<HistogramBin> {
    let sales: Vec<u32> = dataset.records().iter().map(|r| r.sales).collect();
    let (Some(&min), Some(&max)) = (sales.iter().min(), sales.iter().max()) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let lower = min as f64;
    let span = (max - min) as f64;
    // Degenerate spread: a single bin holds everything.
    let width = if span > 0.0 { span / bins as f64 } else { 1.0 };
    let bins = if span > 0.0 { bins } else { 1 };

    let mut counts = vec![0u64; bins];
    for &s in &sales {
        let idx = (((s as f64 - lower) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lower + i as f64 * width,
            upper: lower + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Pearson correlation between the calendar fields and sales, in
/// `CORRELATION_COLUMNS` order. Undefined entries (constant column) are NaN.
pub fn correlation_matrix(dataset: &SalesDataset) -> [[f64; 5]; 5] {
    let columns: Vec<Vec<f64>> = vec![
        dataset.records().iter().map(|r| r.year() as f64).collect(),
        dataset.records().iter().map(|r| r.month() as f64).collect(),
        dataset.records().iter().map(|r| r.day() as f64).collect(),
        dataset.records().iter().map(|r| r.dayofweek() as f64).collect(),
        dataset.records().iter().map(|r| r.sales as f64).collect(),
    ];

    let mut matrix = [[f64::NAN; 5]; 5];
    for i in 0..5 {
        for j in i..5 {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Sum per key, sorted by total descending then key ascending.
fn ranked<K: Ord + Copy>(pairs: impl Iterator<Item = (K, u64)>) -> Vec<(K, u64)> {
    let mut totals: BTreeMap<K, u64> = BTreeMap::new();
    for (key, value) in pairs {
        *totals.entry(key).or_insert(0) += value;
    }

    let mut ranked: Vec<(K, u64)> = totals.into_iter().collect();
    // Stable sort keeps ascending key order among ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}
