//! Synthetic Sales Generator
//!
//! Writes a `train.csv` shaped like the real sales history (date, store,
//! item, sales) so the dashboard can be tried without the original data.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use sales_forecast::SalesRecord;
use std::f64::consts::PI;
use tracing::info;

/// Relative weekday demand, Monday first; weekends sell the most.
const WEEKDAY_FACTOR: [f64; 7] = [0.80, 0.92, 0.93, 0.99, 1.06, 1.13, 1.18];

/// Sales generator with per-store and per-item scale
struct SalesGenerator {
    rng: rand::rngs::ThreadRng,
    store_scale: Vec<f64>,
    item_scale: Vec<f64>,
}

impl SalesGenerator {
    fn new(stores: u32, items: u32) -> Self {
        let mut rng = rand::thread_rng();
        let store_scale = (0..stores).map(|_| rng.gen_range(0.6..1.5)).collect();
        let item_scale = (0..items).map(|_| rng.gen_range(10.0..60.0)).collect();
        Self {
            rng,
            store_scale,
            item_scale,
        }
    }

    /// Expected units for one store/item/day, before noise
    fn expected(&self, store: u32, item: u32, date: NaiveDate, first_year: i32) -> f64 {
        let yearly = 1.0 + 0.25 * (2.0 * PI * (date.ordinal() as f64 - 80.0) / 365.0).sin();
        let growth = 1.0 + 0.07 * (date.year() - first_year) as f64;
        let weekday = WEEKDAY_FACTOR[date.weekday().num_days_from_monday() as usize];

        self.store_scale[(store - 1) as usize]
            * self.item_scale[(item - 1) as usize]
            * yearly
            * growth
            * weekday
    }

    fn generate(&mut self, store: u32, item: u32, date: NaiveDate, first_year: i32) -> SalesRecord {
        let expected = self.expected(store, item, date, first_year);
        let noise: f64 = self.rng.gen_range(0.8..1.2);
        let sales = (expected * noise).round().max(0.0) as u32;
        SalesRecord::new(date, store, item, sales)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("generate_sales=info".parse()?),
        )
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(|s| s.as_str()).unwrap_or("data/train.csv");
    let stores: u32 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
    let items: u32 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(50);
    let first_year: i32 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(2013);
    let years: i32 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(5);

    info!(
        output = %output,
        stores = stores,
        items = items,
        first_year = first_year,
        years = years,
        "Generating synthetic sales"
    );

    let start = NaiveDate::from_ymd_opt(first_year, 1, 1).context("invalid first year")?;
    let end = NaiveDate::from_ymd_opt(first_year + years, 1, 1).context("invalid year span")?;

    if let Some(parent) = std::path::Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
    }
    let mut writer =
        csv::Writer::from_path(output).with_context(|| format!("Failed to create {}", output))?;

    let mut generator = SalesGenerator::new(stores, items);
    let mut written: u64 = 0;

    // Row order matches the original file: item-major, then store, then date
    for item in 1..=items {
        for store in 1..=stores {
            for date in start.iter_days().take_while(|d| *d < end) {
                writer.serialize(generator.generate(store, item, date, first_year))?;
                written += 1;
            }
        }
        if item % 10 == 0 {
            info!("Generated items {}/{} ({} rows)", item, items, written);
        }
    }

    writer.flush()?;
    info!("Completed! Wrote {} rows to {}", written, output);

    Ok(())
}
