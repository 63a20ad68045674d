//! Interactive text session: dashboard, exploration and the prediction form.
//!
//! Reads from any `BufRead` and writes to any `Write`, so the whole loop
//! can be driven from tests. End of input ends the session.

use crate::analytics::{self, CORRELATION_COLUMNS};
use crate::config::SessionConfig;
use crate::dataset::SalesDataset;
use crate::feature_extractor::{FeatureBuilder, FeatureRow};
use crate::metrics::SessionMetrics;
use crate::models::inference::InferenceEngine;
use anyhow::Result;
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

const BAR_WIDTH: usize = 40;

pub struct Session<'a, R, W> {
    dataset: &'a SalesDataset,
    engine: &'a InferenceEngine,
    metrics: &'a SessionMetrics,
    builder: FeatureBuilder,
    settings: SessionConfig,
    today: NaiveDate,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// The feature builder defaults to the weekday convention pinned by the
    /// engine's schema.
    pub fn new(
        dataset: &'a SalesDataset,
        engine: &'a InferenceEngine,
        metrics: &'a SessionMetrics,
        input: R,
        output: W,
    ) -> Self {
        Self {
            dataset,
            engine,
            metrics,
            builder: FeatureBuilder::with_convention(engine.schema().weekday_origin),
            settings: SessionConfig::default(),
            today: chrono::Local::now().date_naive(),
            input,
            output,
        }
    }

    pub fn with_settings(mut self, settings: SessionConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the feature builder; rows it produces are still validated
    /// against the engine's schema on every prediction.
    pub fn with_builder(mut self, builder: FeatureBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Default date offered by the prediction form.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Menu loop until `q` or end of input.
    pub fn run(&mut self) -> Result<()> {
        info!(model = %self.engine.model_name(), "Session started");

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "== Sales Forecast ==")?;
            writeln!(self.output, " 1) Dashboard")?;
            writeln!(self.output, " 2) Exploration")?;
            writeln!(self.output, " 3) Prediction")?;
            writeln!(self.output, " q) Quit")?;

            let Some(choice) = self.prompt("> ")? else {
                break;
            };

            match choice.as_str() {
                "1" => self.show_dashboard()?,
                "2" => self.show_exploration()?,
                "3" => {
                    if !self.prediction_form()? {
                        break;
                    }
                }
                "q" | "Q" | "quit" => break,
                other => writeln!(self.output, "Unknown choice '{}'", other)?,
            }
        }

        info!("Session ended");
        Ok(())
    }

    /// Prompt for store, item and date, then submit. Returns `false` when
    /// input ran out mid-form.
    pub fn prediction_form(&mut self) -> Result<bool> {
        writeln!(self.output)?;
        writeln!(self.output, "-- Sales prediction --")?;

        let stores = self.dataset.store_range().unwrap_or((0, u32::MAX));
        let items = self.dataset.item_range().unwrap_or((0, u32::MAX));

        let Some(store) = self.prompt_id("Store", stores)? else {
            return Ok(false);
        };
        let Some(item) = self.prompt_id("Item", items)? else {
            return Ok(false);
        };
        let Some(date) = self.prompt_date()? else {
            return Ok(false);
        };

        let message = self.submit(store, item, date);
        writeln!(self.output, "{}", message)?;
        Ok(true)
    }

    /// Build the feature record and score it.
    pub fn submit(&self, store: u32, item: u32, date: NaiveDate) -> String {
        let features = self.builder.build(store, item, date);
        debug!(store, item, %date, features = ?features, "Feature record built");
        self.submit_row(&features.to_row())
    }

    /// Score a row and turn the outcome into the message shown to the
    /// user. Failures are reported, never propagated.
    pub fn submit_row(&self, row: &FeatureRow) -> String {
        let started = Instant::now();
        match self.engine.predict(row) {
            Ok(prediction) => {
                let latency = started.elapsed();
                self.metrics.record_prediction(latency);
                info!(
                    prediction = prediction.value,
                    latency_us = latency.as_micros() as u64,
                    "Prediction served"
                );
                format!("Predicted sales: {}", prediction)
            }
            Err(e) => {
                self.metrics.record_failure();
                warn!(error = %e, "Prediction failed");
                format!("Prediction failed: {}", e)
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_id(&mut self, label: &str, (lo, hi): (u32, u32)) -> Result<Option<u32>> {
        loop {
            let question = format!("{} [{}-{}] (default {}): ", label, lo, hi, lo);
            let Some(answer) = self.prompt(&question)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(lo));
            }
            match answer.parse::<u32>() {
                Ok(v) if (lo..=hi).contains(&v) => return Ok(Some(v)),
                _ => writeln!(
                    self.output,
                    "Please enter a whole number between {} and {}",
                    lo, hi
                )?,
            }
        }
    }

    fn prompt_date(&mut self) -> Result<Option<NaiveDate>> {
        loop {
            let question = format!("Date YYYY-MM-DD (default {}): ", self.today);
            let Some(answer) = self.prompt(&question)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(Some(self.today));
            }
            match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
                Ok(date) => return Ok(Some(date)),
                Err(_) => writeln!(self.output, "Please enter a date as YYYY-MM-DD")?,
            }
        }
    }

    fn show_dashboard(&mut self) -> Result<()> {
        let figures = analytics::key_figures(self.dataset);
        writeln!(self.output)?;
        writeln!(self.output, "-- Dashboard --")?;
        writeln!(self.output, "Total sales:    {}", thousands(figures.total_sales))?;
        writeln!(self.output, "Stores:         {}", figures.store_count)?;
        writeln!(self.output, "Items:          {}", figures.item_count)?;

        let months = analytics::monthly_totals(self.dataset);
        let peak = months.iter().map(|m| m.sales).max().unwrap_or(0);
        writeln!(self.output)?;
        writeln!(self.output, "Sales per month (change vs previous month)")?;
        for m in &months {
            let change = m
                .pct_change
                .map(|p| format!("{:+.1}%", p))
                .unwrap_or_else(|| "n/a".to_string());
            writeln!(
                self.output,
                "  {}-{:02} {:>12} {:>8} {}",
                m.year,
                m.month,
                m.sales,
                change,
                bar(m.sales as f64, peak as f64)
            )?;
        }

        let weekdays = analytics::weekday_means(self.dataset);
        let peak = weekdays.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        writeln!(self.output)?;
        writeln!(self.output, "Mean daily sales by weekday")?;
        for (day, mean) in &weekdays {
            writeln!(self.output, "  {} {:>10.2} {}", day, mean, bar(*mean, peak))?;
        }

        let top = analytics::top_store_items(self.dataset, self.settings.top_combinations);
        writeln!(self.output)?;
        writeln!(self.output, "Best store/item combinations")?;
        for ((store, item), total) in &top {
            writeln!(self.output, "  store {:>4} item {:>4} {:>12}", store, item, total)?;
        }
        Ok(())
    }

    fn show_exploration(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "-- Exploration --")?;
        writeln!(self.output, "{:<12} {:>6} {:>6} {:>6}", "date", "store", "item", "sales")?;
        for r in self.dataset.head(self.settings.preview_rows) {
            writeln!(
                self.output,
                "{:<12} {:>6} {:>6} {:>6}",
                r.date.to_string(),
                r.store,
                r.item,
                r.sales
            )?;
        }

        self.ranking("Sales by store", "store", &analytics::totals_by_store(self.dataset))?;
        self.ranking("Sales by item", "item", &analytics::totals_by_item(self.dataset))?;

        writeln!(self.output)?;
        writeln!(self.output, "Sales spread by item")?;
        writeln!(
            self.output,
            "  {:>9} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "item", "min", "q1", "median", "q3", "max"
        )?;
        for s in analytics::item_distribution(self.dataset) {
            writeln!(
                self.output,
                "  item {:>4} {:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>8.1}",
                s.item, s.min, s.q1, s.median, s.q3, s.max
            )?;
        }

        let years = analytics::totals_by_year(self.dataset);
        let peak = years.iter().map(|(_, v)| *v).max().unwrap_or(0);
        writeln!(self.output)?;
        writeln!(self.output, "Sales by year")?;
        for (year, total) in &years {
            writeln!(self.output, "  {} {:>12} {}", year, total, bar(*total as f64, peak as f64))?;
        }

        let bins = analytics::sales_histogram(self.dataset, self.settings.histogram_bins);
        let peak = bins.iter().map(|b| b.count).max().unwrap_or(0);
        writeln!(self.output)?;
        writeln!(self.output, "Distribution of daily sales")?;
        for b in &bins {
            writeln!(
                self.output,
                "  {:>8.1}-{:<8.1} {:>8} {}",
                b.lower,
                b.upper,
                b.count,
                bar(b.count as f64, peak as f64)
            )?;
        }

        let matrix = analytics::correlation_matrix(self.dataset);
        writeln!(self.output)?;
        writeln!(self.output, "Correlation matrix")?;
        write!(self.output, "  {:<10}", "")?;
        for name in CORRELATION_COLUMNS {
            write!(self.output, "{:>10}", name)?;
        }
        writeln!(self.output)?;
        for (name, row) in CORRELATION_COLUMNS.iter().zip(matrix.iter()) {
            write!(self.output, "  {:<10}", name)?;
            for r in row {
                if r.is_nan() {
                    write!(self.output, "{:>10}", "n/a")?;
                } else {
                    write!(self.output, "{:>10.3}", r)?;
                }
            }
            writeln!(self.output)?;
        }
        Ok(())
    }

    fn ranking(&mut self, title: &str, label: &str, totals: &[(u32, u64)]) -> Result<()> {
        let peak = totals.first().map(|(_, v)| *v).unwrap_or(0);
        writeln!(self.output)?;
        writeln!(self.output, "{}", title)?;
        for (id, total) in totals {
            writeln!(
                self.output,
                "  {} {:>4} {:>12} {}",
                label,
                id,
                total,
                bar(*total as f64, peak as f64)
            )?;
        }
        Ok(())
    }
}

/// Integer with comma thousands separators, e.g. `1,234,567`.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn bar(value: f64, peak: f64) -> String {
    if peak <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / peak) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.min(BAR_WIDTH))
}
