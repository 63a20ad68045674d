//! Feature schema pinned next to the model artifact.
//!
//! The training job writes a small JSON sidecar describing the exact
//! input columns the regressor was fit on:
//!
//! ```json
//! {
//!   "model": "random_forest",
//!   "target": "sales",
//!   "features": ["store", "item", "year", "month", "day", "dayofweek"],
//!   "weekday_origin": "monday"
//! }
//! ```

use crate::error::InferenceFailure;
use crate::feature_extractor::{
    FeatureBuilder, FeatureRow, WeekdayConvention, FEATURE_NAMES, MAX_EXACT_FEATURE,
};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Model identifier, informational only
    #[serde(default = "default_model_name")]
    pub model: String,
    /// Target column the model predicts
    #[serde(default = "default_target")]
    pub target: String,
    /// Input columns in training order
    pub features: Vec<String>,
    /// Weekday encoding used when the training frame was built
    #[serde(default)]
    pub weekday_origin: WeekdayConvention,
}

fn default_model_name() -> String {
    "random_forest".to_string()
}

fn default_target() -> String {
    "sales".to_string()
}

impl Default for ModelSchema {
    fn default() -> Self {
        Self {
            model: default_model_name(),
            target: default_target(),
            features: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            weekday_origin: WeekdayConvention::Monday,
        }
    }
}

impl ModelSchema {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model schema {:?}", path))?;
        let schema: ModelSchema = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model schema {:?}", path))?;

        info!(
            model = %schema.model,
            features = ?schema.features,
            weekday_origin = ?schema.weekday_origin,
            "Model schema loaded"
        );

        Ok(schema)
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Startup check: the builder must produce exactly the schema's columns
    /// with the same weekday encoding.
    pub fn ensure_compatible(&self, builder: &FeatureBuilder) -> Result<()> {
        let produced = builder.feature_names();
        if self.features.len() != produced.len()
            || self.features.iter().zip(produced).any(|(a, b)| a != b)
        {
            bail!(
                "model expects features {:?} but the feature builder produces {:?}",
                self.features,
                produced
            );
        }
        if self.weekday_origin != builder.convention() {
            bail!(
                "model was trained with weekday origin {:?} but the feature builder uses {:?}",
                self.weekday_origin,
                builder.convention()
            );
        }
        Ok(())
    }

    /// Per-call check: names and order must match; returns the positional
    /// values ready for the backend.
    pub fn validate(&self, row: &FeatureRow) -> Result<Vec<f32>, InferenceFailure> {
        let names: Vec<&str> = row.names().collect();

        let missing: Vec<&str> = self
            .features
            .iter()
            .map(String::as_str)
            .filter(|f| !names.contains(f))
            .collect();
        if !missing.is_empty() {
            return Err(InferenceFailure::SchemaMismatch(format!(
                "missing features {:?}",
                missing
            )));
        }

        let extra: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.features.iter().any(|f| f == n))
            .collect();
        if !extra.is_empty() {
            return Err(InferenceFailure::SchemaMismatch(format!(
                "unexpected features {:?}",
                extra
            )));
        }

        if names.len() != self.features.len()
            || names.iter().zip(&self.features).any(|(a, b)| a != b)
        {
            return Err(InferenceFailure::SchemaMismatch(format!(
                "expected features in order {:?}, got {:?}",
                self.features, names
            )));
        }

        let values = row.values();
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(InferenceFailure::SchemaMismatch(format!(
                "feature '{}' is not a finite number",
                self.features[pos]
            )));
        }
        if let Some(pos) = values.iter().position(|v| v.abs() >= MAX_EXACT_FEATURE) {
            return Err(InferenceFailure::SchemaMismatch(format!(
                "feature '{}' exceeds the exact f32 integer range",
                self.features[pos]
            )));
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn well_formed_row() -> FeatureRow {
        FeatureBuilder::new()
            .build(1, 1, NaiveDate::from_ymd_opt(2018, 1, 5).unwrap())
            .to_row()
    }

    #[test]
    fn test_parse_sidecar() {
        let json = r#"{
            "model": "random_forest",
            "target": "sales",
            "features": ["store", "item", "year", "month", "day", "dayofweek"],
            "weekday_origin": "monday"
        }"#;
        let schema: ModelSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema, ModelSchema::default());
    }

    #[test]
    fn test_sidecar_defaults() {
        let json = r#"{ "features": ["store", "item"] }"#;
        let schema: ModelSchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.model, "random_forest");
        assert_eq!(schema.weekday_origin, WeekdayConvention::Monday);
        assert_eq!(schema.feature_count(), 2);
    }

    #[test]
    fn test_builder_compatibility() {
        let schema = ModelSchema::default();
        assert!(schema.ensure_compatible(&FeatureBuilder::new()).is_ok());

        let sunday = FeatureBuilder::with_convention(WeekdayConvention::Sunday);
        assert!(schema.ensure_compatible(&sunday).is_err());

        let mut reordered = ModelSchema::default();
        reordered.features.swap(0, 1);
        assert!(reordered.ensure_compatible(&FeatureBuilder::new()).is_err());
    }

    #[test]
    fn test_configured_builder_checked_against_schema() {
        let schema = ModelSchema::default();

        let mut model = crate::config::ModelConfig::default();
        let builder = FeatureBuilder::with_convention(model.weekday_origin);
        assert!(schema.ensure_compatible(&builder).is_ok());

        model.weekday_origin = WeekdayConvention::Sunday;
        let builder = FeatureBuilder::with_convention(model.weekday_origin);
        let err = schema.ensure_compatible(&builder).unwrap_err();
        assert!(err.to_string().contains("weekday origin"));
    }

    #[test]
    fn test_validate_well_formed() {
        let values = ModelSchema::default().validate(&well_formed_row()).unwrap();
        assert_eq!(values, vec![1.0, 1.0, 2018.0, 1.0, 5.0, 4.0]);
    }

    #[test]
    fn test_validate_missing_field() {
        let row = FeatureRow::new()
            .with("store", 1.0)
            .with("item", 1.0)
            .with("year", 2018.0)
            .with("month", 1.0)
            .with("day", 5.0);

        let err = ModelSchema::default().validate(&row).unwrap_err();
        assert!(matches!(err, InferenceFailure::SchemaMismatch(_)));
        assert!(err.to_string().contains("dayofweek"));
    }

    #[test]
    fn test_validate_extra_field() {
        let row = well_formed_row().with("promo", 1.0);

        let err = ModelSchema::default().validate(&row).unwrap_err();
        assert!(err.to_string().contains("promo"));
    }

    #[test]
    fn test_validate_reordered_fields() {
        let row = FeatureRow::new()
            .with("item", 1.0)
            .with("store", 1.0)
            .with("year", 2018.0)
            .with("month", 1.0)
            .with("day", 5.0)
            .with("dayofweek", 4.0);

        let err = ModelSchema::default().validate(&row).unwrap_err();
        assert!(err.to_string().contains("order"));
    }

    #[test]
    fn test_validate_non_finite_value() {
        let row = FeatureRow::new()
            .with("store", 1.0)
            .with("item", f32::NAN)
            .with("year", 2018.0)
            .with("month", 1.0)
            .with("day", 5.0)
            .with("dayofweek", 4.0);

        let err = ModelSchema::default().validate(&row).unwrap_err();
        assert!(err.to_string().contains("item"));
    }

    #[test]
    fn test_validate_rejects_inexact_ids() {
        let date = NaiveDate::from_ymd_opt(2018, 1, 5).unwrap();
        let schema = ModelSchema::default();

        let largest = FeatureBuilder::new().build(16_777_215, 1, date).to_row();
        assert!(schema.validate(&largest).is_ok());

        let row = FeatureBuilder::new().build(1, 16_777_217, date).to_row();
        let err = schema.validate(&row).unwrap_err();
        assert!(matches!(err, InferenceFailure::SchemaMismatch(_)));
        assert!(err.to_string().contains("item"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(ModelSchema::load_from_path("/nonexistent/schema.json").is_err());
    }
}
