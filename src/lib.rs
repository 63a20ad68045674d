//! Sales Forecast Dashboard Library
//!
//! Descriptive analytics over historical store/item/day sales and point
//! forecasts from a pre-trained regressor exported to ONNX.

pub mod analytics;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod session;
pub mod types;

pub use config::AppConfig;
pub use dataset::SalesDataset;
pub use error::InferenceFailure;
pub use feature_extractor::{FeatureBuilder, FeatureRecord, FeatureRow};
pub use models::inference::InferenceEngine;
pub use session::Session;
pub use types::{prediction::Prediction, sales::SalesRecord};
