//! Type definitions for the sales forecast dashboard

pub mod prediction;
pub mod sales;

pub use prediction::Prediction;
pub use sales::SalesRecord;
