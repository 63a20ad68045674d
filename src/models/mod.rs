//! ML model inference components

pub mod inference;
pub mod loader;
pub mod schema;

pub use inference::{InferenceEngine, OnnxRegressor, Regressor};
pub use loader::ModelLoader;
pub use schema::ModelSchema;
