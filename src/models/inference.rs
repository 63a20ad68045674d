//! Sales regressor inference

use crate::config::AppConfig;
use crate::error::InferenceFailure;
use crate::feature_extractor::FeatureRow;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::models::schema::ModelSchema;
use crate::types::prediction::Prediction;
use anyhow::{bail, Result};
use ort::value::Tensor;
use std::sync::RwLock;
use tracing::{debug, info};

/// The pre-trained model, treated as a black box.
pub trait Regressor {
    fn name(&self) -> &str;

    /// Feature width the model declares, if it declares one.
    fn input_width(&self) -> Option<usize>;

    /// Score one positional feature vector.
    fn predict_raw(&self, features: &[f32]) -> Result<f64, InferenceFailure>;
}

/// Regressor backed by an ONNX Runtime session.
pub struct OnnxRegressor {
    /// Session needs exclusive access while running
    model: RwLock<LoadedModel>,
    name: String,
    input_width: Option<usize>,
}

impl OnnxRegressor {
    pub fn load(config: &AppConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.model.onnx_threads)?;
        let model = loader.load_model(&config.model.path, &config.model.name)?;
        Ok(Self::from_loaded(model))
    }

    pub fn from_loaded(model: LoadedModel) -> Self {
        Self {
            name: model.name.clone(),
            input_width: model.input_width,
            model: RwLock::new(model),
        }
    }

    fn run(model: &mut LoadedModel, features: &[f32]) -> Result<f64, InferenceFailure> {
        // Prepare input tensor - shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))?;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])?;

        let output = outputs
            .get(model.output_name.as_str())
            .ok_or_else(|| {
                InferenceFailure::InvalidOutput(format!("missing output '{}'", model.output_name))
            })?;

        // skl2onnx emits float regressors; double exports show up too
        let value = if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            data.first().map(|&v| v as f64)
        } else {
            let (_, data) = output.try_extract_tensor::<f64>()?;
            data.first().copied()
        };

        value.ok_or_else(|| InferenceFailure::InvalidOutput("empty output tensor".to_string()))
    }
}

impl Regressor for OnnxRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_width(&self) -> Option<usize> {
        self.input_width
    }

    fn predict_raw(&self, features: &[f32]) -> Result<f64, InferenceFailure> {
        let mut model = self
            .model
            .write()
            .map_err(|e| InferenceFailure::Backend(format!("Lock error: {}", e)))?;
        Self::run(&mut model, features)
    }
}

/// Validates feature rows against the model schema and delegates scoring
/// to the regressor.
pub struct InferenceEngine {
    regressor: Box<dyn Regressor>,
    schema: ModelSchema,
}

impl InferenceEngine {
    /// Load schema and ONNX model from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let schema = ModelSchema::load_from_path(&config.model.schema_path)?;
        let regressor = OnnxRegressor::load(config)?;
        Self::with_regressor(Box::new(regressor), schema)
    }

    /// Wrap any regressor; rejects a model whose declared input width
    /// disagrees with the schema.
    pub fn with_regressor(regressor: Box<dyn Regressor>, schema: ModelSchema) -> Result<Self> {
        if let Some(width) = regressor.input_width() {
            if width != schema.feature_count() {
                bail!(
                    "model '{}' takes {} features but its schema lists {}",
                    regressor.name(),
                    width,
                    schema.feature_count()
                );
            }
        }

        info!(
            model = %regressor.name(),
            features = schema.feature_count(),
            "Inference engine initialized"
        );

        Ok(Self { regressor, schema })
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.regressor.name()
    }

    /// Score one feature row.
    pub fn predict(&self, row: &FeatureRow) -> Result<Prediction, InferenceFailure> {
        let features = self.schema.validate(row)?;
        let value = self.regressor.predict_raw(&features)?;

        if !value.is_finite() {
            return Err(InferenceFailure::InvalidOutput(format!(
                "non-finite estimate {}",
                value
            )));
        }

        debug!(model = %self.regressor.name(), prediction = value, "Inference complete");

        Ok(Prediction::new(value))
    }
}
