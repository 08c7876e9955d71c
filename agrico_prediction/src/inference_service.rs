use crate::{
    config::{ModelConfig, ScoreKind},
    model_service::{ModelError, ModelHandle, ModelService},
    prediction::{build_prediction, ConfidencePolicy, Prediction, ReductionError},
    preprocess::{decode_rgb, to_batch, PreprocessError},
};
use thiserror::Error;

pub const MODEL_UNAVAILABLE: &str = "Model is not loaded properly.";
pub const MISSING_FILE: &str = "No file uploaded.";
pub const NOT_A_RICE_LEAF: &str = "The uploaded image does not appear to be a rice leaf.";
pub const PROCESSING_FAILED: &str = "An error occurred while processing the image.";

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Model is unavailable")]
    ModelUnavailable,
    #[error("Upload carries no file")]
    MissingFile,
    #[error("Failed to read upload: {0}")]
    Upload(String),
    #[error("Invalid image data: {0}")]
    Decode(#[from] PreprocessError),
    #[error("Model call failed: {0}")]
    Inference(#[from] ModelError),
    #[error("Could not reduce model output: {0}")]
    Reduction(ReductionError),
    #[error("Rejected prediction: {0}")]
    LowConfidence(ReductionError),
    #[error("Inference task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ReductionError> for PredictError {
    fn from(err: ReductionError) -> Self {
        match err {
            ReductionError::LowConfidence { .. } => PredictError::LowConfidence(err),
            other => PredictError::Reduction(other),
        }
    }
}

impl PredictError {
    /// Text shown to the client. Details stay in the server logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            PredictError::ModelUnavailable => MODEL_UNAVAILABLE,
            PredictError::MissingFile => MISSING_FILE,
            PredictError::LowConfidence(_) => NOT_A_RICE_LEAF,
            PredictError::Upload(_)
            | PredictError::Decode(_)
            | PredictError::Inference(_)
            | PredictError::Reduction(_)
            | PredictError::Task(_) => PROCESSING_FAILED,
        }
    }
}

pub struct InferenceService<M: ModelService> {
    model: ModelHandle<M>,
    scores: ScoreKind,
    policy: ConfidencePolicy,
    image_size: Option<u32>,
}

impl<M: ModelService> Clone for InferenceService<M> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            scores: self.scores,
            policy: self.policy,
            image_size: self.image_size,
        }
    }
}

impl<M: ModelService> InferenceService<M> {
    pub fn new(
        model: ModelHandle<M>,
        scores: ScoreKind,
        policy: ConfidencePolicy,
        image_size: Option<u32>,
    ) -> Self {
        Self {
            model,
            scores,
            policy,
            image_size,
        }
    }

    pub fn from_config(model: ModelHandle<M>, config: &ModelConfig) -> Self {
        let policy = if config.reject_low_confidence {
            ConfidencePolicy::reject_below(config.min_confidence)
        } else {
            ConfidencePolicy::accept_all()
        };
        Self::new(model, config.scores, policy, config.image_size)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    pub async fn classify(&self, image_data: &[u8]) -> Result<Prediction, PredictError> {
        let model = self.model.get().ok_or(PredictError::ModelUnavailable)?;

        let image = decode_rgb(image_data)?;
        let batch = to_batch(&image, self.image_size);

        let scores = tokio::task::spawn_blocking(move || model.predict(batch)).await??;
        tracing::debug!("Predictions: {:?}", scores);

        let prediction = build_prediction(&scores, self.scores, self.policy)?;
        tracing::debug!(
            "Predicted {} with confidence {:.3}",
            prediction.class,
            prediction.confidence
        );

        Ok(prediction)
    }
}
