use ndarray::{Array, Ix4};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Session mutex poisoned: {0}")]
    Poisoned(String),
    #[error("Failed to build tensor: {0}")]
    Tensor(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Failed to extract tensor: {0}")]
    Extract(String),
}

/// A loaded classifier. One forward pass over a batch of one image,
/// returning one score per class.
pub trait ModelService: Send + Sync + 'static {
    fn predict(&self, input: Array<f32, Ix4>) -> Result<Vec<f32>, ModelError>;
}

pub enum ModelHandle<M: ModelService> {
    Loaded(Arc<M>),
    Unavailable,
}

impl<M: ModelService> ModelHandle<M> {
    pub fn loaded(model_service: M) -> Self {
        ModelHandle::Loaded(Arc::new(model_service))
    }

    pub fn get(&self) -> Option<Arc<M>> {
        match self {
            ModelHandle::Loaded(model_service) => Some(model_service.clone()),
            ModelHandle::Unavailable => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelHandle::Loaded(_))
    }
}

impl<M: ModelService> Clone for ModelHandle<M> {
    fn clone(&self) -> Self {
        match self {
            ModelHandle::Loaded(model_service) => ModelHandle::Loaded(model_service.clone()),
            ModelHandle::Unavailable => ModelHandle::Unavailable,
        }
    }
}
