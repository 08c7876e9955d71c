pub mod health;
mod predict;

use crate::{model_service::ModelService, server::SharedState};
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes<M: ModelService>() -> Router<SharedState<M>> {
    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::healthcheck::<M>))
        .route("/predict", post(predict::predict::<M>))
}
