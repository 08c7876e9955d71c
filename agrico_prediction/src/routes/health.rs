use crate::{model_service::ModelService, server::SharedState};
use axum::{extract::State, response::IntoResponse, response::Json};
use serde::{Deserialize, Serialize};

pub const LIVE_MESSAGE: &str = "Agrico API is live!";

#[derive(Serialize, Deserialize)]
pub struct Live {
    message: String,
}

#[derive(Serialize, Deserialize)]
pub struct Status {
    status: String,
    model_loaded: bool,
}

pub async fn home() -> impl IntoResponse {
    Json(Live {
        message: LIVE_MESSAGE.into(),
    })
}

pub async fn healthcheck<M: ModelService>(State(state): State<SharedState<M>>) -> impl IntoResponse {
    let model_loaded = state.inference_service.is_model_loaded();
    let status = if model_loaded { "Available" } else { "Degraded" };

    Json(Status {
        status: status.into(),
        model_loaded,
    })
}
