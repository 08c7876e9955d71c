use crate::{
    inference_service::PredictError, model_service::ModelService, prediction::Prediction,
    server::SharedState,
};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const FILE_FIELD: &str = "file";

#[derive(Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// Failures are still answered with 200 and an `error` body, which is what
// existing clients check for.
impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        match &self {
            PredictError::LowConfidence(reason) => tracing::info!("{}", reason),
            _ => tracing::error!("Error during prediction: {}", self),
        }

        (
            StatusCode::OK,
            Json(ErrorBody {
                error: self.client_message().to_string(),
            }),
        )
            .into_response()
    }
}

/// Bytes of the `file` field, or of the first field when none is named
/// `file`.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, PredictError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PredictError::Upload(e.to_string()))?
    {
        let is_file = field.name() == Some(FILE_FIELD);
        if !is_file && fallback.is_some() {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| PredictError::Upload(e.to_string()))?;
        if is_file {
            return Ok(data);
        }
        fallback = Some(data);
    }

    fallback.ok_or(PredictError::MissingFile)
}

#[instrument(skip(state, multipart))]
pub async fn predict<M: ModelService>(
    State(state): State<SharedState<M>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, PredictError> {
    if !state.inference_service.is_model_loaded() {
        return Err(PredictError::ModelUnavailable);
    }

    let multipart = multipart.map_err(|e| PredictError::Upload(e.body_text()))?;
    let image_data = read_upload(multipart).await?;
    tracing::debug!("Received upload of {} bytes", image_data.len());

    let prediction = state.inference_service.classify(&image_data).await?;

    Ok(Json(prediction))
}
