use crate::{
    config::{Config, ModelConfig},
    hub::fetch_model,
    inference_service::InferenceService,
    model_service::ModelHandle,
    ort_service::OrtModelService,
    server::HttpServer,
};

/// Fetches and loads the classifier. Any failure leaves the handle
/// unavailable so the liveness route keeps answering.
pub async fn load_model(model_config: &ModelConfig) -> ModelHandle<OrtModelService> {
    let model_path = match fetch_model(&model_config.hub).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Error downloading model: {}", e);
            return ModelHandle::Unavailable;
        }
    };

    let num_instances = model_config.num_instances;
    let loaded = tokio::task::spawn_blocking(move || {
        OrtModelService::new(&model_path, num_instances)
    })
    .await;

    match loaded {
        Ok(Ok(ort_model_service)) => {
            tracing::info!("Model loaded successfully.");
            ModelHandle::loaded(ort_model_service)
        }
        Ok(Err(e)) => {
            tracing::error!("Error loading model: {}", e);
            ModelHandle::Unavailable
        }
        Err(e) => {
            tracing::error!("Model loading task failed: {}", e);
            ModelHandle::Unavailable
        }
    }
}

pub async fn start_app(config: Config) -> anyhow::Result<()> {
    let model = load_model(&config.model).await;
    let inference_service = InferenceService::from_config(model, &config.model);

    let server = HttpServer::new(inference_service, &config.server).await?;
    server.run().await?;

    Ok(())
}
