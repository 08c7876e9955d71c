use crate::{
    config::ServerConfig, inference_service::InferenceService, model_service::ModelService,
    routes::api_routes,
};
use axum::{extract::DefaultBodyLimit, Router};
use std::{future::Future, net::SocketAddr};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub struct SharedState<M: ModelService> {
    pub inference_service: InferenceService<M>,
}

impl<M: ModelService> Clone for SharedState<M> {
    fn clone(&self) -> Self {
        Self {
            inference_service: self.inference_service.clone(),
        }
    }
}

pub fn build_router<M: ModelService>(
    inference_service: InferenceService<M>,
    max_upload_bytes: usize,
) -> Router {
    let app_state = SharedState { inference_service };

    Router::new()
        .merge(api_routes::<M>())
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<M: ModelService>(
        inference_service: InferenceService<M>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let router = build_router(inference_service, config.max_upload_bytes);
        let listener = TcpListener::bind(config.get_address()).await?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> anyhow::Result<()> {
        self.run_until(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown");
        })
        .await
    }

    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Inference service listening on {}", self.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Inference service stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ScoreKind,
        inference_service::{MODEL_UNAVAILABLE, NOT_A_RICE_LEAF, PROCESSING_FAILED},
        model_service::{ModelError, ModelHandle},
        prediction::ConfidencePolicy,
        routes::health::LIVE_MESSAGE,
    };
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use ndarray::{Array, Ix4};
    use reqwest::multipart::{Form, Part};
    use serde_json::{json, Value};
    use std::io::Cursor;
    use tokio::sync::oneshot;

    struct MockModelService {
        scores: Vec<f32>,
    }

    impl ModelService for MockModelService {
        fn predict(&self, _input: Array<f32, Ix4>) -> Result<Vec<f32>, ModelError> {
            Ok(self.scores.clone())
        }
    }

    struct TestServer {
        base_url: String,
        shutdown_tx: oneshot::Sender<()>,
    }

    async fn spawn_server(model: ModelHandle<MockModelService>) -> TestServer {
        let inference_service = InferenceService::new(
            model,
            ScoreKind::Probabilities,
            ConfidencePolicy::reject_below(0.5),
            None,
        );
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 1024 * 1024,
        };
        let server = HttpServer::new(inference_service, &config).await.unwrap();
        let base_url = format!("http://{}", server.local_addr().unwrap());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(server.run_until(async move {
            shutdown_rx.await.ok();
        }));

        TestServer {
            base_url,
            shutdown_tx,
        }
    }

    fn loaded(scores: Vec<f32>) -> ModelHandle<MockModelService> {
        ModelHandle::loaded(MockModelService { scores })
    }

    fn leaf_png() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(32, 32, Rgb([30, 170, 50]));
        let mut image_data: Vec<u8> = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut image_data), ImageFormat::Png)
            .unwrap();
        image_data
    }

    async fn post_file(base_url: &str, field: &str, bytes: Vec<u8>) -> (u16, Value) {
        let form = Form::new().part(field.to_string(), Part::bytes(bytes).file_name("leaf.png"));
        let response = reqwest::Client::new()
            .post(format!("{}/predict", base_url))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json::<Value>().await.unwrap())
    }

    #[tokio::test]
    async fn test_liveness_does_not_depend_on_model() {
        let server = spawn_server(ModelHandle::Unavailable).await;

        let body: Value = reqwest::get(format!("{}/", server.base_url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body, json!({ "message": LIVE_MESSAGE }));
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_health_reports_model_state() {
        let server = spawn_server(ModelHandle::Unavailable).await;

        let body: Value = reqwest::get(format!("{}/health", server.base_url))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body, json!({ "status": "Degraded", "model_loaded": false }));
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_predict_healthy_leaf() {
        let server = spawn_server(loaded(vec![
            0.01, 0.02, 0.9, 0.01, 0.02, 0.01, 0.01, 0.01, 0.01,
        ]))
        .await;

        let (status, body) = post_file(&server.base_url, "file", leaf_png()).await;

        assert_eq!(status, 200);
        assert_eq!(body["class"], "healthy");
        assert!(body["confidence"].as_f64().unwrap() >= 0.5);
        assert_eq!(
            body["symptoms"],
            "No visible disease symptoms, healthy rice leaves."
        );
        assert_eq!(
            body["treatment"],
            "No treatment necessary. Ensure proper maintenance of rice field conditions."
        );
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_predict_without_model() {
        let server = spawn_server(ModelHandle::Unavailable).await;

        let (status, body) = post_file(&server.base_url, "file", leaf_png()).await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "error": MODEL_UNAVAILABLE }));
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_predict_malformed_upload() {
        let server = spawn_server(loaded(vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])).await;

        let (status, body) =
            post_file(&server.base_url, "file", b"GIF89a but not really".to_vec()).await;

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "error": PROCESSING_FAILED }));
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_predict_rejects_uncertain_image() {
        let server = spawn_server(loaded(vec![
            0.2, 0.15, 0.1, 0.1, 0.1, 0.1, 0.1, 0.05, 0.1,
        ]))
        .await;

        let (_, body) = post_file(&server.base_url, "image", leaf_png()).await;

        assert_eq!(body, json!({ "error": NOT_A_RICE_LEAF }));
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_predict_requires_multipart_body() {
        let server = spawn_server(loaded(vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])).await;

        let response = reqwest::Client::new()
            .post(format!("{}/predict", server.base_url))
            .header("Content-Type", "application/json")
            .body(r#"{"file": "leaf.png"}"#)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap();

        assert_eq!(status, 200);
        assert_eq!(body, json!({ "error": PROCESSING_FAILED }));
        server.shutdown_tx.send(()).ok();
    }

    #[tokio::test]
    async fn test_cors_mirrors_origin_with_credentials() {
        let server = spawn_server(ModelHandle::Unavailable).await;

        let response = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, format!("{}/predict", server.base_url))
            .header("Origin", "https://farm.example")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .send()
            .await
            .unwrap();
        let headers = response.headers();

        assert_eq!(
            headers["access-control-allow-origin"],
            "https://farm.example"
        );
        assert_eq!(headers["access-control-allow-credentials"], "true");
        server.shutdown_tx.send(()).ok();
    }
}
