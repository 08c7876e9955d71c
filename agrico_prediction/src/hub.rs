use crate::config::HubConfig;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Failed to reach model hub: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Model hub answered {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("Failed to write model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("Model hub returned an empty artifact for {0}")]
    EmptyArtifact(String),
}

/// Returns the local path of the configured artifact, downloading it into
/// the cache first when no cached copy exists.
pub async fn fetch_model(hub: &HubConfig) -> Result<PathBuf, HubError> {
    let path = hub.get_cache_path();
    if let Some(cached) = cached_artifact(&path).await {
        tracing::info!("Using cached model artifact {}", cached.display());
        return Ok(cached);
    }

    let url = hub.get_url();
    tracing::info!("Downloading model artifact from {}", url);

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(hub.connect_timeout_secs))
        .timeout(Duration::from_secs(hub.download_timeout_secs))
        .build()?;
    let mut request = client.get(&url);
    let token = hub
        .token
        .clone()
        .or_else(|| std::env::var("HF_TOKEN").ok())
        .filter(|t| !t.is_empty());
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(HubError::Status { status, url });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(HubError::EmptyArtifact(url));
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let partial = path.with_extension("part");
    tokio::fs::write(&partial, &bytes).await?;
    tokio::fs::rename(&partial, &path).await?;

    tracing::info!(
        "Stored model artifact ({} bytes) at {}",
        bytes.len(),
        path.display()
    );
    Ok(path)
}

async fn cached_artifact(path: &Path) -> Option<PathBuf> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() && metadata.len() > 0 => Some(path.to_path_buf()),
        _ => None,
    }
}
