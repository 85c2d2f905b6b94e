// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HuggingFace hosted-inference image backend for the Mynah agent.
//!
//! This crate provides [`HuggingFaceClient`], which walks a configured list
//! of text-to-image models until one produces an image, handling loading
//! (503) and rate-limit (429) responses along the way. It is a plain backend
//! consumed by the response generator, not a standalone adapter.

pub mod types;

use std::path::PathBuf;
use std::time::Duration;

use mynah_config::model::HuggingFaceConfig;
use mynah_core::MynahError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::types::ImageRequest;

/// Base URL for the HuggingFace hosted inference API.
const API_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Model tried with the plain prompt once every configured model has failed.
const FALLBACK_MODEL: &str = "runwayml/stable-diffusion-v1-5";

/// Quality prefix prepended to every prompt on the main model walk. The
/// fallback request sends the prompt untouched.
const PROMPT_PREFIX: &str = "high quality, detailed, masterpiece, ";

/// Bodies at or below this size are JSON error payloads, not image data.
const MIN_IMAGE_BYTES: usize = 1000;

/// Wait applied after a 429 before moving on to the next model.
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(30);

/// Timeout for the availability probe. Generation requests use the much
/// longer client-level timeout since hosted models can be slow to spin up.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single generation attempt against one model.
enum AttemptError {
    /// 503: the model is still loading.
    Loading,
    /// 429: the account is rate limited.
    RateLimited,
    /// Anything else, including bodies too small to be an image.
    Failed(String),
}

/// Client for HuggingFace text-to-image inference.
///
/// Walks `config.models` in order: each model is probed for availability,
/// then asked to generate. A loading model gets one retry with reduced
/// settings after `config.model_wait_secs`; a rate-limited model is skipped
/// after a backoff. When every configured model has failed, one last request
/// goes to a known-stable fallback model with the unenhanced prompt.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    models: Vec<String>,
    model_wait: Duration,
    rate_limit_backoff: Duration,
    base_url: String,
    output_dir: PathBuf,
}

impl HuggingFaceClient {
    /// Creates a new inference client.
    ///
    /// # Arguments
    /// * `api_token` - HuggingFace API token sent as a Bearer header
    /// * `config` - model list and retry tuning
    pub fn new(api_token: String, config: &HuggingFaceConfig) -> Result<Self, MynahError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_token}")).map_err(|e| {
                MynahError::Config(format!("invalid API token header value: {e}"))
            })?,
        );
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| MynahError::GenerationFailed {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            models: config.models.clone(),
            model_wait: Duration::from_secs(config.model_wait_secs),
            rate_limit_backoff: RATE_LIMIT_BACKOFF,
            base_url: API_BASE_URL.to_string(),
            output_dir: std::env::temp_dir(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Overrides the rate-limit backoff (for testing without real waits).
    #[cfg(test)]
    pub fn with_rate_limit_backoff(mut self, wait: Duration) -> Self {
        self.rate_limit_backoff = wait;
        self
    }

    /// Generates an image for the prompt and writes it to a temp file.
    ///
    /// Returns the path of the written PNG. The caller owns the file and is
    /// expected to delete it once sent.
    pub async fn generate_image(&self, prompt: &str) -> Result<PathBuf, MynahError> {
        let enhanced = format!("{PROMPT_PREFIX}{prompt}");

        for model in &self.models {
            if !self.model_ready(model).await {
                info!(model = model.as_str(), "model not reachable, skipping");
                continue;
            }

            match self.request_image(model, &ImageRequest::full(&enhanced)).await {
                Ok(bytes) => return self.write_image(&bytes).await,
                Err(AttemptError::Loading) => {
                    info!(
                        model = model.as_str(),
                        wait_secs = self.model_wait.as_secs(),
                        "model loading, retrying once with reduced settings"
                    );
                    tokio::time::sleep(self.model_wait).await;
                    match self.request_image(model, &ImageRequest::reduced(&enhanced)).await {
                        Ok(bytes) => return self.write_image(&bytes).await,
                        Err(_) => {
                            warn!(model = model.as_str(), "retry after load wait failed");
                        }
                    }
                }
                Err(AttemptError::RateLimited) => {
                    warn!(model = model.as_str(), "rate limited, backing off");
                    tokio::time::sleep(self.rate_limit_backoff).await;
                }
                Err(AttemptError::Failed(reason)) => {
                    warn!(
                        model = model.as_str(),
                        reason = reason.as_str(),
                        "image request failed"
                    );
                }
            }
        }

        // Last resort: the plain prompt against a model that is almost
        // always warm.
        debug!(model = FALLBACK_MODEL, "all configured models failed, trying fallback");
        match self.request_image(FALLBACK_MODEL, &ImageRequest::bare(prompt)).await {
            Ok(bytes) => self.write_image(&bytes).await,
            Err(e) => {
                let reason = match e {
                    AttemptError::Loading => "fallback model still loading".to_string(),
                    AttemptError::RateLimited => "fallback model rate limited".to_string(),
                    AttemptError::Failed(msg) => msg,
                };
                Err(MynahError::GenerationFailed {
                    message: format!("image generation exhausted all models: {reason}"),
                    source: None,
                })
            }
        }
    }

    /// Probes a model endpoint. Anything other than a clean 200 means the
    /// model is not worth a generation attempt.
    async fn model_ready(&self, model: &str) -> bool {
        let url = format!("{}/models/{}", self.base_url, model);
        match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Sends one generation request and validates the response body.
    async fn request_image(
        &self,
        model: &str,
        request: &ImageRequest,
    ) -> Result<Vec<u8>, AttemptError> {
        let url = format!("{}/models/{}", self.base_url, model);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Failed(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        debug!(model, status = %status, "image response received");

        match status.as_u16() {
            503 => return Err(AttemptError::Loading),
            429 => return Err(AttemptError::RateLimited),
            _ if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(AttemptError::Failed(format!("API returned {status}: {body}")));
            }
            _ => {}
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Failed(format!("failed to read image bytes: {e}")))?;

        if bytes.len() <= MIN_IMAGE_BYTES {
            return Err(AttemptError::Failed(format!(
                "response too small to be an image: {} bytes",
                bytes.len()
            )));
        }

        Ok(bytes.to_vec())
    }

    /// Writes image bytes to a uniquely named file in the output directory.
    async fn write_image(&self, bytes: &[u8]) -> Result<PathBuf, MynahError> {
        let path = self
            .output_dir
            .join(format!("mynah-image-{}.png", Uuid::new_v4()));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MynahError::GenerationFailed {
                message: format!("failed to write image file: {e}"),
                source: Some(Box::new(e)),
            })?;
        info!(path = %path.display(), size = bytes.len(), "image written");
        Ok(path)
    }
}

/// Resolves the API token from config or environment.
pub fn resolve_api_token(config_token: &Option<String>) -> Result<String, MynahError> {
    if let Some(token) = config_token
        && !token.is_empty()
    {
        return Ok(token.clone());
    }

    std::env::var("HUGGINGFACE_API_KEY").map_err(|_| {
        MynahError::Config(
            "HuggingFace API token not found. Set huggingface.api_token in config or HUGGINGFACE_API_KEY environment variable.".into(),
        )
    })
}
