// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WhatsApp Cloud (Graph) API send surface.
//!
//! Provides [`GraphClient`] which handles bearer authentication, text and
//! image sends, the two-step media upload, and media download.

use std::path::Path;
use std::time::Duration;

use mynah_core::{MessageId, MynahError, SenderId};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::multipart;
use tracing::debug;

use crate::wire::{
    GraphErrorResponse, MediaMetadata, MediaUploadResponse, SendRequest, SendResponse,
};

/// Graph API endpoint root.
const API_BASE_URL: &str = "https://graph.facebook.com";

/// Client for the Cloud API message and media endpoints.
///
/// Every call is scoped to one business phone number; authentication is a
/// bearer token installed as a default header.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    api_version: String,
    phone_number_id: String,
    base_url: String,
}

impl GraphClient {
    /// Creates a new Cloud API client.
    ///
    /// # Arguments
    /// * `access_token` - System-user access token, sent as a bearer header
    /// * `phone_number_id` - Business phone number the sends go out from
    /// * `api_version` - Graph API version segment (e.g. "v20.0")
    pub fn new(
        access_token: &str,
        phone_number_id: &str,
        api_version: &str,
    ) -> Result<Self, MynahError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|e| {
            MynahError::Config(format!(
                "whatsapp.access_token is not a valid header value: {e}"
            ))
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| MynahError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_version: api_version.to_string(),
            phone_number_id: phone_number_id.to_string(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, self.api_version, self.phone_number_id
        )
    }

    /// Sends a plain text message.
    pub async fn send_text(&self, to: &SenderId, body: &str) -> Result<MessageId, MynahError> {
        let request = SendRequest::text(to, body);
        let response = self
            .client
            .post(self.messages_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("failed to send message", e))?;
        read_send_response(response).await
    }

    /// Uploads a local image and sends it with a caption.
    pub async fn send_image(
        &self,
        to: &SenderId,
        path: &Path,
        caption: &str,
    ) -> Result<MessageId, MynahError> {
        let media_id = self.upload_media(path).await?;
        debug!(to = %to, media_id = %media_id, "media uploaded, sending image message");

        let request = SendRequest::image(to, media_id, caption);
        let response = self
            .client
            .post(self.messages_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("failed to send image message", e))?;
        read_send_response(response).await
    }

    /// Uploads a local file to the media endpoint, returning its media id.
    async fn upload_media(&self, path: &Path) -> Result<String, MynahError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            MynahError::TransportSend {
                message: format!("failed to read media file {}: {e}", path.display()),
                source: Some(Box::new(e)),
            }
        })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.png")
            .to_string();
        let mime = media_mime(path);

        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime)
            .map_err(|e| send_error("invalid media mime type", e))?;
        let form = multipart::Form::new()
            .text("messaging_product", "whatsapp")
            .text("type", mime)
            .part("file", part);

        let response = self
            .client
            .post(format!(
                "{}/{}/{}/media",
                self.base_url, self.api_version, self.phone_number_id
            ))
            .multipart(form)
            .send()
            .await
            .map_err(|e| send_error("failed to upload media", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MynahError::TransportSend {
                message: format!("media upload failed ({status}): {}", graph_error_message(&body)),
                source: None,
            });
        }

        let uploaded: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| send_error("failed to decode upload response", e))?;
        Ok(uploaded.id)
    }

    /// Downloads the payload behind a media id.
    ///
    /// Two hops: the media lookup returns a short-lived URL, then the
    /// binary is fetched from that URL with the same bearer token.
    pub async fn fetch_media(&self, media_id: &str) -> Result<Vec<u8>, MynahError> {
        let metadata = self.media_metadata(media_id).await?;

        let response = self
            .client
            .get(&metadata.url)
            .send()
            .await
            .map_err(|e| fetch_error("failed to download media", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MynahError::Transport {
                message: format!("media download failed ({status})"),
                source: None,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error("failed to read media body", e))?;
        debug!(media_id = %media_id, size = bytes.len(), "media downloaded");
        Ok(bytes.to_vec())
    }

    async fn media_metadata(&self, media_id: &str) -> Result<MediaMetadata, MynahError> {
        let response = self
            .client
            .get(format!(
                "{}/{}/{}",
                self.base_url, self.api_version, media_id
            ))
            .send()
            .await
            .map_err(|e| fetch_error("failed to look up media", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MynahError::Transport {
                message: format!("media lookup failed ({status}): {}", graph_error_message(&body)),
                source: None,
            });
        }

        response
            .json()
            .await
            .map_err(|e| fetch_error("failed to decode media metadata", e))
    }

    /// Cheap credential check: reads the phone number object itself.
    pub async fn check_credentials(&self) -> Result<(), MynahError> {
        let response = self
            .client
            .get(format!(
                "{}/{}/{}",
                self.base_url, self.api_version, self.phone_number_id
            ))
            .send()
            .await
            .map_err(|e| fetch_error("phone number lookup failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MynahError::Transport {
                message: format!(
                    "phone number lookup failed ({status}): {}",
                    graph_error_message(&body)
                ),
                source: None,
            });
        }
        Ok(())
    }
}

async fn read_send_response(response: reqwest::Response) -> Result<MessageId, MynahError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MynahError::TransportSend {
            message: format!("Cloud API send failed ({status}): {}", graph_error_message(&body)),
            source: None,
        });
    }

    let sent: SendResponse = response
        .json()
        .await
        .map_err(|e| send_error("failed to decode send response", e))?;
    sent.messages
        .into_iter()
        .next()
        .map(|m| MessageId(m.id))
        .ok_or_else(|| MynahError::TransportSend {
            message: "send response carried no message id".into(),
            source: None,
        })
}

/// Pulls the human-readable message out of a Graph error body, falling
/// back to a bounded slice of the raw payload.
fn graph_error_message(body: &str) -> String {
    match serde_json::from_str::<GraphErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.chars().take(200).collect(),
    }
}

fn media_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn send_error(message: &str, e: reqwest::Error) -> MynahError {
    MynahError::TransportSend {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn fetch_error(message: &str, e: reqwest::Error) -> MynahError {
    MynahError::Transport {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}
