// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gemini response generator for the Mynah agent.
//!
//! Implements [`ResponseGenerator`] on top of the `generateContent` API.
//! Directive recognition (clear-conversation, image generation) happens
//! here, not in the admission pipeline; image prompts are handed to the
//! optional HuggingFace backend.

pub mod client;
pub mod directives;
pub mod prompt;
pub mod types;

use async_trait::async_trait;
use mynah_config::model::{GeminiConfig, MynahConfig};
use mynah_core::types::{AdapterType, GenerationRequest, HealthStatus, Reply};
use mynah_core::{Adapter, GeneratorOutcome, MynahError, ResponseGenerator};
use mynah_huggingface::HuggingFaceClient;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig};

/// Confirmation sent after a clear-conversation directive.
const CLEAR_CONFIRMATION: &str = "🧹 Chat memory cleared! / චැට් මතකය මකා දමා ඇත!";

/// Guidance sent when an image directive carries no usable prompt.
const IMAGE_GUIDANCE: &str = "🎨 කරුණාකර ඔබට අවශ්‍ය image එකේ විස්තරයක් දෙන්න!\nPlease provide a description for the image!\n\nExamples:\n• 'Generate image of a beautiful sunset'\n• 'Create image of a cute cat'\n• 'Make image of a futuristic city'";

/// Notice sent when the image backend tried every model and failed.
const IMAGE_UNAVAILABLE: &str = "❌ දැනට image generate කරන්න බැහැ. Hugging Face models loading වෙනවා. 2-3 minutes wait කරලා නැවත try කරන්න.\n\nSorry, couldn't generate image right now. The AI models are loading. Please wait 2-3 minutes and try again.\n\n💡 Tip: Try simpler prompts like 'cat', 'sunset', 'car'";

/// Notice sent when no image backend is configured.
const IMAGE_ERROR: &str = "❌ Image generation error occurred. Models might be loading. Please try again in a few minutes.\nදැනට technical issue එකක් තියෙනවා. මිනිත්තු කිහිපයකින් නැවත try කරන්න.";

/// Notice sent when the model answers with no candidates (safety block).
const EMPTY_RESPONSE: &str = "❌ දැනට ඔබේ message එක process කරන්න බැහැ. කරුණාකර නැවත උත්සාහ කරන්න.\nSorry, I couldn't process your message right now. Please try again.";

/// Gemini text generator implementing [`ResponseGenerator`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
/// The HuggingFace image backend is optional; without it, image directives
/// are answered with a notice.
pub struct GeminiGenerator {
    client: GeminiClient,
    image: Option<HuggingFaceClient>,
    agent_name: String,
    settings: GeminiConfig,
}

impl GeminiGenerator {
    /// Creates a new Gemini generator from the given configuration.
    ///
    /// # API Key Resolution
    /// 1. `config.gemini.api_key` if set
    /// 2. `GEMINI_API_KEY` environment variable
    /// 3. Returns error if neither is available
    ///
    /// The HuggingFace token resolves the same way but is not required;
    /// a missing token only disables image generation.
    pub fn new(config: &MynahConfig) -> Result<Self, MynahError> {
        let api_key = resolve_api_key(&config.gemini.api_key)?;
        let client = GeminiClient::new(api_key, config.gemini.model.clone())?;

        let image = match mynah_huggingface::resolve_api_token(&config.huggingface.api_token) {
            Ok(token) => Some(HuggingFaceClient::new(token, &config.huggingface)?),
            Err(_) => {
                info!("no HuggingFace token configured, image generation disabled");
                None
            }
        };

        info!(
            model = config.gemini.model.as_str(),
            image_backend = image.is_some(),
            "Gemini generator initialized"
        );

        Ok(Self {
            client,
            image,
            agent_name: config.agent.name.clone(),
            settings: config.gemini.clone(),
        })
    }

    /// Creates a generator with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: GeminiClient) -> Self {
        Self {
            client,
            image: None,
            agent_name: "Mynah".to_string(),
            settings: GeminiConfig::default(),
        }
    }

    fn generation_config(&self, is_group: bool) -> GenerationConfig {
        GenerationConfig {
            temperature: self.settings.temperature,
            top_k: self.settings.top_k,
            top_p: self.settings.top_p,
            // Group replies get a smaller budget to keep group chats
            // readable.
            max_output_tokens: if is_group {
                self.settings.max_tokens_group
            } else {
                self.settings.max_tokens_private
            },
        }
    }

    /// Handles one image directive end to end.
    async fn handle_image_directive(&self, prompt: &str) -> GeneratorOutcome {
        if prompt.chars().count() < directives::MIN_IMAGE_PROMPT_CHARS {
            return GeneratorOutcome::Advisory(IMAGE_GUIDANCE.to_string());
        }

        let Some(backend) = &self.image else {
            debug!("image directive received but no backend is configured");
            return GeneratorOutcome::Advisory(IMAGE_ERROR.to_string());
        };

        info!(prompt, "image generation requested");
        match backend.generate_image(prompt).await {
            Ok(path) => GeneratorOutcome::Reply(Reply::Image {
                path,
                caption: image_caption(prompt),
            }),
            Err(e) => {
                warn!(error = %e, "image generation failed");
                GeneratorOutcome::Advisory(IMAGE_UNAVAILABLE.to_string())
            }
        }
    }
}

#[async_trait]
impl Adapter for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generator
    }

    async fn health_check(&self) -> Result<HealthStatus, MynahError> {
        // A constructed client counts as healthy. A live API call here
        // would burn quota on every probe.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MynahError> {
        debug!("Gemini generator shutting down");
        Ok(())
    }
}

#[async_trait]
impl ResponseGenerator for GeminiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GeneratorOutcome, MynahError> {
        if directives::is_clear_directive(&request.text) {
            debug!("clear-conversation directive recognized");
            return Ok(GeneratorOutcome::ClearConversation {
                confirmation: CLEAR_CONFIRMATION.to_string(),
            });
        }

        if let Some(prompt) = directives::image_prompt(&request.text) {
            return Ok(self.handle_image_directive(&prompt).await);
        }

        let prompt = prompt::build_prompt(&self.agent_name, &request);
        let api_request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            generation_config: self.generation_config(request.is_group),
        };

        let response = self.client.generate_content(&api_request).await?;
        match response.first_text() {
            Some(text) => Ok(GeneratorOutcome::Reply(Reply::Text(text.to_string()))),
            None => {
                warn!("model returned no candidates");
                Ok(GeneratorOutcome::Advisory(EMPTY_RESPONSE.to_string()))
            }
        }
    }
}

/// Caption attached to a generated image.
fn image_caption(prompt: &str) -> String {
    format!("🎨 Generated: \"{prompt}\" | ජනනය කළා: \"{prompt}\"")
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, MynahError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GEMINI_API_KEY").map_err(|_| {
        MynahError::Config(
            "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY environment variable.".into(),
        )
    })
}
