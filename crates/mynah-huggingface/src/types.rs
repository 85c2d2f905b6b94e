// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request types for the HuggingFace hosted inference API.

use serde::Serialize;

/// Diffusion parameters sent alongside the prompt.
///
/// `guidance_scale` is omitted on the reduced retry request; loading models
/// respond faster without it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageParameters {
    pub negative_prompt: String,
    pub num_inference_steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f64>,
    pub width: u32,
    pub height: u32,
}

/// Inference endpoint options.
#[derive(Debug, Clone, Serialize)]
pub struct ImageOptions {
    pub wait_for_model: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,
}

/// A text-to-image request body.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    pub inputs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ImageParameters>,
    pub options: ImageOptions,
}

impl ImageRequest {
    /// Full-quality request used on the first attempt against each model.
    pub fn full(prompt: &str) -> Self {
        Self {
            inputs: prompt.to_string(),
            parameters: Some(ImageParameters {
                negative_prompt:
                    "blurry, bad quality, distorted, ugly, deformed, low resolution, watermark"
                        .to_string(),
                num_inference_steps: 20,
                guidance_scale: Some(7.5),
                width: 512,
                height: 512,
            }),
            options: ImageOptions {
                wait_for_model: true,
                use_cache: Some(false),
            },
        }
    }

    /// Reduced request used for the single retry after a model reports 503.
    pub fn reduced(prompt: &str) -> Self {
        Self {
            inputs: prompt.to_string(),
            parameters: Some(ImageParameters {
                negative_prompt: "blurry, bad quality, distorted".to_string(),
                num_inference_steps: 15,
                guidance_scale: None,
                width: 512,
                height: 512,
            }),
            options: ImageOptions {
                wait_for_model: true,
                use_cache: None,
            },
        }
    }

    /// Bare request for the last-resort fallback model. No diffusion
    /// parameters, just the prompt.
    pub fn bare(prompt: &str) -> Self {
        Self {
            inputs: prompt.to_string(),
            parameters: None,
            options: ImageOptions {
                wait_for_model: true,
                use_cache: None,
            },
        }
    }
}
