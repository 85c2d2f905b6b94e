// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-message command recognition.
//!
//! Commands are matched anywhere in the message, case-insensitive. They are
//! the generator's concern; the admission pipeline never inspects message
//! text.

use std::sync::LazyLock;

use regex::Regex;

/// Phrases that trigger image generation.
pub const IMAGE_COMMANDS: [&str; 6] = [
    "/generate image",
    "create image",
    "generate image",
    "make image",
    "draw image",
    "image generate",
];

/// Prompts shorter than this are answered with usage guidance.
pub const MIN_IMAGE_PROMPT_CHARS: usize = 3;

static IMAGE_COMMAND_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    IMAGE_COMMANDS
        .iter()
        .map(|cmd| Regex::new(&format!("(?i){}", regex::escape(cmd))).unwrap())
        .collect()
});

/// True when the message asks to clear conversation memory.
pub fn is_clear_directive(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("/clear") || lower.contains("clear chat")
}

/// Extracts the image prompt when the message carries an image directive.
///
/// Returns `None` for ordinary messages. For directive messages, every
/// command phrase is stripped and the remainder trimmed; the result may
/// still be too short to be a usable prompt.
pub fn image_prompt(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if !IMAGE_COMMANDS.iter().any(|cmd| lower.contains(cmd)) {
        return None;
    }

    let mut prompt = text.to_string();
    for pattern in IMAGE_COMMAND_PATTERNS.iter() {
        prompt = pattern.replace_all(&prompt, "").trim().to_string();
    }
    Some(prompt)
}
