// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-aware prompt construction.
//!
//! The agent serves a bilingual Sinhala/English audience. The prompt steers
//! the model toward the script the sender used, with one override: technical
//! questions are always answered in English.

use mynah_core::types::GenerationRequest;

/// Dominant script of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Sinhala,
    Mixed,
}

/// Keywords that mark a message as code-related. Matched as substrings of
/// the lowercased message, same as the command matching.
const CODE_KEYWORDS: [&str; 55] = [
    "code",
    "javascript",
    "python",
    "html",
    "css",
    "function",
    "variable",
    "programming",
    "syntax",
    "debug",
    "error",
    "algorithm",
    "database",
    "api",
    "json",
    "xml",
    "sql",
    "react",
    "node",
    "php",
    "java",
    "c++",
    "script",
    "class",
    "method",
    "array",
    "object",
    "loop",
    "if",
    "else",
    "import",
    "export",
    "console.log",
    "print(",
    "def ",
    "function(",
    "```",
    "</",
    "/>",
    "{",
    "}",
    "&&",
    "||",
    "==",
    "!=",
    "true",
    "false",
    "null",
    "undefined",
    "var ",
    "let ",
    "const ",
    "return",
    "try",
    "catch",
];

/// Detects the script of a message from its characters.
///
/// Sinhala is the U+0D80..U+0DFF block; "English" means any ASCII letter.
/// Messages with neither (digits, emoji) default to English.
pub fn detect_language(text: &str) -> Language {
    let has_sinhala = text.chars().any(|c| ('\u{0D80}'..='\u{0DFF}').contains(&c));
    let has_english = text.chars().any(|c| c.is_ascii_alphabetic());

    match (has_sinhala, has_english) {
        (true, true) => Language::Mixed,
        (true, false) => Language::Sinhala,
        _ => Language::English,
    }
}

/// True when the message looks code-related.
pub fn is_code_message(text: &str) -> bool {
    let lower = text.to_lowercase();
    CODE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Builds the full generation prompt for one inbound message.
///
/// Layout: identity line with chat context, a length instruction, behavior
/// notes, the command reference, then the current message followed by the
/// rendered conversation context.
pub fn build_prompt(agent_name: &str, request: &GenerationRequest) -> String {
    let language_instruction = if is_code_message(&request.text) {
        "Always respond in English for code-related questions and technical topics."
    } else {
        match detect_language(&request.text) {
            Language::Sinhala => {
                "Respond primarily in Sinhala (සිංහල) with some English mixed in naturally. \
                 Use Sinhala Unicode characters properly."
            }
            Language::Mixed => {
                "Respond in both Sinhala and English mixed naturally, matching the user's \
                 language pattern."
            }
            Language::English => {
                "Respond primarily in English, but you can use some Sinhala words naturally \
                 if appropriate."
            }
        }
    };

    let context_info = if request.is_group {
        format!(
            "(responding in group: {})",
            request.group_name.as_deref().unwrap_or("")
        )
    } else {
        "(private chat)".to_string()
    };

    let length_instruction = if request.is_group {
        "Keep responses concise since this is a group chat."
    } else {
        "You can provide detailed responses in private chats."
    };

    format!(
        "You are {agent_name} {context_info}, an advanced bilingual AI assistant that speaks \
         both English and Sinhala fluently. {language_instruction}\n\n\
         {length_instruction}\n\n\
         Be helpful, friendly, and conversational. You have memory of previous conversations \
         in this chat.\n\n\
         Available commands:\n\
         - \"/clear\" or \"clear chat\" - Clear conversation memory\n\
         - \"/generate image [description]\" - Generate AI images\n\
         - Send PDF files for reading and analysis\n\n\
         Current message: {}{}",
        request.text, request.context
    )
}
