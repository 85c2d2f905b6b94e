// SPDX-FileCopyrightText: 2026 Mynah Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned user-facing replies, bilingual Sinhala and English.

/// Characters of extracted document text shown in a group summary.
const GROUP_SUMMARY_CHARS: usize = 500;
/// Characters of extracted document text shown in a direct-message summary.
const PRIVATE_SUMMARY_CHARS: usize = 800;

/// One-time welcome sent to a newly approved individual.
pub fn welcome_individual(agent_name: &str) -> String {
    format!(
        "👋 හෙලෝ! මම {agent_name}, ඔබේ personal AI assistant!\n\
         Hello! I'm {agent_name}, your personal AI assistant!\n\n\
         🎯 මට ඔබට help කරන්න පුළුවන්:\n\
         💭 Intelligent conversations (Sinhala & English)\n\
         🎨 Image generation\n\
         📄 PDF document analysis\n\
         🧠 Conversation memory\n\n\
         Commands:\n\
         • '/clear' - Reset conversation\n\
         • '/generate image [description]' - Create images\n\n\
         ඔබට අද මම කොහොමද help කරන්නේ?\n\
         How can I help you today?"
    )
}

/// One-time welcome sent to a newly approved group.
pub fn welcome_group(agent_name: &str) -> String {
    format!(
        "🤖 හෙලෝ! මම {agent_name}, ඔබේ නව AI assistant!\n\
         Hello! I'm {agent_name}, your new AI assistant!\n\n\
         💬 මට කරන්න පුළුවන්:\n\
         🧠 Smart conversations with memory\n\
         🎨 Image generation\n\
         📄 PDF reading\n\
         🗣️ Sinhala & English support\n\n\
         Commands: '/clear', '/generate image [description]'"
    )
}

/// Sent at most once per offline episode to a bursting sender.
pub fn throttle_notice() -> &'static str {
    "⏳ මම දැනට offline. ඔබ messages ගොඩක් send කරනවා. \
     කරුණාකර traffic එක අඩු වෙනකන් ඉන්න, මම online වුනාම reply දෙනවා.\n\n\
     I'm currently offline. You're sending too many messages. \
     Please wait until the traffic reduces, I'll reply when I'm back online."
}

/// Catch-all apology when generation or an outbound send fails.
pub fn apology() -> &'static str {
    "⚠️ Sorry, I encountered an error. / මට error එකක් ආවා."
}

/// Per-sender notice sent at the start of the offline drain, with wording
/// chosen by how many messages were buffered.
pub fn back_online_notice(count: usize) -> String {
    if count == 1 {
        "🔄 මම offline හිටියා. ඔබේ message එක දැන් process කරනවා!\n\
         I was offline. Processing your message now!"
            .to_string()
    } else {
        format!(
            "🔄 මම offline හිටියා. ඔබේ messages {count}ක් process කරනවා!\n\
             I was offline. Processing your {count} messages now!"
        )
    }
}

/// Truncated summary of extracted document text. Group summaries are kept
/// shorter so group chats stay readable.
pub fn document_summary(text: &str, is_group: bool) -> String {
    if is_group {
        format!(
            "📄 PDF Content Summary:\n\n{}...",
            truncate_chars(text, GROUP_SUMMARY_CHARS)
        )
    } else {
        format!(
            "📄 මම ඔබේ PDF එක analyze කළා:\nI've analyzed your PDF:\n\n{}...",
            truncate_chars(text, PRIVATE_SUMMARY_CHARS)
        )
    }
}

/// Sent when document text extraction fails.
pub fn extraction_failed() -> &'static str {
    "📄 PDF කියවීමේ ක්‍රියාවලිය සම්පූර්ණ කළ නොහැක.\n\
     Sorry, I could not read that PDF."
}

/// Truncates on a char boundary, never mid-codepoint.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
