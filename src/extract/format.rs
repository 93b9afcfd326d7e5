//! Rendering of conversation windows into analysis request text.

use std::fmt::Write;

use super::window::ConversationWindows;

/// Render `windows` as the text sent to an analysis provider.
///
/// Sections follow pseudonym first-seen order; lines written by the local
/// user are labelled `User`. Returns an empty string when there is nothing
/// to render.
pub fn format_request(windows: &ConversationWindows, days_back: u32) -> String {
    if windows.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(64 + windows.entry_count() * 48);
    // Writing into a String cannot fail.
    let _ = write!(out, "Message conversations from the last {} days:\n\n", days_back);

    for window in windows {
        let _ = writeln!(out, "--- Conversation with {} ---", window.pseudonym);
        for entry in &window.entries {
            let sender = if entry.is_from_self {
                "User"
            } else {
                window.pseudonym.as_str()
            };
            let _ = writeln!(out, "{}: {}", sender, entry.text);
        }
        out.push('\n');
    }

    out
}
