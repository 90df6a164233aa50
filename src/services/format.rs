//! Presentation helpers: casing rules and display gating.

use crate::domain::models::{DisplayConfig, EntityId, PronounCode, PronounStyle};

/// Render `value` in the requested style.
///
/// Meta answers ("Any pronouns", "Ask me my pronouns", ...) keep their
/// canonical casing under `Lowercase`; they read as phrases, and folding
/// them looks wrong.
pub fn format_pronouns(value: PronounCode, style: PronounStyle) -> String {
    match style {
        PronounStyle::Lowercase if !value.is_meta() => value.canonical().to_lowercase(),
        _ => value.canonical().to_string(),
    }
}

/// Text to render for a resolved value, or `None` when there is nothing to show.
pub fn display_text(value: Option<PronounCode>, config: &DisplayConfig) -> Option<String> {
    value.map(|code| format_pronouns(code, config.style))
}

/// Whether pronouns of `subject` should be rendered for `viewer`.
pub fn should_display(config: &DisplayConfig, subject: &EntityId, viewer: Option<&EntityId>) -> bool {
    if !config.show_in_messages {
        return false;
    }
    config.show_self || viewer != Some(subject)
}
