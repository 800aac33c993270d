//! Display-only rendering of result rows.
//!
//! Long addresses make interactive tables unreadable, so the preview cuts
//! every text field at [`PREVIEW_MAX_CHARS`] characters. Exports never go
//! through this module and always carry the full values.

use super::reconciler::ResultRow;

/// Longest text shown in a preview cell before truncation.
pub const PREVIEW_MAX_CHARS: usize = 50;

/// Shown in the weekday column when a trip has no weekday.
pub const TODAY_LABEL: &str = "Aujourd'hui";

/// Cut `text` to `max_chars` characters, appending "..." when anything
/// was removed.
///
/// # Examples
///
/// ```
/// use travel_times::results::truncate_for_display;
///
/// assert_eq!(truncate_for_display("Gare de Lyon", 50), "Gare de Lyon");
/// assert_eq!(truncate_for_display("abcdef", 3), "abc...");
/// ```
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One row of the interactive results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    /// 1-based row number.
    pub index: usize,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub weekday: String,
    pub clock: String,
    pub duration: String,
    pub distance: String,
    pub status: String,
    pub is_success: bool,
}

impl PreviewRow {
    /// Build the display row for a result.
    pub fn from_result(result: &ResultRow) -> Self {
        let cut = |s: &str| truncate_for_display(s, PREVIEW_MAX_CHARS);
        let request = &result.request;

        Self {
            index: result.row,
            origin: cut(&request.origin),
            destination: cut(&request.destination),
            mode: cut(&request.mode_label),
            weekday: cut(request.weekday().unwrap_or(TODAY_LABEL)),
            clock: cut(request.departure_clock.as_deref().unwrap_or_default()),
            duration: cut(result.outcome.duration_text()),
            distance: cut(result.outcome.distance_text()),
            status: cut(&result.outcome.status().to_string()),
            is_success: result.outcome.is_success(),
        }
    }
}
