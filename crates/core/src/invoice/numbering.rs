//! Sequential document numbers of the form `PREFIX 0001`.
//!
//! The next number is derived from the most recently created document of
//! the same type: its trailing run of digits plus one. Documents whose
//! number has no trailing digits restart the sequence at 1.

use super::types::DocumentType;

/// Zero-padding width of the numeric part.
pub const NUMBER_WIDTH: usize = 4;

/// Extracts the trailing run of ASCII digits from a document number.
#[must_use]
pub fn trailing_number(document_number: &str) -> Option<u64> {
    let trimmed = document_number.trim_end();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    trimmed[digits_start..].parse().ok()
}

/// Formats a document number for `document_type`.
#[must_use]
pub fn format_number(document_type: DocumentType, sequence: u64) -> String {
    format!(
        "{} {sequence:0width$}",
        document_type.number_prefix(),
        width = NUMBER_WIDTH
    )
}

/// Computes the number that follows `latest` (the number of the most
/// recently created document of this type, if any).
#[must_use]
pub fn next_number(document_type: DocumentType, latest: Option<&str>) -> String {
    let sequence = latest
        .and_then(trailing_number)
        .map_or(1, |n| n.saturating_add(1));
    format_number(document_type, sequence)
}
