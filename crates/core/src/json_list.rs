//! JSON-encoded string lists stored in TEXT columns.
//!
//! Peer tags, article tags and ticket attachments are persisted as a JSON
//! array of strings. Reads are lenient: an empty column, `null`, or any text
//! that does not parse as an array of strings yields an empty list.

/// Decode a stored list, falling back to an empty list on any failure.
pub fn decode_or_default(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Option<Vec<String>>>(trimmed)
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Encode a list for storage. An empty list is stored as `[]`.
pub fn encode(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
