//! SSE line framing
//!
//! Only data lines matter to the completions protocol. Keep-alive blanks,
//! `:` comments and `event:`/`id:` lines carry nothing and are skipped.

/// Prefix announcing an event payload.
pub const DATA_MARKER: &str = "data: ";

/// Payload the server sends after the last chunk.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Everything after the first `data: ` marker on the line, verbatim.
///
/// Returns an empty string when the line has no marker.
pub fn extract_payload(line: &str) -> &str {
    line.find(DATA_MARKER)
        .map(|at| &line[at + DATA_MARKER.len()..])
        .unwrap_or_default()
}

/// Exact match only: `[DONE] ` or `[done]` are ordinary payloads.
pub fn is_done_sentinel(payload: &str) -> bool {
    payload == DONE_SENTINEL
}
