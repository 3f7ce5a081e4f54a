//! Restore-key list builder
//!
//! Turns the raw multi-line restore-keys input into an ordered list of
//! key templates. Input order is fallback priority: first line = most
//! preferred.

/// Split the raw restore-keys input into an ordered list of templates.
///
/// The whole input is trimmed first (dropping leading and trailing blank
/// lines), then split on newlines with each line trimmed. Interior blank
/// lines are kept as empty templates; their disposition is the parser's
/// call. Duplicates are preserved and probed redundantly, keeping the
/// order predictable.
pub fn parse_restore_keys(raw: &str) -> Vec<String> {
    raw.trim()
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}
