//! Cell escaping for the tab-delimited run store.
//!
//! Tabs and line breaks would split a cell, so they are written as `\t`,
//! `\n` and `\r`. Backslashes are doubled first, which keeps text a user
//! typed as a literal `\n` distinct from a real newline.

/// Escape a cell value for the tab-delimited store.
#[must_use]
pub fn encode_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`encode_cell`]. Unknown escapes are kept verbatim.
#[must_use]
pub fn decode_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
