//! Text normalization shared by both segmentation strategies.

/// Replace non-ASCII runs with a space, collapse whitespace runs, and trim.
///
/// Idempotent: the output contains only ASCII, no leading or trailing whitespace, and no two
/// consecutive whitespace characters, so a second pass changes nothing.
pub fn normalize(raw: &str) -> String {
    let mut output = String::with_capacity(raw.len());
    let mut pending_space = false;

    for ch in raw.chars() {
        if !ch.is_ascii() || is_separator(ch) {
            pending_space = true;
            continue;
        }
        if pending_space && !output.is_empty() {
            output.push(' ');
        }
        pending_space = false;
        output.push(ch);
    }

    output
}

/// ASCII whitespace, including vertical tab and the information separators.
fn is_separator(ch: char) -> bool {
    ch.is_ascii_whitespace() || matches!(ch, '\u{0b}' | '\u{1c}'..='\u{1f}')
}
