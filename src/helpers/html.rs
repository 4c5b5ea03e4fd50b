//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape XML special characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Strip HTML tags from a string
pub fn strip_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Decode the handful of entities pulldown-cmark emits in text
pub fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Prune text to at most `length` characters, cutting on a word boundary
///
/// Whitespace is collapsed first. When the text is cut, `…` is appended.
pub fn prune(s: &str, length: usize) -> String {
    let text = s.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= length {
        return text;
    }

    let mut pruned = String::new();
    for word in text.split(' ') {
        let candidate_len = if pruned.is_empty() {
            word.chars().count()
        } else {
            pruned.chars().count() + 1 + word.chars().count()
        };
        if candidate_len > length {
            break;
        }
        if !pruned.is_empty() {
            pruned.push(' ');
        }
        pruned.push_str(word);
    }

    // A single word longer than the limit gets cut mid-word
    if pruned.is_empty() {
        pruned = text.chars().take(length).collect();
    }

    let pruned = pruned.trim_end_matches(|c: char| c.is_ascii_punctuation());
    format!("{}…", pruned)
}
