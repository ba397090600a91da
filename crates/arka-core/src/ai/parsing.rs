//! JSON extraction from AI responses
//!
//! Models are told to answer with bare JSON but often wrap it in markdown
//! fences or chatty prose. Extraction tries a direct parse first, then
//! falls back to the first balanced `{...}` block.

use serde_json::Value;

/// Extract a JSON value from free-form model output.
///
/// Returns `None` when the content neither parses as JSON nor contains a
/// parseable top-level object. Callers decide whether that is a hard
/// failure (receipt path) or a soft miss (intent path).
pub fn extract_json(content: &str) -> Option<Value> {
    let trimmed = content.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let candidate = first_object_block(trimmed)?;
    serde_json::from_str(candidate).ok()
}

/// Locate the first balanced top-level `{...}` substring by depth counting.
/// Braces inside string literals (including escaped quotes) don't count.
fn first_object_block(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in content[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
