//! Response normalization for LLM outputs.
//!
//! The model is told to return bare SQL, but sometimes wraps it in a
//! markdown code block anyway.

/// Trims a response and removes one code fence wrapping all of it.
///
/// Handles ```` ```sql ... ``` ```` and ```` ``` ... ``` ````. A fence that
/// only covers part of the text is left alone, as is anything that isn't a
/// fence; the result is otherwise returned exactly as the model wrote it.
pub fn strip_code_fence(response: &str) -> String {
    let trimmed = response.trim();

    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let Some(inner) = after_open.strip_suffix("```") else {
        return trimmed.to_string();
    };

    // The language tag, if any, runs up to the first newline
    let body = match inner.split_once('\n') {
        Some((tag, rest)) if is_language_tag(tag) => rest,
        Some(_) => inner,
        None => inner
            .trim_start()
            .strip_prefix("sql")
            .or_else(|| inner.trim_start().strip_prefix("SQL"))
            .unwrap_or(inner),
    };

    if body.contains("```") {
        return trimmed.to_string();
    }

    body.trim().to_string()
}

fn is_language_tag(tag: &str) -> bool {
    let tag = tag.trim();
    tag.is_empty() || tag.eq_ignore_ascii_case("sql") || tag.eq_ignore_ascii_case("mysql")
}
