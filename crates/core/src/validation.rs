//! Input checks every stage runs before touching a remote service.

use crate::error::{StageError, StageResult};

/// Reject empty or whitespace-only text. Returns the trimmed value.
pub fn require_text<'a>(field: &str, value: &'a str) -> StageResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StageError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed)
}

/// Reject text longer than `max_chars` characters.
pub fn require_max_chars(field: &str, value: &str, max_chars: usize) -> StageResult<()> {
    let len = value.chars().count();
    if len > max_chars {
        return Err(StageError::Validation(format!(
            "{field} too long ({len} characters, max {max_chars})"
        )));
    }
    Ok(())
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn whitespace_only_is_rejected() {
        for input in ["", " ", "\n\t  "] {
            assert_matches!(require_text("Topic", input), Err(StageError::Validation(_)));
        }
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(require_text("Topic", "  rust  ").unwrap(), "rust");
    }

    #[test]
    fn max_chars_counts_characters_not_bytes() {
        // Four characters, ten bytes.
        assert!(require_max_chars("Text", "日本語!", 4).is_ok());
        assert_matches!(
            require_max_chars("Text", "日本語!!", 4),
            Err(StageError::Validation(msg)) if msg.contains("max 4")
        );
    }

    #[test]
    fn word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  one two\n\nthree  "), 3);
    }
}
