// src/tenant/icon.rs

use std::sync::LazyLock;

use regex::Regex;

pub const MAX_ICON_LEN: usize = 10;

/// Emoji detector, or `None` when the regex engine lacks the Unicode tables.
static EMOJI_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    match Regex::new(r"[\p{Emoji_Presentation}\p{Extended_Pictographic}]") {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Emoji pattern unavailable, icons are checked by length only: {}", e);
            None
        }
    }
});

/// Checks a tenant icon: 1 to 10 characters containing an emoji.
pub fn validate_icon(value: &str) -> bool {
    validate_icon_with(value, (*EMOJI_PATTERN).as_ref())
}

/// Same as [`validate_icon`] with an explicit detector. Without one, the
/// length bound alone decides.
pub fn validate_icon_with(value: &str, emoji: Option<&Regex>) -> bool {
    let len = value.chars().count();
    if !(1..=MAX_ICON_LEN).contains(&len) {
        return false;
    }

    match emoji {
        Some(re) => re.is_match(value),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_emoji() {
        assert!(validate_icon("🌟"));
        assert!(validate_icon("🚀"));
        assert!(validate_icon("🇩🇪"));
    }

    #[test]
    fn rejects_empty_and_long() {
        assert!(!validate_icon(""));
        assert!(!validate_icon("toolongstring12"));
        assert!(!validate_icon("🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟"));
    }

    #[test]
    fn plain_text_needs_fallback() {
        assert!(!validate_icon("abc"));
        assert!(validate_icon_with("abc", None));
        assert!(!validate_icon_with("", None));
        assert!(!validate_icon_with("toolongstring12", None));
    }
}
