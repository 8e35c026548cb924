//! Text utilities
//!
//! All width calculations use unicode display width, not byte length, so
//! labels containing wide characters (CJK, emoji) are cut where a reader
//! would expect.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Marker appended to truncated text
pub const ELLIPSIS: char = '…';

/// Truncate a string to fit within `max_width` display columns, ending with
/// an ellipsis when anything was cut.
///
/// Returns `Cow::Borrowed` if no truncation is needed.
pub fn truncate_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    if UnicodeWidthStr::width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width == 0 {
        return Cow::Owned(String::new());
    }

    let target_width = max_width - 1;
    let mut width = 0;
    let mut truncated: String = s
        .chars()
        .take_while(|c| {
            let char_width = c.width().unwrap_or(0);
            if width + char_width <= target_width {
                width += char_width;
                true
            } else {
                false
            }
        })
        .collect();
    truncated.push(ELLIPSIS);
    Cow::Owned(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_borrowed() {
        assert!(matches!(truncate_ellipsis("nhs.uk", 60), Cow::Borrowed("nhs.uk")));
    }

    #[test]
    fn test_truncates_to_width_with_ellipsis() {
        let out = truncate_ellipsis("abcdefghij", 5);
        assert_eq!(out, "abcd…");
        assert_eq!(UnicodeWidthStr::width(out.as_ref()), 5);
    }

    #[test]
    fn test_wide_characters_count_double() {
        // Each CJK character is two columns wide
        assert_eq!(truncate_ellipsis("健康指南资料", 7), "健康指…");
    }
}
