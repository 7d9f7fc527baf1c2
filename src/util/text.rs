use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// Unicode-aware: CJK and emoji count as two columns, combining marks as
/// zero, ASCII as one.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Truncate a string to fit within `max_width` terminal columns, appending
/// `...` when anything was cut.
///
/// Returns `Cow::Borrowed` when the string already fits. For widths of 3 or
/// less there is no room for a character plus the ellipsis, so the result is
/// simply as many characters as fit.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut width = 0;
        let mut end = 0;
        for (idx, c) in s.char_indices() {
            let cw = UnicodeWidthChar::width(c).unwrap_or(0);
            if width + cw > max_width {
                break;
            }
            width += cw;
            end = idx + c.len_utf8();
        }
        return Cow::Owned(s[..end].to_string());
    }

    let target = max_width - ELLIPSIS_WIDTH;
    let mut width = 0;
    let mut cut = 0;
    for (idx, c) in s.char_indices() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw > target {
            cut = idx;
            break;
        }
        width += cw;
        cut = idx + c.len_utf8();
    }
    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Catalog names and discourse titles come from outside this process and go
/// straight into panel lines; a control sequence in one of them must not be
/// able to drive the terminal. Tab, newline and carriage return survive.
///
/// Returns `Cow::Borrowed` when the input is already clean (common case).
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    fn is_stripped(c: char) -> bool {
        c == '\u{7f}' || (c.is_control() && c != '\t' && c != '\n' && c != '\r')
    }

    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            match chars.peek() {
                // CSI: consume through the final byte (0x40-0x7e)
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: consume until BEL or ST
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\u{07}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // Bare ESC: drop it
                _ => {}
            }
        } else if !is_stripped(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_width_ascii_and_cjk() {
        assert_eq!(display_width("Hello"), 5);
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn test_truncate_fits_borrowed() {
        assert!(matches!(truncate_to_width("Short", 10), Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_narrow_widths() {
        assert_eq!(truncate_to_width("Test!", 0), "");
        assert_eq!(truncate_to_width("Test!", 1), "T");
        assert_eq!(truncate_to_width("Test!", 3), "Tes");
    }

    #[test]
    fn test_strip_clean_is_borrowed() {
        assert!(matches!(
            strip_control_chars("plain title"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_strip_csi_sequence() {
        assert_eq!(strip_control_chars("a\x1b[31mred\x1b[0mb"), "aredb");
    }

    #[test]
    fn test_strip_osc_sequence() {
        assert_eq!(strip_control_chars("x\x1b]0;evil\x07y"), "xy");
    }

    #[test]
    fn test_strip_keeps_whitespace() {
        assert_eq!(strip_control_chars("a\tb\nc"), "a\tb\nc");
        assert_eq!(strip_control_chars("a\x00b"), "ab");
    }
}
