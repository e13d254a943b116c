//! Cell text wrapping.

/// Width used for long cell values.
pub const WRAP_WIDTH: usize = 110;

/// Shown in place of an absent value.
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Hard-wrap `value` every `max` characters.
///
/// Carriage returns are dropped from the output but still take up a column.
/// Embedded newlines are kept and restart the column count. One trailing
/// newline is removed. A `max` of zero disables wrapping.
pub fn wrap(value: Option<&str>, max: usize) -> String {
    let Some(text) = value else {
        return NOT_SPECIFIED.to_string();
    };

    let mut out = String::with_capacity(text.len() + text.len() / max.max(1));
    let mut column = 0;
    for ch in text.chars() {
        if ch != '\r' {
            out.push(ch);
        }
        if ch == '\n' {
            column = 0;
            continue;
        }
        column += 1;
        if column == max {
            out.push('\n');
            column = 0;
        }
    }

    if out.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_at_width() {
        assert_eq!(wrap(Some("abcdefghij"), 5), "abcde\nfghij");
    }

    #[test]
    fn test_wrap_newline_resets_column() {
        assert_eq!(wrap(Some("ab\ncdefg"), 5), "ab\ncdefg");
        assert_eq!(wrap(Some("abcd\nefghijk"), 5), "abcd\nefghi\njk");
    }

    #[test]
    fn test_wrap_strips_trailing_newline() {
        assert_eq!(wrap(Some("abc\n"), 5), "abc");
        assert_eq!(wrap(Some("abcde"), 5), "abcde");
    }

    #[test]
    fn test_wrap_drops_carriage_returns() {
        assert_eq!(wrap(Some("ab\r\ncd"), 5), "ab\ncd");
    }

    #[test]
    fn test_wrap_carriage_return_takes_a_column() {
        assert_eq!(wrap(Some("a\rbcdef"), 5), "abcd\nef");
        assert_eq!(wrap(Some("abcd\r\nxyz"), 5), "abcd\n\nxyz");
    }

    #[test]
    fn test_wrap_absent() {
        assert_eq!(wrap(None, 110), "Not Specified");
    }

    #[test]
    fn test_wrap_short_and_empty() {
        assert_eq!(wrap(Some(""), 5), "");
        assert_eq!(wrap(Some("hello world"), WRAP_WIDTH), "hello world");
    }

    #[test]
    fn test_wrap_counts_chars_not_bytes() {
        assert_eq!(wrap(Some("ééééé é"), 5), "ééééé\n é");
    }

    #[test]
    fn test_wrap_zero_width_disables_wrapping() {
        assert_eq!(wrap(Some("abcdefghij"), 0), "abcdefghij");
    }
}
