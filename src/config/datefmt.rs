//! Date format handling
//!
//! Report timestamps are rendered with chrono's strftime syntax. Configuration
//! files written for the JavaScript tooling use `yyyy-MM-dd HH:mm:ss` style
//! tokens instead, so a pattern without any `%` is translated first.

use chrono::format::{Item, StrftimeItems};
use std::borrow::Cow;

/// Token table, longest tokens first so that `yyyy` wins over `yy`
const TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("MMMM", "%B"),
    ("EEEE", "%A"),
    ("SSS", "%3f"),
    ("MMM", "%b"),
    ("EEE", "%a"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("xxx", "%:z"),
    ("a", "%p"),
];

/// Returns a chrono strftime pattern for `format`
///
/// Patterns that already contain `%` are returned unchanged. Otherwise
/// date-fns tokens are replaced and text in single quotes is kept literally.
///
/// # Examples
///
/// ```
/// use broken_links_checker::config::strftime_pattern;
///
/// assert_eq!(strftime_pattern("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
/// assert_eq!(strftime_pattern("%d.%m.%Y"), "%d.%m.%Y");
/// assert_eq!(strftime_pattern("yyyy-MM-dd'T'HH:mm"), "%Y-%m-%dT%H:%M");
/// ```
pub fn strftime_pattern(format: &str) -> Cow<'_, str> {
    if format.contains('%') {
        return Cow::Borrowed(format);
    }

    let mut out = String::with_capacity(format.len() * 2);
    let mut rest = format;

    'outer: while let Some(c) = rest.chars().next() {
        if let Some(stripped) = rest.strip_prefix("''") {
            out.push('\'');
            rest = stripped;
            continue;
        }

        if let Some(quoted) = rest.strip_prefix('\'') {
            let mut chars = quoted.char_indices().peekable();
            let mut end = quoted.len();
            while let Some((i, ch)) = chars.next() {
                if ch != '\'' {
                    out.push(ch);
                } else if matches!(chars.peek(), Some((_, '\''))) {
                    out.push('\'');
                    chars.next();
                } else {
                    end = i + 1;
                    break;
                }
            }
            rest = &quoted[end..];
            continue;
        }

        for (token, replacement) in TOKENS {
            if let Some(stripped) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = stripped;
                continue 'outer;
            }
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Checks that `format` yields a usable strftime pattern
pub fn is_valid_date_format(format: &str) -> bool {
    let pattern = strftime_pattern(format);
    !StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error))
}
