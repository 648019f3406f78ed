use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Reading speed assumed by [`reading_time_minutes`].
pub const WORDS_PER_MINUTE: usize = 200;

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Number of whitespace-separated words.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Minutes needed to read `content`: `ceil(words / 200)`, never below 1.
pub fn reading_time_minutes(content: &str) -> u32 {
    let minutes = word_count(content).div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Terminal columns occupied by `s` (CJK and emoji count as two).
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Fit `s` into `max_width` columns, ending in "..." when cut.
///
/// Widths of three or less leave no room for the ellipsis, so the text is
/// simply clipped. Borrows when nothing needs to change.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let budget = if max_width <= ELLIPSIS_WIDTH {
        max_width
    } else {
        max_width - ELLIPSIS_WIDTH
    };

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    if max_width <= ELLIPSIS_WIDTH {
        Cow::Owned(s[..end].to_string())
    } else {
        Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
    }
}

/// Remove ANSI escape sequences and control characters before printing
/// untrusted text. Tab, newline and carriage return survive.
///
/// Handles CSI (`ESC [` .. final byte `@`-`~`) and OSC (`ESC ]` .. BEL or
/// `ESC \`) sequences; any other ESC is dropped on its own.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let is_stripped = |c: char| c.is_control() && !matches!(c, '\t' | '\n' | '\r');
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    for next in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&next) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next == '\x07' {
                            break;
                        }
                        if next == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }
        if !is_stripped(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
