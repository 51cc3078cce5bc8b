use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `max_width` terminal columns, ending in `…` when
/// anything was cut. Borrowed when it already fits.
pub fn truncate_width(s: &str, max_width: usize) -> std::borrow::Cow<'_, str> {
    if s.width() <= max_width {
        return s.into();
    }
    if max_width == 0 {
        return "".into();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out.into()
}

/// Spaces needed between a left-hand text and a right-aligned badge so the
/// badge ends at column `total`. At least one space.
pub fn gap(total: usize, left: usize, right: usize) -> usize {
    total.saturating_sub(left + right).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_unchanged() {
        assert_eq!(truncate_width("cb:feat", 10), "cb:feat");
        assert_eq!(truncate_width("cb:feat", 7), "cb:feat");
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_width("cb:feature-auth", 8), "cb:feat…");
        assert_eq!(truncate_width("abc", 0), "");
    }

    #[test]
    fn wide_chars_count_double() {
        // each CJK char is two columns
        assert_eq!(truncate_width("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn gap_never_zero() {
        assert_eq!(gap(20, 5, 5), 10);
        assert_eq!(gap(8, 5, 5), 1);
    }
}
