//! Logging helpers for text that came out of user-editable catalog files.
//! Item names and diagnostics are quoted into warnings verbatim, so they
//! must not be able to break a log line apart or smuggle control characters.

/// Cap on quoted catalog text; diagnostics repeat the file name anyway.
const MAX_PREVIEW: usize = 160;

/// Escape untrusted catalog text for single-line logging. Newlines, tabs and
/// backslashes become their escape sequences, other control characters are
/// hex-escaped, and anything past the preview cap is dropped behind an
/// ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_log;

    #[test]
    fn catalog_text_stays_on_one_line() {
        let s = "core:gem\nfake log line\tend";
        assert_eq!(escape_log(s), "core:gem\\nfake log line\\tend");
    }

    #[test]
    fn long_text_is_truncated() {
        let s = "x".repeat(500);
        let esc = escape_log(&s);
        assert!(esc.chars().count() <= 161);
        assert!(esc.ends_with('…'));
    }
}
