//! Shared utility functions.

/// Shorten backend text for log lines.
///
/// Cuts at `max_bytes` without splitting a UTF-8 character and appends an
/// ellipsis when anything was dropped. Newlines are flattened so one
/// response stays on one log line.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if flat.len() <= max_bytes {
        return flat;
    }
    let mut end = max_bytes;
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &flat[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_unchanged() {
        assert_eq!(preview("hi", 10), "hi");
    }

    #[test]
    fn preview_truncates_with_ellipsis() {
        assert_eq!(preview("hello world", 5), "hello…");
    }

    #[test]
    fn preview_flattens_newlines() {
        assert_eq!(preview("a\nb", 10), "a b");
    }

    #[test]
    fn preview_multibyte_boundary() {
        // 'の' is 3 bytes; cutting at 4 backs up to 3
        assert_eq!(preview("あのね", 4), "あ…");
    }
}
