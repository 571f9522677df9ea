// src/util.rs — Shared utility functions

/// Truncate a string for display/logging (UTF-8 safe).
///
/// Returns a substring of at most `max_len` bytes, ensuring the cut
/// point falls on a valid UTF-8 character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Split text into pieces of at most `max_chars` characters each.
///
/// Counts characters, not bytes, since chat platforms limit on characters.
/// An empty input yields no pieces.
pub fn split_chars(s: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 {
        return Vec::new();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in s.char_indices() {
        if count == max_chars {
            pieces.push(&s[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < s.len() {
        pieces.push(&s[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "café" is 5 bytes (é = 2 bytes), truncating at 4 should not split é
        assert_eq!(truncate_str("café", 4), "caf");
    }

    #[test]
    fn test_split_fits() {
        assert_eq!(split_chars("hello", 10), vec!["hello"]);
    }

    #[test]
    fn test_split_exact_multiple() {
        assert_eq!(split_chars("abcdef", 3), vec!["abc", "def"]);
    }

    #[test]
    fn test_split_remainder() {
        assert_eq!(split_chars("abcdefg", 3), vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_split_multibyte_counts_chars() {
        assert_eq!(split_chars("ééé", 2), vec!["éé", "é"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_chars("", 4).is_empty());
        assert!(split_chars("abc", 0).is_empty());
    }
}
