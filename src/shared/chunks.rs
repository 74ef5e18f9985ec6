//! Character-boundary-safe text splitting for outbound length limits.

/// Split `text` into pieces of at most `size` characters (not bytes).
pub fn split_chars(text: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    if text.chars().count() <= size {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
