/// Split text into whitespace-delimited tokens.
/// No lowercasing, no punctuation handling, duplicates and order preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Number of whitespace-delimited words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split text into sentences on the literal ". " separator.
/// Always yields at least one (possibly empty) piece, like `str::split`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(". ").collect()
}

/// Convert a byte offset into `text` to a character offset.
pub(crate) fn char_offset(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}
