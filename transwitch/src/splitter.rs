//! Line-preserving text chunking
//!
//! Backends accept a bounded amount of text per call. `split_text` packs whole
//! lines into chunks of at most `max_len` characters so the translated chunks
//! can be rejoined with `\n` into a document with the same line structure.

/// Split `text` into chunks of whole lines, each at most `max_len` characters
///
/// Lengths are counted in `char`s. Text shorter than `max_len` is returned as
/// a single chunk. A single line longer than `max_len` is never broken up; it
/// becomes its own oversized chunk.
///
/// Joining the result with `\n` reproduces `text` exactly.
///
/// # Example
///
/// ```ignore
/// let chunks = split_text("aaa\nbbb\nccc", 7);
/// assert_eq!(chunks, vec!["aaa\nbbb", "ccc"]);
/// ```
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    if text.chars().count() < max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        // current.len() accounts for the newlines re-inserted on join
        if current_len + current.len() + line_len <= max_len {
            current_len += line_len;
            current.push(line);
        } else {
            if !current.is_empty() {
                chunks.push(current.join("\n"));
            }
            current = vec![line];
            current_len = line_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
}
