use common::storage::types::block::Block;

/// Largest raw text slice placed in one body block; the store caps block text near 2000.
pub const SUMMARY_CHUNK_CHARS: usize = 1900;

/// Splits `text` into consecutive slices of at most `chunk_chars` characters.
///
/// Only the last slice may be shorter. Concatenating the slices yields `text`.
/// Empty input yields no slices.
pub fn split_into_chunks(text: &str, chunk_chars: usize) -> Vec<String> {
    let chunk_chars = chunk_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for ch in text.chars() {
        current.push(ch);
        current_len = current_len.saturating_add(1);
        if current_len == chunk_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Renders a markdown summary as ordered body blocks.
pub fn summary_blocks(summary: &str, chunk_chars: usize) -> Vec<Block> {
    split_into_chunks(summary, chunk_chars)
        .into_iter()
        .map(Block::markdown)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_fixed_size_chunks_with_short_tail() {
        let text: String = "abcdefghij".repeat(450);
        assert_eq!(text.chars().count(), 4500);

        let chunks = split_into_chunks(&text, SUMMARY_CHUNK_CHARS);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();

        assert_eq!(sizes, vec![1900, 1900, 700]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(5);
        let chunks = split_into_chunks(&text, 2);

        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn empty_summary_has_no_blocks() {
        assert!(summary_blocks("", SUMMARY_CHUNK_CHARS).is_empty());
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_chunk() {
        let text = "x".repeat(3800);
        let blocks = summary_blocks(&text, SUMMARY_CHUNK_CHARS);

        assert_eq!(blocks.len(), 2);
        assert!(blocks.iter().all(|b| b.content().len() == 1900));
    }
}
