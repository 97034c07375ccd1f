//! Recursive character splitter.
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! words, then characters), then greedily merges neighbouring pieces into
//! chunks of at most `chunk_size` characters with up to `chunk_overlap`
//! characters carried over between chunks. Separators stay attached to the
//! start of the piece that follows them.

use std::collections::VecDeque;

/// Separators tried in order, coarsest first. `""` splits into characters.
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, s) in separators.iter().enumerate() {
            if s.is_empty() {
                separator = "";
                break;
            }
            if text.contains(s.as_str()) {
                separator = s.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for piece in split_keep_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                chunks.extend(self.merge(std::mem::take(&mut good)));
            }
            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, remaining));
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge(good));
        }

        chunks
    }

    /// Greedy merge of small pieces. Pieces already carry their separator,
    /// so they are concatenated directly.
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<(String, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(&piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_trimmed(&mut docs, &current);
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match current.pop_front() {
                        Some((_, l)) => total -= l,
                        None => break,
                    }
                }
            }
            total += len;
            current.push_back((piece, len));
        }
        push_trimmed(&mut docs, &current);

        docs
    }
}

fn push_trimmed(docs: &mut Vec<String>, current: &VecDeque<(String, usize)>) {
    let joined: String = current.iter().map(|(s, _)| s.as_str()).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Split so that every separator occurrence starts a new piece. Empty
/// pieces are dropped.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
