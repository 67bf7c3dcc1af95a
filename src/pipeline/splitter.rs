//! Recursive character text splitter
//!
//! Splits on the coarsest separator present (paragraphs, then lines, then
//! words, then characters) and merges the pieces back into chunks of at most
//! `chunk_size` characters, carrying up to `chunk_overlap` characters of
//! trailing context into the next chunk.

use crate::domain::{Result, ShroudError};
use std::collections::VecDeque;

/// Default separators, coarsest first
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveTextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveTextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl RecursiveTextSplitter {
    /// Create a splitter; sizes are counted in characters
    ///
    /// # Errors
    ///
    /// Returns [`ShroudError::Validation`] when `chunk_size` is zero or the
    /// overlap is not smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ShroudError::Validation(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ShroudError::Validation(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    /// Replace the separator list; an empty separator is appended if missing
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        if !self.separators.iter().any(String::is_empty) {
            self.separators.push(String::new());
        }
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunks of at most `chunk_size` characters
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()));
        let (separator, remaining) = match position {
            Some(i) => (separators[i].as_str(), &separators[i + 1..]),
            None => ("", &separators[separators.len()..]),
        };

        let splits: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for split in splits {
            if char_len(split) <= self.chunk_size {
                pending.push(split);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge_splits(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(split.to_string());
            } else {
                chunks.extend(self.split_recursive(split, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge_splits(&pending, separator));
        }
        chunks
    }

    fn merge_splits(&self, splits: &[&str], separator: &str) -> Vec<String> {
        let separator_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let joined_len = |current: &VecDeque<&str>| {
                if current.is_empty() {
                    0
                } else {
                    separator_len
                }
            };

            if total + len + joined_len(&current) > self.chunk_size && !current.is_empty() {
                if let Some(chunk) = join_chunk(&current, separator) {
                    chunks.push(chunk);
                }
                // Drop leading pieces until only the overlap remains and the
                // next piece fits
                while let Some(first) = current.front() {
                    let fits = total + len + joined_len(&current) <= self.chunk_size;
                    if total <= self.chunk_overlap && fits {
                        break;
                    }
                    total -= char_len(first) + if current.len() > 1 { separator_len } else { 0 };
                    current.pop_front();
                }
            }

            total += len + joined_len(&current);
            current.push_back(split);
        }

        if let Some(chunk) = join_chunk(&current, separator) {
            chunks.push(chunk);
        }
        chunks
    }
}

fn join_chunk(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
