//! Chunk retrieval

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Source of context chunks for a question
pub trait Retriever: Send + Sync {
    /// Add chunks to the index
    fn add_chunks(&mut self, chunks: Vec<String>);

    /// Return up to `k` chunks relevant to `query`, most relevant first
    fn retrieve(&self, query: &str, k: usize) -> Vec<String>;

    /// Number of indexed chunks
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ranks chunks by the number of distinct query terms they contain
///
/// Terms are lowercased alphanumeric runs. Ties keep chunk order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordRetriever {
    chunks: Vec<String>,
    #[serde(skip)]
    terms: Vec<BTreeSet<String>>,
}

impl KeywordRetriever {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chunks(chunks: Vec<String>) -> Self {
        let mut retriever = Self::new();
        retriever.add_chunks(chunks);
        retriever
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    fn score(&self, index: usize, query_terms: &BTreeSet<String>) -> usize {
        match self.terms.get(index) {
            Some(terms) => query_terms.intersection(terms).count(),
            None => query_terms.intersection(&terms_of(&self.chunks[index])).count(),
        }
    }
}

impl Retriever for KeywordRetriever {
    fn add_chunks(&mut self, chunks: Vec<String>) {
        // Rebuild term sets skipped by deserialization
        while self.terms.len() < self.chunks.len() {
            let next = terms_of(&self.chunks[self.terms.len()]);
            self.terms.push(next);
        }
        for chunk in chunks {
            self.terms.push(terms_of(&chunk));
            self.chunks.push(chunk);
        }
    }

    fn retrieve(&self, query: &str, k: usize) -> Vec<String> {
        let query_terms = terms_of(query);
        let mut ranked: Vec<(usize, usize)> = (0..self.chunks.len())
            .map(|i| (self.score(i, &query_terms), i))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked
            .into_iter()
            .take(k)
            .map(|(_, i)| self.chunks[i].clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

fn terms_of(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
