//! Word frequency statistics.
//!
//! Titles are lower-cased, split on whitespace and stripped of surrounding
//! punctuation. Counts keep the order in which each token was first seen,
//! so a stable sort by count breaks ties by first appearance.

use crate::models::{StopwordSet, StoryTable, WordFrequencyTable};
use std::collections::HashMap;
use tracing::debug;

/// Characters stripped from both ends of every token.
pub const STRIP_CHARS: &[char] = &['.', ',', '-', '!', '?', ':', ';', '(', ')', '[', ']', '\'', '"'];

/// Default number of tokens kept.
pub const DEFAULT_TOP_K: usize = 25;

/// Split a title into normalized tokens, stopwords and empties removed.
pub fn tokenize<'a>(title: &'a str, stopwords: &'a StopwordSet) -> impl Iterator<Item = String> + 'a {
    title
        .split_whitespace()
        .map(|word| word.to_lowercase().trim_matches(STRIP_CHARS).to_string())
        .filter(move |token| !token.is_empty() && !stopwords.contains(token))
}

/// Token counts in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct WordCounter {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl WordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one token.
    pub fn add(&mut self, token: String) {
        match self.index.get(&token) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(token.clone(), self.counts.len());
                self.counts.push((token, 1));
            }
        }
    }

    /// Count every token of a title.
    pub fn add_title(&mut self, title: &str, stopwords: &StopwordSet) {
        for token in tokenize(title, stopwords) {
            self.add(token);
        }
    }

    /// Number of distinct tokens seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    #[cfg(test)]
    pub fn count(&self, token: &str) -> u64 {
        self.index.get(token).map(|&i| self.counts[i].1).unwrap_or(0)
    }

    /// The `k` most frequent tokens, ties in first-seen order.
    pub fn top(mut self, k: usize) -> WordFrequencyTable {
        // sort_by is stable
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts.truncate(k);
        WordFrequencyTable(self.counts)
    }
}

/// Count title tokens across the whole table and keep the top `k`.
pub fn most_frequent_words(table: &StoryTable, stopwords: &StopwordSet, k: usize) -> WordFrequencyTable {
    let mut counter = WordCounter::new();

    for title in table.titles() {
        counter.add_title(title, stopwords);
    }

    debug!(
        "{} distinct tokens after removing {} stopwords",
        counter.distinct(),
        stopwords.len()
    );
    counter.top(k)
}
