//! Keyword-frequency analysis of extracted text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Words never reported as keywords
    pub stop_words: Vec<String>,
    /// Keywords must be longer than this many characters
    pub min_word_chars: usize,
    pub top_keywords: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            stop_words: [
                "the", "and", "of", "to", "in", "a", "is", "that", "for", "it", "as", "with",
                "on", "are", "this", "by", "be", "or", "at", "from", "an", "not", "can", "which",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            min_word_chars: 3,
            top_keywords: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Result of analysing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub pages_scanned: u32,
    pub total_words: usize,
    pub top_keywords: Vec<KeywordCount>,
}

/// Count words in `text` and pick the most frequent keywords.
///
/// Ties keep the order in which the words first appear.
pub fn analyze_text(text: &str, pages_scanned: u32, config: &AnalysisConfig) -> KeywordReport {
    let lower = text.to_lowercase();
    let stop_words: HashSet<&str> = config.stop_words.iter().map(String::as_str).collect();

    let mut total_words = 0;
    // word -> (count, first occurrence)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for word in WORD.find_iter(&lower).map(|m| m.as_str()) {
        total_words += 1;
        if stop_words.contains(word) || word.chars().count() <= config.min_word_chars {
            continue;
        }
        let next = counts.len();
        counts.entry(word).or_insert((0, next)).0 += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });

    KeywordReport {
        pages_scanned,
        total_words,
        top_keywords: ranked
            .into_iter()
            .take(config.top_keywords)
            .map(|(word, (count, _))| KeywordCount {
                word: word.to_string(),
                count,
            })
            .collect(),
    }
}

/// Upper-case the first letter of every run of letters and lower-case the
/// rest, so `"covid19x"` becomes `"Covid19X"`.
pub fn title_case(text: &str) -> String {
    let mut title = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            title.push(c);
            previous_is_letter = false;
        }
    }
    title
}
