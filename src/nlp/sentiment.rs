/// Lexicon-based sentiment scoring.

use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;

use super::{Sentiment, SentimentScorer};

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

const DEFAULT_LEXICON: &str = include_str!("../../data/sentiment.ron");

/// Words that flip the polarity of the next scored word.
const NEGATORS: &[&str] = &["not", "never", "no", "n't"];
/// Polarity multiplier applied to a negated word.
const NEGATION_FACTOR: f64 = -0.5;

/// Scores text by averaging the entries of a word lexicon.
///
/// A negator immediately before a scored word multiplies that word's
/// polarity by -0.5. Words missing from the lexicon are ignored; text with
/// no scored words is neutral and objective.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    entries: FxHashMap<String, (f64, f64)>,
}

impl LexiconScorer {
    /// Parse a lexicon from a RON map of `word: (polarity, subjectivity)`.
    pub fn parse_ron(input: &str) -> Result<Self, LexiconError> {
        let raw: FxHashMap<String, (f64, f64)> = ron::from_str(input)?;
        let entries = raw
            .into_iter()
            .map(|(word, (p, s))| (word.to_lowercase(), (p.clamp(-1.0, 1.0), s.clamp(0.0, 1.0))))
            .collect();
        Ok(Self { entries })
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, LexiconError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Add or replace a single entry.
    pub fn insert(&mut self, word: &str, polarity: f64, subjectivity: f64) {
        self.entries.insert(
            word.to_lowercase(),
            (polarity.clamp(-1.0, 1.0), subjectivity.clamp(0.0, 1.0)),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        // The embedded lexicon is checked by `default_lexicon_parses`.
        Self::parse_ron(DEFAULT_LEXICON).unwrap_or_else(|_| Self {
            entries: FxHashMap::default(),
        })
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Sentiment {
        let mut polarity = 0.0;
        let mut subjectivity = 0.0;
        let mut scored = 0usize;
        let mut negated = false;

        let words = text
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase);

        for word in words {
            let word = word.trim_matches('\'');
            if NEGATORS.contains(&word) || word.ends_with("n't") {
                negated = true;
                continue;
            }
            if let Some(&(p, s)) = self.entries.get(word) {
                polarity += if negated { p * NEGATION_FACTOR } else { p };
                subjectivity += s;
                scored += 1;
            }
            negated = false;
        }

        if scored == 0 {
            return Sentiment::default();
        }
        Sentiment {
            polarity: (polarity / scored as f64).clamp(-1.0, 1.0),
            subjectivity: (subjectivity / scored as f64).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn default_lexicon_parses() {
        let scorer = LexiconScorer::parse_ron(DEFAULT_LEXICON).unwrap();
        assert!(scorer.len() > 50);
    }

    #[test]
    fn single_word_scores() {
        let scorer = LexiconScorer::default();
        let s = scorer.score("good");
        assert!(close(s.polarity, 0.7));
        assert!(close(s.subjectivity, 0.6));
    }

    #[test]
    fn unknown_text_is_neutral() {
        let scorer = LexiconScorer::default();
        assert_eq!(scorer.score("the cat sat ."), Sentiment::default());
        assert_eq!(scorer.score(""), Sentiment::default());
    }

    #[test]
    fn averages_scored_words() {
        let scorer = LexiconScorer::default();
        let s = scorer.score("a good and bad day");
        assert!(close(s.polarity, 0.0));
        assert!(close(s.subjectivity, (0.6 + 0.667) / 2.0));
    }

    #[test]
    fn negation_flips_and_damps() {
        let scorer = LexiconScorer::default();
        let s = scorer.score("not good");
        assert!(close(s.polarity, -0.35));
        let s = scorer.score("don't love");
        assert!(close(s.polarity, -0.25));
    }

    #[test]
    fn insert_clamps() {
        let mut scorer = LexiconScorer::parse_ron("{}").unwrap();
        scorer.insert("Sublime", 3.0, -1.0);
        let s = scorer.score("sublime");
        assert!(close(s.polarity, 1.0));
        assert!(close(s.subjectivity, 0.0));
    }
}
