//! Linguistic capabilities consumed by the generator: parsing, sentiment
//! scoring and contraction expansion, with default English implementations.

pub mod contractions;
pub mod heuristic;
pub mod sentiment;

use serde::{Deserialize, Serialize};

use crate::schema::token::ParsedSentence;

pub use contractions::ContractionTable;
pub use heuristic::HeuristicParser;
pub use sentiment::LexiconScorer;

/// Sentence segmentation, tagging and dependency parsing.
pub trait DependencyParser {
    /// Split raw text into sentence strings, preserving their original text.
    fn segment(&self, text: &str) -> Vec<String>;

    /// Tokenize, tag and dependency-parse `text`. One entry per sentence.
    fn parse(&self, text: &str) -> Vec<ParsedSentence>;

    /// Tag of `word` parsed in isolation: the tag of the last token
    /// produced, or `None` if the parser produced no tokens.
    fn tag_word(&self, word: &str) -> Option<String> {
        self.parse(word)
            .into_iter()
            .flat_map(|s| s.tokens)
            .last()
            .map(|t| t.tag)
    }
}

/// Polarity in `[-1, 1]` and subjectivity in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

pub trait SentimentScorer {
    fn score(&self, text: &str) -> Sentiment;
}

/// Best-effort expansion of contracted words ("don't" -> "do not").
pub trait ContractionExpander {
    fn expand(&self, word: &str) -> String;
}
