use serde::{Deserialize, Serialize};
use std::fmt;

/// A generated sentence: the working token list, its joined text and the
/// template text it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<String>,
    pub text: String,
    /// Text of the template the sentence was generated from. Kept for
    /// traceability only.
    pub template: String,
}

impl Sentence {
    /// Build a sentence whose text is its tokens joined by single spaces.
    pub fn from_tokens(tokens: Vec<String>, template: impl Into<String>) -> Self {
        let text = tokens.join(" ");
        Self {
            tokens,
            text,
            template: template.into(),
        }
    }

    /// Recompute `text` from the token list.
    pub fn rejoin(&mut self) {
        self.text = self.tokens.join(" ");
    }

    pub fn contains_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A poem: its name, the themes it was generated from, its text and the
/// sentences that make it up.
///
/// `text` is only consistent with `sentences` after an explicit
/// [`Poem::join_list_to_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poem {
    pub name: String,
    pub themes: Vec<String>,
    pub text: String,
    pub sentences: Vec<Sentence>,
    num_sentences: usize,
}

impl Poem {
    pub fn new(name: impl Into<String>, themes: Vec<String>, sentences: Vec<Sentence>) -> Self {
        let num_sentences = sentences.len();
        let mut poem = Self {
            name: name.into(),
            themes,
            text: String::new(),
            sentences,
            num_sentences,
        };
        poem.join_list_to_text();
        poem
    }

    /// Number of sentences, fixed when the poem was created.
    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    /// Texts of all sentences, in order.
    pub fn sentence_texts(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.text.as_str()).collect()
    }

    /// Rebuild `text` as the sentence texts joined by newlines.
    pub fn join_list_to_text(&mut self) -> &str {
        self.text = self.sentence_texts().join("\n");
        &self.text
    }
}

impl fmt::Display for Poem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
