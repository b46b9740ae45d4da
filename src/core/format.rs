/// Punctuation-aware joining of poem names and sentences.

use rustc_hash::FxHashSet;

use crate::core::config::GeneratorConfig;
use crate::core::lexicon::KnowledgeBase;
use crate::schema::poem::{Poem, Sentence};

/// Joins tokens with single spaces, except that hyphens glue their
/// neighbours together, left brackets glue to the next word and trailing
/// punctuation glues to the previous word.
///
/// Punctuation classes are the words the knowledge base recorded under the
/// configured tags, so only punctuation seen in the corpus is recognised.
#[derive(Debug, Clone, Default)]
pub struct Reformatter {
    hyphens: FxHashSet<String>,
    left_brackets: FxHashSet<String>,
    trailing: FxHashSet<String>,
}

impl Reformatter {
    pub fn new(kb: &KnowledgeBase, config: &GeneratorConfig) -> Self {
        let words_of = |tag: &str| -> FxHashSet<String> {
            kb.words_with_tag(tag).iter().cloned().collect()
        };
        Self {
            hyphens: words_of(&config.hyphen_tag),
            left_brackets: words_of(&config.left_bracket_tag),
            trailing: config
                .trailing_punct_tags
                .iter()
                .flat_map(|tag| kb.words_with_tag(tag).iter().cloned())
                .collect(),
        }
    }

    pub fn reformat_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        let mut out: Vec<String> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let current = tokens[i].as_ref();
            let next = tokens.get(i + 1).map(AsRef::as_ref).unwrap_or("");

            if self.hyphens.contains(current) {
                let previous = out.pop().unwrap_or_default();
                out.push(format!("{previous}{current}{next}"));
                i += 2;
                continue;
            }
            if self.left_brackets.contains(current) {
                out.push(format!("{current}{next}"));
                i += 2;
                continue;
            }
            if self.trailing.contains(current) {
                let previous = out.pop().unwrap_or_default();
                out.push(previous + current);
            } else {
                out.push(current.to_string());
            }
            i += 1;
        }
        out.join(" ")
    }

    pub fn reformat_name(&self, name: &str) -> String {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        self.reformat_tokens(&tokens)
    }

    /// Rewrites the sentence text; the token list is left as is.
    pub fn reformat_sentence(&self, sentence: &mut Sentence) {
        sentence.text = self.reformat_tokens(&sentence.tokens);
    }

    pub fn reformat_poem(&self, poem: &mut Poem) {
        for sentence in &mut poem.sentences {
            self.reformat_sentence(sentence);
        }
        poem.join_list_to_text();
    }
}
