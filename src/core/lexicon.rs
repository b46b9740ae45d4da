/// Lexical knowledge base and template store, learned from parsed text.
///
/// The knowledge base records, for every word seen in the corpus, which
/// part-of-speech tags it carried, which words depended on it under which
/// labels, and its sentiment. Templates are the parsed corpus sentences
/// themselves, later reused as skeletons for new sentences.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::nlp::SentimentScorer;
use crate::schema::token::ParsedSentence;

/// A set of words that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedWordSet {
    words: Vec<String>,
    index: FxHashSet<String>,
}

impl OrderedWordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `word`, returning `false` if it was already present.
    pub fn insert(&mut self, word: &str) -> bool {
        if self.index.contains(word) {
            return false;
        }
        self.index.insert(word.to_string());
        self.words.push(word.to_string());
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.words.iter()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Uniform random member.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.words.choose(rng).map(String::as_str)
    }
}

/// Which sentiment axis a lookup or revision targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentAxis {
    Polarity,
    Subjectivity,
}

/// Words, tags, dependency patterns and sentiment learned from a corpus.
///
/// Missing keys read as empty collections; nothing here is an error.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    tag_to_words: FxHashMap<String, OrderedWordSet>,
    word_to_deps: FxHashMap<String, FxHashMap<String, OrderedWordSet>>,
    polarity: FxHashMap<String, f64>,
    subjectivity: FxHashMap<String, f64>,
    corpus_vocabulary: FxHashSet<String>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a word under `tag` with its sentiment scores.
    pub fn record_word(&mut self, word: &str, tag: &str, polarity: f64, subjectivity: f64) {
        let word = word.to_lowercase();
        self.tag_to_words
            .entry(tag.to_string())
            .or_default()
            .insert(&word);
        self.polarity.insert(word.clone(), polarity);
        self.subjectivity.insert(word, subjectivity);
    }

    /// Record that `child` depends on `head` under `label`.
    pub fn record_dependency(&mut self, head: &str, label: &str, child: &str) {
        self.word_to_deps
            .entry(head.to_string())
            .or_default()
            .entry(label.to_string())
            .or_default()
            .insert(child);
    }

    /// Learn every token and edge of a parsed corpus sentence, walking the
    /// tree from its root.
    pub fn learn_sentence(&mut self, sentence: &ParsedSentence, scorer: &dyn SentimentScorer) {
        if sentence.is_empty() {
            return;
        }
        self.learn_subtree(sentence, sentence.root, scorer);
        for token in &sentence.tokens {
            self.corpus_vocabulary.insert(token.text.clone());
        }
    }

    fn learn_subtree(&mut self, sentence: &ParsedSentence, index: usize, scorer: &dyn SentimentScorer) {
        let token = sentence.token(index);
        self.word_to_deps.entry(token.text.clone()).or_default();
        let sentiment = scorer.score(&token.lower);
        self.record_word(&token.lower, &token.tag, sentiment.polarity, sentiment.subjectivity);

        for (child_index, child) in sentence.children(index) {
            self.record_dependency(&token.text, &child.dep, &child.text);
            self.learn_subtree(sentence, child_index, scorer);
        }
    }

    /// Register a theme's tokens in the tag and sentiment maps without
    /// adding them to the corpus vocabulary.
    pub fn learn_theme(&mut self, theme: &ParsedSentence, scorer: &dyn SentimentScorer) {
        for token in &theme.tokens {
            let sentiment = scorer.score(&token.lower);
            self.record_word(&token.lower, &token.tag, sentiment.polarity, sentiment.subjectivity);
        }
    }

    /// All words seen with `tag`, in first-seen order. Empty for an
    /// unknown tag.
    pub fn words_with_tag(&self, tag: &str) -> &[String] {
        self.tag_to_words
            .get(tag)
            .map(OrderedWordSet::as_slice)
            .unwrap_or(&[])
    }

    pub fn tag_word_set(&self, tag: &str) -> Option<&OrderedWordSet> {
        self.tag_to_words.get(tag)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag_to_words.get(tag).is_some_and(|w| !w.is_empty())
    }

    pub fn tag_contains(&self, tag: &str, word: &str) -> bool {
        self.tag_to_words.get(tag).is_some_and(|w| w.contains(word))
    }

    /// Whether `word` has an entry in the dependency map.
    pub fn has_dependency_entry(&self, word: &str) -> bool {
        self.word_to_deps.contains_key(word)
    }

    /// Whether `word` has recorded dependents under `label`.
    pub fn has_dependents(&self, word: &str, label: &str) -> bool {
        self.word_to_deps
            .get(word)
            .is_some_and(|deps| deps.contains_key(label))
    }

    /// Words seen depending on `word` under `label`. Empty when unknown.
    pub fn dependents(&self, word: &str, label: &str) -> &[String] {
        self.word_to_deps
            .get(word)
            .and_then(|deps| deps.get(label))
            .map(OrderedWordSet::as_slice)
            .unwrap_or(&[])
    }

    pub fn sentiment(&self, axis: SentimentAxis, word: &str) -> Option<f64> {
        match axis {
            SentimentAxis::Polarity => self.polarity.get(word).copied(),
            SentimentAxis::Subjectivity => self.subjectivity.get(word).copied(),
        }
    }

    pub fn in_corpus(&self, word: &str) -> bool {
        self.corpus_vocabulary.contains(word)
    }

    pub fn tags(&self) -> impl Iterator<Item = (&String, &OrderedWordSet)> {
        self.tag_to_words.iter()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.corpus_vocabulary.len()
    }

    /// Number of distinct (head, label, child) edges.
    pub fn dependency_edge_count(&self) -> usize {
        self.word_to_deps
            .values()
            .flat_map(|deps| deps.values())
            .map(OrderedWordSet::len)
            .sum()
    }
}

/// A parsed corpus sentence used as a skeleton for new sentences.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Normalized sentence text.
    pub text: String,
    pub sentence: ParsedSentence,
}

impl Template {
    pub fn root(&self) -> usize {
        self.sentence.root
    }

    pub fn root_tag(&self) -> &str {
        &self.sentence.root_token().tag
    }

    /// Fresh working copy of the template's surface forms.
    pub fn token_list(&self) -> Vec<String> {
        self.sentence.surface_forms()
    }
}

/// All templates of a session.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    templates: Vec<Template>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    pub fn all(&self) -> Vec<&Template> {
        self.templates.iter().collect()
    }

    /// Templates whose root tag has `word` among its recorded words.
    pub fn with_root_tag_admitting<'a>(&'a self, kb: &KnowledgeBase, word: &str) -> Vec<&'a Template> {
        self.templates
            .iter()
            .filter(|t| kb.tag_contains(t.root_tag(), word))
            .collect()
    }

    /// Templates whose text contains `needle` as a substring.
    pub fn containing(&self, needle: &str) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.text.contains(needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
