/// One generation session: knowledge learned from a corpus, the poems
/// drafted from it, and their revision.

use log::{debug, info, warn};
use rand::Rng;
use std::slice;

use crate::core::config::GeneratorConfig;
use crate::core::context::PoemRegistry;
use crate::core::coverage;
use crate::core::format::Reformatter;
use crate::core::lexicon::{KnowledgeBase, Template, TemplateStore};
use crate::core::sentiment::{self, SentimentReviser};
use crate::core::synth::{name_poem, GenerateError, Synthesizer};
use crate::nlp::{ContractionExpander, DependencyParser, Sentiment, SentimentScorer};
use crate::schema::poem::{Poem, Sentence};
use crate::source::Corpus;

/// Session state owned by one generation run. Collaborators are borrowed;
/// everything learned lives and dies with the session.
pub struct PoemGenerator<'a> {
    parser: &'a dyn DependencyParser,
    scorer: &'a dyn SentimentScorer,
    expander: &'a dyn ContractionExpander,
    config: &'a GeneratorConfig,
    kb: KnowledgeBase,
    templates: TemplateStore,
    registry: PoemRegistry,
}

impl<'a> PoemGenerator<'a> {
    pub fn new(
        parser: &'a dyn DependencyParser,
        scorer: &'a dyn SentimentScorer,
        expander: &'a dyn ContractionExpander,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            parser,
            scorer,
            expander,
            config,
            kb: KnowledgeBase::new(),
            templates: TemplateStore::new(),
            registry: PoemRegistry::new(),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn registry(&self) -> &PoemRegistry {
        &self.registry
    }

    fn synthesizer(&self) -> Synthesizer<'_> {
        Synthesizer::new(&self.kb, &self.templates, self.parser, self.config)
    }

    /// Expand contractions word by word and lowercase.
    fn normalize(&self, sentence: &str) -> String {
        sentence
            .split_whitespace()
            .map(|word| self.expander.expand(word))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Learn words, dependencies and templates from every text of `corpus`.
    /// Returns the number of templates added.
    pub fn learn_corpus(&mut self, corpus: &Corpus) -> usize {
        let before = self.templates.len();
        for (name, text) in corpus {
            for raw in self.parser.segment(text) {
                let raw = raw.trim();
                if raw.is_empty() {
                    continue;
                }
                let normalized = self.normalize(raw);
                for parsed in self.parser.parse(&normalized) {
                    if parsed.is_empty() {
                        continue;
                    }
                    self.kb.learn_sentence(&parsed, self.scorer);
                    self.templates.push(Template {
                        text: parsed.text.clone(),
                        sentence: parsed,
                    });
                }
            }
            debug!("learned '{}', {} templates so far", name, self.templates.len());
        }
        let added = self.templates.len() - before;
        info!(
            "learned {} templates, {} words, {} dependency edges",
            added,
            self.kb.vocabulary_len(),
            self.kb.dependency_edge_count()
        );
        added
    }

    /// Register theme words with the tag and sentiment maps. Themes do not
    /// join the corpus vocabulary.
    pub fn learn_themes(&mut self, themes: &[String]) {
        for theme in themes {
            for parsed in self.parser.parse(theme) {
                self.kb.learn_theme(&parsed, self.scorer);
            }
        }
    }

    /// Draft a poem of `num_sentences` sentences.
    ///
    /// Each sentence picks a theme uniformly from `themes` plus "no theme".
    /// Without a theme the sentence is a plain regeneration. A theme missing
    /// from the corpus is injected into a plain regeneration. A corpus theme
    /// either becomes the root of a template whose root tag admits it, or is
    /// kept in place in a template that contains it.
    pub fn generate_poem<R: Rng + ?Sized>(
        &mut self,
        num_sentences: usize,
        themes: &[String],
        rng: &mut R,
    ) -> Result<Poem, GenerateError> {
        let synth = self.synthesizer();
        let mut sentences = Vec::with_capacity(num_sentences);

        for i in 0..num_sentences {
            let theme = themes.get(rng.gen_range(0..=themes.len()));
            let sentence = match theme {
                None => {
                    let (template, root) = synth.random_template_and_root(rng)?;
                    synth.generate_from_root(template, &root, rng)?
                }
                Some(theme) if !self.kb.in_corpus(theme) => {
                    let (template, root) = synth.random_template_and_root(rng)?;
                    let mut sentence = synth.generate_from_root(template, &root, rng)?;
                    match synth.tag_of(theme) {
                        Some(tag) => {
                            synth.add_theme_to_sentence(theme, &tag, &[], &mut sentence);
                        }
                        None => warn!("cannot determine a tag for theme '{}'", theme),
                    }
                    sentence
                }
                Some(theme) if rng.gen_bool(0.5) => {
                    let candidates = self.templates.with_root_tag_admitting(&self.kb, theme);
                    let template = synth.get_sentence_template(&candidates, rng)?;
                    synth.generate_from_root(template, theme, rng)?
                }
                Some(theme) => {
                    let candidates = self.templates.containing(theme);
                    let template = synth.get_sentence_template(&candidates, rng)?;
                    let root = synth.random_word_with_tag(template.root_tag(), rng)?;
                    synth.generate_with_theme(template, &root, slice::from_ref(theme), rng)?
                }
            };
            debug!("sentence {} ({:?}): {}", i, theme, sentence.text);
            sentences.push(sentence);
        }

        let max_words = self.config.max_name_words;
        let name = self.registry.unique_name(
            &sentences,
            self.config.max_name_attempts,
            rng,
            |s: &[Sentence], r: &mut R| name_poem(s, max_words, r),
        );
        let poem = Poem::new(name, themes.to_vec(), sentences);
        self.registry.insert(poem.clone());
        Ok(poem)
    }

    pub fn improve_poem_themes<R: Rng + ?Sized>(
        &self,
        poem: &mut Poem,
        rng: &mut R,
    ) -> Result<(), GenerateError> {
        coverage::improve_poem_themes(&self.synthesizer(), poem, rng)
    }

    pub fn evaluate_sentiment(&self, poem: &Poem) -> Sentiment {
        sentiment::evaluate_sentiment(poem, self.scorer)
    }

    /// Returns the number of revision rounds used.
    pub fn improve_poem_sentiment<R: Rng + ?Sized>(
        &self,
        poem: &mut Poem,
        goal: Sentiment,
        rng: &mut R,
    ) -> u32 {
        SentimentReviser::new(&self.kb, self.parser, self.scorer, self.config)
            .improve_poem_sentiment(poem, goal, rng)
    }

    /// Reformat every sentence, then draw and reformat a new name.
    pub fn reformat_poem<R: Rng + ?Sized>(&mut self, poem: &mut Poem, rng: &mut R) {
        let reformatter = Reformatter::new(&self.kb, self.config);
        reformatter.reformat_poem(poem);

        self.registry.remove(&poem.name);
        let max_words = self.config.max_name_words;
        poem.name = self.registry.unique_name(
            &poem.sentences,
            self.config.max_name_attempts,
            rng,
            |s: &[Sentence], r: &mut R| reformatter.reformat_name(&name_poem(s, max_words, r)),
        );
        self.registry.insert(poem.clone());
    }
}
