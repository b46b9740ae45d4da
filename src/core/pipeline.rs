/// The top-level poem pipeline: corpus + themes → finished poem.
///
/// Wires together corpus learning, sentence drafting, theme coverage,
/// sentiment revision and reformatting.

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::{ConfigError, GeneratorConfig};
use crate::core::generator::PoemGenerator;
use crate::core::sentiment::sentiment_goal;
use crate::core::synth::GenerateError;
use crate::nlp::sentiment::LexiconError;
use crate::nlp::{
    ContractionExpander, ContractionTable, DependencyParser, HeuristicParser, LexiconScorer,
    SentimentScorer,
};
use crate::schema::poem::Poem;
use crate::source::{CorpusError, CorpusSource, DirectoryCorpus, FixedThemes, StaticCorpus, ThemeSource};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generation error: {0}")]
    Generate(#[from] GenerateError),
    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),
    #[error("corpus produced no sentence templates")]
    EmptyCorpus,
}

/// Result of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum PoemOutcome {
    Poem(Poem),
    /// No themes were available, so nothing was generated.
    NoImages,
}

impl PoemOutcome {
    pub const NO_IMAGES_NAME: &'static str = "temp";
    pub const NO_IMAGES_TEXT: &'static str = "*NO IMAGES*";

    pub fn name(&self) -> &str {
        match self {
            PoemOutcome::Poem(poem) => &poem.name,
            PoemOutcome::NoImages => Self::NO_IMAGES_NAME,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            PoemOutcome::Poem(poem) => &poem.text,
            PoemOutcome::NoImages => Self::NO_IMAGES_TEXT,
        }
    }

    pub fn poem(&self) -> Option<&Poem> {
        match self {
            PoemOutcome::Poem(poem) => Some(poem),
            PoemOutcome::NoImages => None,
        }
    }
}

/// The top-level poem engine. Built via `PoemEngine::builder()`.
pub struct PoemEngine {
    parser: Box<dyn DependencyParser>,
    scorer: Box<dyn SentimentScorer>,
    expander: Box<dyn ContractionExpander>,
    corpus: Box<dyn CorpusSource>,
    themes: Box<dyn ThemeSource>,
    config: GeneratorConfig,
    seed: Option<u64>,
    generation_count: u64,
}

/// Builder for constructing a `PoemEngine`.
#[derive(Default)]
pub struct PoemEngineBuilder {
    parser: Option<Box<dyn DependencyParser>>,
    scorer: Option<Box<dyn SentimentScorer>>,
    expander: Option<Box<dyn ContractionExpander>>,
    corpus: Option<Box<dyn CorpusSource>>,
    themes: Option<Box<dyn ThemeSource>>,
    fixed_themes: Vec<String>,
    corpus_dir: Option<PathBuf>,
    lexicon_path: Option<PathBuf>,
    config: Option<GeneratorConfig>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
}

impl PoemEngine {
    pub fn builder() -> PoemEngineBuilder {
        PoemEngineBuilder::default()
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Ask the theme source for themes and generate a poem with the
    /// configured number of sentences.
    pub fn run(&mut self) -> Result<PoemOutcome, PipelineError> {
        match self.themes.detect_themes() {
            Some(themes) => self.generate(self.config.num_sentences, &themes),
            None => {
                info!("theme source produced no themes");
                Ok(PoemOutcome::NoImages)
            }
        }
    }

    /// Run one full generation session. An empty theme list yields
    /// `PoemOutcome::NoImages`.
    pub fn generate(
        &mut self,
        num_sentences: usize,
        themes: &[String],
    ) -> Result<PoemOutcome, PipelineError> {
        if themes.is_empty() {
            info!("no themes given, skipping generation");
            return Ok(PoemOutcome::NoImages);
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.generation_count)),
            None => StdRng::from_entropy(),
        };
        self.generation_count += 1;

        let corpus = self.corpus.load(&mut rng)?;
        let mut generator = PoemGenerator::new(
            self.parser.as_ref(),
            self.scorer.as_ref(),
            self.expander.as_ref(),
            &self.config,
        );

        // 1. Learn
        if generator.learn_corpus(&corpus) == 0 {
            return Err(PipelineError::EmptyCorpus);
        }
        generator.learn_themes(themes);

        // 2. Draft and cover themes
        let mut poem = generator.generate_poem(num_sentences, themes, &mut rng)?;
        generator.improve_poem_themes(&mut poem, &mut rng)?;

        // 3. Push sentiment a little past where the draft already is
        let goal = sentiment_goal(generator.evaluate_sentiment(&poem), &self.config);
        let rounds = generator.improve_poem_sentiment(&mut poem, goal, &mut rng);

        // 4. Reformat and rename
        generator.reformat_poem(&mut poem, &mut rng);
        info!(
            "generated '{}' ({} sentences, {} sentiment rounds)",
            poem.name,
            poem.num_sentences(),
            rounds
        );
        Ok(PoemOutcome::Poem(poem))
    }
}

impl PoemEngineBuilder {
    pub fn with_parser(mut self, parser: impl DependencyParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn with_scorer(mut self, scorer: impl SentimentScorer + 'static) -> Self {
        self.scorer = Some(Box::new(scorer));
        self
    }

    pub fn with_expander(mut self, expander: impl ContractionExpander + 'static) -> Self {
        self.expander = Some(Box::new(expander));
        self
    }

    pub fn with_corpus(mut self, corpus: impl CorpusSource + 'static) -> Self {
        self.corpus = Some(Box::new(corpus));
        self
    }

    pub fn with_theme_source(mut self, themes: impl ThemeSource + 'static) -> Self {
        self.themes = Some(Box::new(themes));
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Read `*.txt` files from `path`, sampling `corpus_sample` per session.
    pub fn corpus_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.corpus_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Fixed themes, normalized and capped at `max_themes`.
    pub fn themes(mut self, themes: &[&str]) -> Self {
        self.fixed_themes = themes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Load the sentiment lexicon from a RON file instead of the built-in one.
    pub fn lexicon(mut self, path: impl AsRef<Path>) -> Self {
        self.lexicon_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<PoemEngine, PipelineError> {
        // File config overrides an in-memory one
        let config = match self.config_path {
            Some(ref path) => GeneratorConfig::load_from_ron(path)?,
            None => self.config.unwrap_or_default(),
        };
        config.validate()?;

        let scorer: Box<dyn SentimentScorer> = match (self.scorer, self.lexicon_path) {
            (Some(scorer), _) => scorer,
            (None, Some(path)) => Box::new(LexiconScorer::load_from_ron(&path)?),
            (None, None) => Box::new(LexiconScorer::default()),
        };

        let corpus: Box<dyn CorpusSource> = match (self.corpus, self.corpus_dir) {
            (Some(corpus), _) => corpus,
            (None, Some(dir)) => Box::new(DirectoryCorpus::new(dir).sample(config.corpus_sample)),
            (None, None) => Box::new(StaticCorpus::new()),
        };

        let themes = self
            .themes
            .unwrap_or_else(|| Box::new(FixedThemes::new(&self.fixed_themes, config.max_themes)));

        Ok(PoemEngine {
            parser: self.parser.unwrap_or_else(|| Box::new(HeuristicParser)),
            scorer,
            expander: self
                .expander
                .unwrap_or_else(|| Box::new(ContractionTable::default())),
            corpus,
            themes,
            config,
            seed: self.seed,
            generation_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DetectedThemes, Detection};

    const CORPUS: &str = "The old dog slept in the warm sun.\n\
        A small bird sang to the cold sea.\n\
        The cat sat on the soft bed.\n\
        We walked along the quiet road at night.";

    fn build_test_engine(seed: u64) -> PoemEngine {
        PoemEngine::builder()
            .seed(seed)
            .with_corpus(StaticCorpus::new().with_text("test", CORPUS))
            .themes(&["dog", "moon"])
            .build()
            .unwrap()
    }

    #[test]
    fn run_produces_poem() {
        let mut engine = build_test_engine(42);
        let outcome = engine.run().unwrap();
        let poem = outcome.poem().expect("expected a poem");
        assert_eq!(poem.num_sentences(), 5);
        assert_eq!(poem.text.lines().count(), 5);
        assert!(!outcome.name().is_empty());
        assert_eq!(poem.themes, vec!["dog".to_string(), "moon".to_string()]);
    }

    #[test]
    fn same_seed_same_poem() {
        let a = build_test_engine(7).run().unwrap();
        let b = build_test_engine(7).run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let first = build_test_engine(1).run().unwrap();
        let found_different = (2..30).any(|seed| build_test_engine(seed).run().unwrap() != first);
        assert!(found_different, "expected different output with different seeds");
    }

    #[test]
    fn successive_runs_advance_the_seed() {
        let mut engine = build_test_engine(11);
        let first = engine.run().unwrap();
        let outputs: Vec<PoemOutcome> = (0..5).map(|_| engine.run().unwrap()).collect();
        assert!(outputs.iter().any(|o| *o != first));
    }

    #[test]
    fn no_themes_is_the_sentinel() {
        let mut engine = PoemEngine::builder()
            .seed(0)
            .with_corpus(StaticCorpus::new().with_text("test", CORPUS))
            .build()
            .unwrap();
        let outcome = engine.run().unwrap();
        assert_eq!(outcome, PoemOutcome::NoImages);
        assert_eq!(outcome.name(), "temp");
        assert_eq!(outcome.text(), "*NO IMAGES*");

        let outcome = engine.generate(3, &[]).unwrap();
        assert_eq!(outcome.text(), "*NO IMAGES*");
    }

    #[test]
    fn low_confidence_detections_are_the_sentinel() {
        let mut engine = PoemEngine::builder()
            .with_corpus(StaticCorpus::new().with_text("test", CORPUS))
            .with_theme_source(DetectedThemes::new(vec![Detection::new("dog", 0.3)], 5))
            .build()
            .unwrap();
        assert_eq!(engine.run().unwrap(), PoemOutcome::NoImages);
    }

    #[test]
    fn empty_corpus_is_an_error() {
        let mut engine = PoemEngine::builder().seed(0).themes(&["dog"]).build().unwrap();
        assert!(matches!(engine.run(), Err(PipelineError::EmptyCorpus)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GeneratorConfig {
            any_word_probability: 2.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            PoemEngine::builder().with_config(config).build(),
            Err(PipelineError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn builder_with_seed() {
        let engine = PoemEngine::builder().seed(12345).build().unwrap();
        assert_eq!(engine.seed, Some(12345));
        assert_eq!(engine.config().num_sentences, 5);
    }
}
