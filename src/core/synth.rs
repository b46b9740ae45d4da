/// Sentence synthesis: template selection, dependency-guided word
/// substitution, single-word theme injection and poem naming.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::core::config::GeneratorConfig;
use crate::core::lexicon::{KnowledgeBase, Template, TemplateStore};
use crate::nlp::DependencyParser;
use crate::schema::poem::Sentence;
use crate::schema::token::{ParsedSentence, Token};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no words recorded for tag '{0}'")]
    UnknownTag(String),
    #[error("no sentence templates available")]
    NoTemplates,
}

/// Builds new sentences by walking template dependency trees and
/// substituting each node with a grammatically compatible word.
pub struct Synthesizer<'a> {
    kb: &'a KnowledgeBase,
    templates: &'a TemplateStore,
    parser: &'a dyn DependencyParser,
    any_word_probability: f64,
    whitespace_tag: &'a str,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        kb: &'a KnowledgeBase,
        templates: &'a TemplateStore,
        parser: &'a dyn DependencyParser,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            kb,
            templates,
            parser,
            any_word_probability: config.any_word_probability,
            whitespace_tag: &config.whitespace_tag,
        }
    }

    /// Pick a replacement for `child`, whose parent was `original_parent`
    /// in the template and is now `new_parent`.
    ///
    /// With probability `any_word_probability`, or when `new_parent` has
    /// never been seen as a head, any word with the child's tag is taken.
    /// Otherwise the candidates are the words seen under the child's
    /// dependency label below `new_parent` (or below `original_parent`
    /// when `new_parent` never had that label), restricted to the child's
    /// tag; if none survive, any word with the tag is taken.
    pub fn choose_replacement<R: Rng + ?Sized>(
        &self,
        child: &Token,
        original_parent: &str,
        new_parent: &str,
        rng: &mut R,
    ) -> Result<String, GenerateError> {
        let pool = self.kb.words_with_tag(&child.tag);
        let any_of_tag = |rng: &mut R| {
            pool.choose(rng)
                .cloned()
                .ok_or_else(|| GenerateError::UnknownTag(child.tag.clone()))
        };

        if rng.gen_bool(self.any_word_probability) || !self.kb.has_dependency_entry(new_parent) {
            return any_of_tag(rng);
        }

        let candidates = if self.kb.has_dependents(new_parent, &child.dep) {
            self.kb.dependents(new_parent, &child.dep)
        } else {
            self.kb.dependents(original_parent, &child.dep)
        };
        let matching: Vec<&String> = candidates
            .iter()
            .filter(|w| self.kb.tag_contains(&child.tag, w))
            .collect();

        match matching.choose(rng) {
            Some(word) => Ok((*word).clone()),
            None => any_of_tag(rng),
        }
    }

    /// Pick a template uniformly from `candidates`, a filtered subset of the
    /// store. An empty subset falls back to the whole store.
    pub fn get_sentence_template<'t, R: Rng + ?Sized>(
        &'t self,
        candidates: &[&'t Template],
        rng: &mut R,
    ) -> Result<&'t Template, GenerateError> {
        if let Some(template) = candidates.choose(rng) {
            return Ok(*template);
        }
        if !self.templates.is_empty() {
            warn!("no template matched the filter, choosing from all templates");
        }
        self.random_template(rng)
    }

    /// Pick a template uniformly from the whole store.
    pub fn random_template<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<&'a Template, GenerateError> {
        self.templates
            .all()
            .choose(rng)
            .copied()
            .ok_or(GenerateError::NoTemplates)
    }

    /// A random template and a random word sharing its root's tag.
    pub fn random_template_and_root<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<(&Template, String), GenerateError> {
        let template = self.random_template(rng)?;
        let root_word = self.random_word_with_tag(template.root_tag(), rng)?;
        Ok((template, root_word))
    }

    pub fn random_word_with_tag<R: Rng + ?Sized>(
        &self,
        tag: &str,
        rng: &mut R,
    ) -> Result<String, GenerateError> {
        self.kb
            .words_with_tag(tag)
            .choose(rng)
            .cloned()
            .ok_or_else(|| GenerateError::UnknownTag(tag.to_string()))
    }

    pub fn templates(&self) -> &'a TemplateStore {
        self.templates
    }

    /// Tag of a theme word parsed on its own.
    pub fn tag_of(&self, word: &str) -> Option<String> {
        self.parser.tag_word(word)
    }

    /// Regenerate `template` with `new_root_word` at its root, substituting
    /// every other node.
    pub fn generate_from_root<R: Rng + ?Sized>(
        &self,
        template: &Template,
        new_root_word: &str,
        rng: &mut R,
    ) -> Result<Sentence, GenerateError> {
        self.generate_with_theme(template, new_root_word, &[], rng)
    }

    /// Like [`Synthesizer::generate_from_root`], but children whose text is
    /// one of `themes` keep their word. Their descendants are still
    /// substituted.
    pub fn generate_with_theme<R: Rng + ?Sized>(
        &self,
        template: &Template,
        new_root_word: &str,
        themes: &[String],
        rng: &mut R,
    ) -> Result<Sentence, GenerateError> {
        let mut tokens = template.token_list();
        self.substitute(
            &template.sentence,
            template.root(),
            new_root_word,
            themes,
            &mut tokens,
            rng,
        )?;
        debug!("'{}' -> '{}'", template.text, tokens.join(" "));
        Ok(Sentence::from_tokens(tokens, template.text.clone()))
    }

    fn substitute<R: Rng + ?Sized>(
        &self,
        sentence: &ParsedSentence,
        node: usize,
        new_word: &str,
        protected: &[String],
        tokens: &mut [String],
        rng: &mut R,
    ) -> Result<(), GenerateError> {
        tokens[node] = new_word.to_string();
        let original = &sentence.token(node).text;

        for (child_index, child) in sentence.children(node) {
            if child.tag == self.whitespace_tag {
                continue;
            }
            if protected.contains(&child.text) {
                self.substitute(sentence, child_index, &child.text, protected, tokens, rng)?;
                continue;
            }
            let replacement = self.choose_replacement(child, original, new_word, rng)?;
            self.substitute(sentence, child_index, &replacement, protected, tokens, rng)?;
        }
        Ok(())
    }

    /// Replace the first token tagged `theme_tag` that is not itself one of
    /// `protected` with `theme_word`. Returns whether a token was replaced.
    pub fn add_theme_to_sentence(
        &self,
        theme_word: &str,
        theme_tag: &str,
        protected: &[String],
        sentence: &mut Sentence,
    ) -> bool {
        let tags = self.token_tags(&sentence.tokens);
        let position = tags
            .iter()
            .zip(sentence.tokens.iter())
            .position(|(tag, word)| tag.as_deref() == Some(theme_tag) && !protected.contains(word));

        match position {
            Some(idx) => {
                sentence.tokens[idx] = theme_word.to_string();
                sentence.rejoin();
                true
            }
            None => false,
        }
    }

    /// One tag per token. The joined sentence is re-parsed so tags see their
    /// context; when that does not split back into the same tokens (a token
    /// holding several words, such as "teddy bears"), each token is tagged
    /// on its own.
    fn token_tags(&self, tokens: &[String]) -> Vec<Option<String>> {
        let parsed: Vec<String> = self
            .parser
            .parse(&tokens.join(" "))
            .into_iter()
            .flat_map(|s| s.tokens)
            .map(|t| t.tag)
            .collect();
        if parsed.len() == tokens.len() {
            parsed.into_iter().map(Some).collect()
        } else {
            tokens.iter().map(|t| self.parser.tag_word(t)).collect()
        }
    }
}

/// A random contiguous run of 1 to `max_words` words from a random
/// sentence. Empty when there is nothing to draw from.
pub fn name_poem<R: Rng + ?Sized>(sentences: &[Sentence], max_words: usize, rng: &mut R) -> String {
    let Some(sentence) = sentences.choose(rng) else {
        return String::new();
    };
    let len = sentence.tokens.len();
    if len == 0 {
        return String::new();
    }
    let name_len = rng.gen_range(1..=len.min(max_words.max(1)));
    let start = rng.gen_range(0..=len - name_len);
    sentence.tokens[start..start + name_len].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_capture;
    use crate::nlp::{HeuristicParser, LexiconScorer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn learn(text: &str) -> (KnowledgeBase, TemplateStore) {
        let scorer = LexiconScorer::default();
        let mut kb = KnowledgeBase::new();
        let mut store = TemplateStore::new();
        for sentence in HeuristicParser.parse(text) {
            kb.learn_sentence(&sentence, &scorer);
            store.push(Template {
                text: sentence.text.clone(),
                sentence,
            });
        }
        (kb, store)
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn single_template_regenerates_itself() {
        let (kb, store) = learn("the cat sat .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let template = synth.get_sentence_template(&store.all(), &mut rng).unwrap();
            let s = synth.generate_from_root(template, "sat", &mut rng).unwrap();
            assert_eq!(s.text, "the cat sat .");
            assert_eq!(s.template, "the cat sat .");
        }
    }

    #[test]
    fn unknown_root_word_still_substitutes_by_tag() {
        let (kb, store) = learn("the cat sat .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(7);
        let template = store.all()[0];
        let s = synth.generate_from_root(template, "zebra", &mut rng).unwrap();
        assert_eq!(s.tokens, words("the cat zebra ."));
    }

    #[test]
    fn substitution_preserves_length_and_tags() {
        let (kb, store) = learn(
            "the old dog slept in the warm sun . a small bird sang to the cold sea . \
             the cat sat on the soft bed .",
        );
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let (template, root) = synth.random_template_and_root(&mut rng).unwrap();
            let s = synth.generate_from_root(template, &root, &mut rng).unwrap();
            assert_eq!(s.tokens.len(), template.sentence.len());
            for (word, token) in s.tokens.iter().zip(&template.sentence.tokens) {
                assert!(
                    kb.tag_contains(&token.tag, word),
                    "'{}' is not a {} word",
                    word,
                    token.tag
                );
            }
        }
    }

    #[test]
    fn theme_children_stay_in_place() {
        let (kb, store) = learn("the cat sat . a cat ran .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let themes = vec!["cat".to_string()];
        let mut rng = StdRng::seed_from_u64(3);
        let template = store.containing("cat")[0];
        assert_eq!(template.text, "the cat sat .");

        let mut determiners = Vec::new();
        for _ in 0..40 {
            let root = synth.random_word_with_tag(template.root_tag(), &mut rng).unwrap();
            let s = synth.generate_with_theme(template, &root, &themes, &mut rng).unwrap();
            assert_eq!(s.tokens[1], "cat");
            assert_eq!(s.tokens.len(), 4);
            determiners.push(s.tokens[0].clone());
        }
        // The determiner hangs off the kept theme word and is still replaced.
        assert!(determiners.iter().all(|d| d == "the" || d == "a"));
        assert!(determiners.iter().any(|d| d == "a"));
        assert!(determiners.iter().any(|d| d == "the"));
    }

    #[test]
    fn empty_tag_is_an_error() {
        let (kb, store) = learn("the cat sat .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(0);
        let orphan = Token::new("quickly", "RB");
        let err = synth.choose_replacement(&orphan, "sat", "sat", &mut rng).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownTag(tag) if tag == "RB"));
    }

    #[test]
    fn empty_store_has_no_templates() {
        let kb = KnowledgeBase::new();
        let store = TemplateStore::new();
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            synth.get_sentence_template(&[], &mut rng),
            Err(GenerateError::NoTemplates)
        ));
    }

    #[test]
    fn add_theme_replaces_first_matching_tag_only() {
        let (kb, store) = learn("the cat saw the bird .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);

        let mut s = Sentence::from_tokens(words("the cat saw the bird ."), "");
        assert!(synth.add_theme_to_sentence("dog", "NN", &[], &mut s));
        assert_eq!(s.text, "the dog saw the bird .");

        let mut s = Sentence::from_tokens(words("the cat saw the bird ."), "");
        let protected = vec!["cat".to_string()];
        assert!(synth.add_theme_to_sentence("dog", "NN", &protected, &mut s));
        assert_eq!(s.text, "the cat saw the dog .");
    }

    #[test]
    fn add_theme_skips_past_multi_word_tokens() {
        let (kb, store) = learn("the cat saw the bird .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);

        let tokens = vec!["the", "teddy bears", "saw", "the", "bird", "."];
        let mut s = Sentence::from_tokens(tokens.iter().map(|t| t.to_string()).collect(), "");
        let protected = vec!["teddy bears".to_string(), "dog".to_string()];
        assert!(synth.add_theme_to_sentence("dog", "NN", &protected, &mut s));
        assert_eq!(s.tokens, vec!["the", "teddy bears", "saw", "the", "dog", "."]);
    }

    #[test]
    fn whole_store_pick_does_not_warn() {
        let (kb, store) = learn("the cat sat . the dog ran .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(4);

        let (_, warnings) = log_capture::count_warnings(|| {
            for _ in 0..10 {
                synth.random_template_and_root(&mut rng).unwrap();
            }
        });
        assert_eq!(warnings, 0);

        let (template, warnings) =
            log_capture::count_warnings(|| synth.get_sentence_template(&[], &mut rng).unwrap());
        assert_eq!(warnings, 1);
        assert!(store.all().contains(&template));
    }

    #[test]
    fn add_theme_without_matching_tag_is_noop() {
        let (kb, store) = learn("the cat sat .");
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut s = Sentence::from_tokens(words("the cat sat ."), "");
        assert!(!synth.add_theme_to_sentence("softly", "RB", &[], &mut s));
        assert_eq!(s.text, "the cat sat .");
    }

    #[test]
    fn name_is_contiguous_span() {
        let sentences = vec![Sentence::from_tokens(
            words("one two three four five six seven eight nine ten"),
            "",
        )];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let name = name_poem(&sentences, 8, &mut rng);
            let n = name.split(' ').count();
            assert!((1..=8).contains(&n));
            assert!(sentences[0].text.contains(&name));
        }
        assert_eq!(name_poem(&[], 8, &mut rng), "");
    }
}
