/// Theme coverage: which themes a draft already uses, and patching the
/// draft until every theme appears.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::synth::{GenerateError, Synthesizer};
use crate::schema::poem::Poem;

/// Theme presence per poem and per sentence, indexed like `Poem::themes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeCoverage {
    pub in_poem: Vec<bool>,
    pub in_sentences: Vec<Vec<bool>>,
}

impl ThemeCoverage {
    pub fn contains_all(&self) -> bool {
        self.in_poem.iter().all(|&covered| covered)
    }

    /// Indices of sentences containing none of the themes.
    pub fn sentences_without_theme(&self) -> Vec<usize> {
        self.in_sentences
            .iter()
            .enumerate()
            .filter(|(_, themes)| !themes.contains(&true))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Exact token matches of every theme against every sentence.
pub fn check_poem_themes(poem: &Poem) -> ThemeCoverage {
    let in_sentences: Vec<Vec<bool>> = poem
        .sentences
        .iter()
        .map(|s| poem.themes.iter().map(|t| s.contains_token(t)).collect())
        .collect();
    let in_poem = (0..poem.themes.len())
        .map(|i| in_sentences.iter().any(|s| s[i]))
        .collect();
    ThemeCoverage {
        in_poem,
        in_sentences,
    }
}

/// Patch `poem` so each theme appears as a token in some sentence.
///
/// Coverage is computed once up front. Each missing theme first claims a
/// theme-free sentence, regenerated with the theme as its root; once those
/// run out, a random sentence gets the theme injected in place of its first
/// word with the same tag. A later theme may overwrite a sentence patched
/// for an earlier one in the same pass.
pub fn improve_poem_themes<R: Rng + ?Sized>(
    synth: &Synthesizer<'_>,
    poem: &mut Poem,
    rng: &mut R,
) -> Result<(), GenerateError> {
    let coverage = check_poem_themes(poem);
    if coverage.contains_all() || poem.sentences.is_empty() {
        return Ok(());
    }

    let mut theme_free = coverage.sentences_without_theme();
    let themes = poem.themes.clone();

    let missing = themes
        .iter()
        .zip(&coverage.in_poem)
        .filter(|(_, covered)| !**covered)
        .map(|(theme, _)| theme);

    for theme in missing {
        if let Some(&slot) = theme_free.choose(rng) {
            theme_free.retain(|&i| i != slot);
            let template = synth.random_template(rng)?;
            let sentence = synth.generate_from_root(template, theme, rng)?;
            debug!("sentence {} regenerated around theme '{}'", slot, theme);
            poem.sentences[slot] = sentence;
            continue;
        }

        let Some(tag) = synth.tag_of(theme) else {
            warn!("cannot determine a tag for theme '{}', skipping", theme);
            continue;
        };
        let slot = rng.gen_range(0..poem.sentences.len());
        if synth.add_theme_to_sentence(theme, &tag, &themes, &mut poem.sentences[slot]) {
            debug!("theme '{}' injected into sentence {}", theme, slot);
        } else {
            debug!("sentence {} has no {} word for theme '{}'", slot, tag, theme);
        }
    }

    poem.join_list_to_text();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GeneratorConfig;
    use crate::core::lexicon::{KnowledgeBase, Template, TemplateStore};
    use crate::nlp::{DependencyParser, HeuristicParser, LexiconScorer};
    use crate::schema::poem::Sentence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sentence(text: &str) -> Sentence {
        Sentence::from_tokens(text.split_whitespace().map(str::to_string).collect(), text)
    }

    fn learn(text: &str, themes: &[&str]) -> (KnowledgeBase, TemplateStore) {
        let scorer = LexiconScorer::default();
        let mut kb = KnowledgeBase::new();
        let mut store = TemplateStore::new();
        for parsed in HeuristicParser.parse(text) {
            kb.learn_sentence(&parsed, &scorer);
            store.push(Template {
                text: parsed.text.clone(),
                sentence: parsed,
            });
        }
        for theme in themes {
            for parsed in HeuristicParser.parse(theme) {
                kb.learn_theme(&parsed, &scorer);
            }
        }
        (kb, store)
    }

    #[test]
    fn coverage_by_exact_token() {
        let poem = Poem::new(
            "",
            vec!["cat".into(), "sea".into()],
            vec![sentence("the cat sat ."), sentence("the cats ran .")],
        );
        let c = check_poem_themes(&poem);
        assert_eq!(c.in_poem, vec![true, false]);
        assert_eq!(c.in_sentences, vec![vec![true, false], vec![false, false]]);
        assert!(!c.contains_all());
        assert_eq!(c.sentences_without_theme(), vec![1]);
    }

    #[test]
    fn no_themes_is_full_coverage() {
        let poem = Poem::new("", vec![], vec![sentence("the cat sat .")]);
        assert!(check_poem_themes(&poem).contains_all());
    }

    #[test]
    fn missing_theme_regenerates_theme_free_sentence() {
        let (kb, store) = learn("the cat sat .", &["dog"]);
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(5);

        let mut poem = Poem::new("", vec!["dog".into()], vec![sentence("the cat sat .")]);
        improve_poem_themes(&synth, &mut poem, &mut rng).unwrap();
        assert!(poem.sentences[0].contains_token("dog"));
        assert_eq!(poem.text, poem.sentences[0].text);
    }

    #[test]
    fn falls_back_to_injection_when_every_sentence_has_a_theme() {
        let (kb, store) = learn("the cat saw the bird .", &["dog"]);
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(9);

        let mut poem = Poem::new(
            "",
            vec!["cat".into(), "dog".into()],
            vec![sentence("the cat saw the bird .")],
        );
        improve_poem_themes(&synth, &mut poem, &mut rng).unwrap();
        assert_eq!(poem.sentences[0].text, "the cat saw the dog .");
        assert!(check_poem_themes(&poem).contains_all());
    }

    #[test]
    fn later_theme_patches_sentence_regenerated_for_earlier_theme() {
        // One theme-free sentence: "dog" claims it by regeneration, then
        // "bird" finds no free slot left and is injected into the same
        // sentence within the same pass.
        let (kb, store) = learn("the cat saw the fish .", &[]);
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut poem = Poem::new(
                "",
                vec!["dog".into(), "bird".into()],
                vec![sentence("the cat saw the fish .")],
            );
            improve_poem_themes(&synth, &mut poem, &mut rng).unwrap();

            let tokens = &poem.sentences[0].tokens;
            assert_eq!(tokens[2], "dog", "seed {seed}: {tokens:?}");
            assert_eq!(tokens[1], "bird", "seed {seed}: {tokens:?}");
            assert!(check_poem_themes(&poem).contains_all());
        }
    }

    #[test]
    fn coverage_is_a_single_snapshot() {
        // Both themes are missing and there are two theme-free sentences, so
        // each gets regenerated even though the themes are identical.
        let (kb, store) = learn("the cat sat .", &["dog"]);
        let config = GeneratorConfig::default();
        let synth = Synthesizer::new(&kb, &store, &HeuristicParser, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let mut poem = Poem::new(
            "",
            vec!["dog".into(), "dog".into()],
            vec![sentence("the cat sat ."), sentence("the cat sat .")],
        );
        improve_poem_themes(&synth, &mut poem, &mut rng).unwrap();
        assert!(poem.sentences.iter().all(|s| s.contains_token("dog")));
    }
}
