/// Sentiment revision: nudging word choices toward polarity and
/// subjectivity goals.

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::config::GeneratorConfig;
use crate::core::lexicon::{KnowledgeBase, SentimentAxis};
use crate::nlp::{DependencyParser, Sentiment, SentimentScorer};
use crate::schema::poem::Poem;

/// Mean of the per-sentence scores. Neutral for a poem with no sentences.
pub fn evaluate_sentiment(poem: &Poem, scorer: &dyn SentimentScorer) -> Sentiment {
    let n = poem.num_sentences();
    if n == 0 {
        return Sentiment::default();
    }
    let (polarity, subjectivity) = poem
        .sentences
        .iter()
        .map(|s| scorer.score(&s.text))
        .fold((0.0, 0.0), |(p, s), x| (p + x.polarity, s + x.subjectivity));
    Sentiment {
        polarity: polarity / n as f64,
        subjectivity: subjectivity / n as f64,
    }
}

/// Goal per axis: `(average + offset) * scale`.
pub fn sentiment_goal(average: Sentiment, config: &GeneratorConfig) -> Sentiment {
    Sentiment {
        polarity: (average.polarity + config.goal_offset) * config.goal_scale,
        subjectivity: (average.subjectivity + config.goal_offset) * config.goal_scale,
    }
}

pub struct SentimentReviser<'a> {
    kb: &'a KnowledgeBase,
    parser: &'a dyn DependencyParser,
    scorer: &'a dyn SentimentScorer,
    max_rounds: u32,
    max_tag_retries: u32,
}

impl<'a> SentimentReviser<'a> {
    pub fn new(
        kb: &'a KnowledgeBase,
        parser: &'a dyn DependencyParser,
        scorer: &'a dyn SentimentScorer,
        config: &GeneratorConfig,
    ) -> Self {
        Self {
            kb,
            parser,
            scorer,
            max_rounds: config.sentiment_rounds,
            max_tag_retries: config.max_tag_retries,
        }
    }

    /// Swap one random word for a same-tag word that scores strictly higher
    /// on `axis` (when `current_average` is positive) or strictly lower
    /// (otherwise). Returns whether a word was replaced.
    pub fn improve_word<R: Rng + ?Sized>(
        &self,
        tokens: &mut [String],
        axis: SentimentAxis,
        current_average: f64,
        rng: &mut R,
    ) -> bool {
        if tokens.is_empty() {
            return false;
        }
        let seek_higher = current_average > 0.0;

        let mut picked = None;
        for _ in 0..self.max_tag_retries {
            let idx = rng.gen_range(0..tokens.len());
            if let Some(tag) = self.parser.tag_word(&tokens[idx]) {
                if self.kb.has_tag(&tag) {
                    picked = Some((idx, tag));
                    break;
                }
            }
        }
        let Some((idx, tag)) = picked else {
            warn!("no token with a known tag after {} tries", self.max_tag_retries);
            return false;
        };

        let current = tokens[idx].to_lowercase();
        let Some(current_score) = self.kb.sentiment(axis, &current) else {
            return false;
        };
        let better: Vec<&String> = self
            .kb
            .words_with_tag(&tag)
            .iter()
            .filter(|w| {
                self.kb.sentiment(axis, w).is_some_and(|score| {
                    if seek_higher {
                        score > current_score
                    } else {
                        score < current_score
                    }
                })
            })
            .collect();

        match better.choose(rng) {
            Some(word) => {
                debug!("{:?}: '{}' -> '{}'", axis, tokens[idx], word);
                tokens[idx] = (*word).clone();
                true
            }
            None => false,
        }
    }

    /// Revise `poem` until both average magnitudes reach the goal
    /// magnitudes or the round cap is hit. Returns the rounds spent.
    pub fn improve_poem_sentiment<R: Rng + ?Sized>(
        &self,
        poem: &mut Poem,
        goal: Sentiment,
        rng: &mut R,
    ) -> u32 {
        if poem.sentences.is_empty() {
            return 0;
        }
        let mut rounds = 0;
        while rounds < self.max_rounds {
            let average = evaluate_sentiment(poem, self.scorer);
            if average.polarity.abs() >= goal.polarity.abs()
                && average.subjectivity.abs() >= goal.subjectivity.abs()
            {
                break;
            }
            rounds += 1;

            let i = rng.gen_range(0..poem.sentences.len());
            let sentence = &mut poem.sentences[i];
            if self.improve_word(&mut sentence.tokens, SentimentAxis::Polarity, average.polarity, rng) {
                sentence.rejoin();
            }

            let j = rng.gen_range(0..poem.sentences.len());
            let sentence = &mut poem.sentences[j];
            if self.improve_word(
                &mut sentence.tokens,
                SentimentAxis::Subjectivity,
                average.subjectivity,
                rng,
            ) {
                sentence.rejoin();
            }

            poem.join_list_to_text();
        }
        debug!("sentiment revision finished after {} rounds", rounds);
        rounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{HeuristicParser, LexiconScorer};
    use crate::schema::poem::Sentence;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn kb() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        kb.record_word("good", "JJ", 0.7, 0.6);
        kb.record_word("great", "JJ", 0.8, 0.75);
        kb.record_word("bad", "JJ", -0.7, 0.667);
        kb.record_word("cat", "NN", 0.0, 0.0);
        kb
    }

    fn sentence(text: &str) -> Sentence {
        Sentence::from_tokens(text.split_whitespace().map(str::to_string).collect(), "")
    }

    #[test]
    fn average_over_sentences() {
        let scorer = LexiconScorer::default();
        let poem = Poem::new("", vec![], vec![sentence("good"), sentence("cat")]);
        let avg = evaluate_sentiment(&poem, &scorer);
        assert!((avg.polarity - 0.35).abs() < 1e-9);
        assert!((avg.subjectivity - 0.3).abs() < 1e-9);
        assert_eq!(evaluate_sentiment(&Poem::new("", vec![], vec![]), &scorer), Sentiment::default());
    }

    #[test]
    fn goal_formula() {
        let goal = sentiment_goal(
            Sentiment {
                polarity: 0.2,
                subjectivity: 0.0,
            },
            &GeneratorConfig::default(),
        );
        assert!((goal.polarity - 0.21 * 1.05).abs() < 1e-12);
        assert!((goal.subjectivity - 0.01 * 1.05).abs() < 1e-12);
    }

    #[test]
    fn positive_average_seeks_higher_scores() {
        let kb = kb();
        let scorer = LexiconScorer::default();
        let config = GeneratorConfig::default();
        let reviser = SentimentReviser::new(&kb, &HeuristicParser, &scorer, &config);
        let mut rng = StdRng::seed_from_u64(0);

        let mut tokens = vec!["good".to_string()];
        assert!(reviser.improve_word(&mut tokens, SentimentAxis::Polarity, 0.5, &mut rng));
        assert_eq!(tokens, vec!["great"]);

        // Nothing scores above "great".
        assert!(!reviser.improve_word(&mut tokens, SentimentAxis::Polarity, 0.5, &mut rng));
        assert_eq!(tokens, vec!["great"]);
    }

    #[test]
    fn non_positive_average_seeks_lower_scores() {
        let kb = kb();
        let scorer = LexiconScorer::default();
        let config = GeneratorConfig::default();
        let reviser = SentimentReviser::new(&kb, &HeuristicParser, &scorer, &config);
        let mut rng = StdRng::seed_from_u64(0);

        let mut tokens = vec!["good".to_string()];
        assert!(reviser.improve_word(&mut tokens, SentimentAxis::Polarity, -0.1, &mut rng));
        assert_eq!(tokens, vec!["bad"]);

        let mut tokens = vec!["great".to_string()];
        assert!(reviser.improve_word(&mut tokens, SentimentAxis::Subjectivity, 0.0, &mut rng));
        assert!(tokens[0] == "good" || tokens[0] == "bad");
    }

    #[test]
    fn unknown_tags_give_up_after_retries() {
        let kb = kb();
        let scorer = LexiconScorer::default();
        let config = GeneratorConfig::default();
        let reviser = SentimentReviser::new(&kb, &HeuristicParser, &scorer, &config);
        let mut rng = StdRng::seed_from_u64(0);

        let mut tokens = vec!["quickly".to_string(), ".".to_string()];
        assert!(!reviser.improve_word(&mut tokens, SentimentAxis::Polarity, 0.5, &mut rng));
        assert_eq!(tokens, vec!["quickly", "."]);
    }

    #[test]
    fn revision_stops_within_round_cap() {
        let kb = kb();
        let scorer = LexiconScorer::default();
        let config = GeneratorConfig::default();
        let reviser = SentimentReviser::new(&kb, &HeuristicParser, &scorer, &config);
        let mut rng = StdRng::seed_from_u64(4);

        let mut poem = Poem::new("", vec![], vec![sentence("the good cat"), sentence("a cat")]);
        let unreachable = Sentiment {
            polarity: 5.0,
            subjectivity: 5.0,
        };
        let rounds = reviser.improve_poem_sentiment(&mut poem, unreachable, &mut rng);
        assert_eq!(rounds, config.sentiment_rounds);
        assert_eq!(poem.text, poem.sentence_texts().join("\n"));
    }

    #[test]
    fn met_goals_take_no_rounds() {
        let kb = kb();
        let scorer = LexiconScorer::default();
        let config = GeneratorConfig::default();
        let reviser = SentimentReviser::new(&kb, &HeuristicParser, &scorer, &config);
        let mut rng = StdRng::seed_from_u64(4);

        let mut poem = Poem::new("", vec![], vec![sentence("great")]);
        let rounds = reviser.improve_poem_sentiment(&mut poem, Sentiment::default(), &mut rng);
        assert_eq!(rounds, 0);
        assert_eq!(poem.text, "great");
    }
}
