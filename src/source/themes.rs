/// Theme sources: caller-supplied words and object-detector output.

use log::debug;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::ThemeSource;

/// Detections must score above this to count.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.5;

/// Themes given directly by the caller.
#[derive(Debug, Clone, Default)]
pub struct FixedThemes {
    themes: Vec<String>,
}

impl FixedThemes {
    /// Trims and lowercases each theme, drops blanks and repeats, and keeps
    /// at most `max_themes`.
    pub fn new<I, S>(themes: I, max_themes: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = FxHashSet::default();
        let themes = themes
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .take(max_themes)
            .collect();
        Self { themes }
    }
}

impl ThemeSource for FixedThemes {
    fn detect_themes(&self) -> Option<Vec<String>> {
        if self.themes.is_empty() {
            None
        } else {
            Some(self.themes.clone())
        }
    }
}

/// One labelled object from an image detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f64,
}

impl Detection {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Themes derived from raw detector output.
///
/// Detections at or below the score threshold are dropped. A label seen
/// more than once keeps its best score and is pluralized. The best
/// `max_themes` labels are kept, highest score first.
#[derive(Debug, Clone)]
pub struct DetectedThemes {
    detections: Vec<Detection>,
    threshold: f64,
    max_themes: usize,
}

impl DetectedThemes {
    pub fn new(detections: Vec<Detection>, max_themes: usize) -> Self {
        Self {
            detections,
            threshold: DEFAULT_SCORE_THRESHOLD,
            max_themes,
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// `(theme, best score)` pairs, best first.
    pub fn ranked(&self) -> Vec<(String, f64)> {
        // label -> (count, best score), in first-seen order
        let mut grouped: Vec<(String, usize, f64)> = Vec::new();
        for detection in self.detections.iter().filter(|d| d.score > self.threshold) {
            let label = detection.label.trim().to_lowercase();
            if label.is_empty() {
                continue;
            }
            match grouped.iter_mut().find(|(l, _, _)| *l == label) {
                Some((_, count, best)) => {
                    *count += 1;
                    *best = best.max(detection.score);
                }
                None => grouped.push((label, 1, detection.score)),
            }
        }

        let mut ranked: Vec<(String, f64)> = grouped
            .into_iter()
            .map(|(label, count, best)| {
                let theme = if count > 1 { pluralize_label(&label) } else { label };
                (theme, best)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(self.max_themes);
        ranked
    }
}

impl ThemeSource for DetectedThemes {
    fn detect_themes(&self) -> Option<Vec<String>> {
        let ranked = self.ranked();
        debug!("detected themes: {:?}", ranked);
        if ranked.is_empty() {
            None
        } else {
            Some(ranked.into_iter().map(|(theme, _)| theme).collect())
        }
    }
}

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("wolf", "wolves"),
    ("life", "lives"),
    ("ox", "oxen"),
];

const INVARIANT_PLURALS: &[&str] = &["sheep", "deer", "fish", "skis", "scissors", "glasses"];

/// Plural of the last word of a (possibly multi-word) label.
pub fn pluralize_label(label: &str) -> String {
    match label.rsplit_once(' ') {
        Some((head, last)) => format!("{} {}", head, pluralize(last)),
        None => pluralize(label),
    }
}

fn pluralize(word: &str) -> String {
    if INVARIANT_PLURALS.contains(&word) {
        return word.to_string();
    }
    if let Some(&(_, plural)) = IRREGULAR_PLURALS.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| word.ends_with(end)) {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}
