/// Contraction expansion ("don't" -> "do not").

use rustc_hash::FxHashMap;

use super::sentiment::LexiconError;
use super::ContractionExpander;

const DEFAULT_TABLE: &str = include_str!("../../data/contractions.ron");

/// Regular suffixes, longest first so `n't` wins over `'t`-less forms.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("n't", " not"),
    ("'re", " are"),
    ("'ll", " will"),
    ("'ve", " have"),
    ("'m", " am"),
    ("'d", " would"),
];

/// Table-driven expander: irregular forms are looked up, regular
/// suffixes are expanded by rule, everything else passes through.
#[derive(Debug, Clone)]
pub struct ContractionTable {
    irregular: FxHashMap<String, String>,
}

impl ContractionTable {
    pub fn parse_ron(input: &str) -> Result<Self, LexiconError> {
        let raw: FxHashMap<String, String> = ron::from_str(input)?;
        Ok(Self {
            irregular: raw.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect(),
        })
    }

    fn expand_core(&self, core: &str) -> Option<String> {
        let lower = core.to_lowercase();
        if let Some(full) = self.irregular.get(&lower) {
            return Some(full.clone());
        }
        for &(suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = lower.strip_suffix(suffix) {
                if !stem.is_empty() {
                    return Some(format!("{}{}", stem, replacement));
                }
            }
        }
        None
    }
}

impl Default for ContractionTable {
    fn default() -> Self {
        Self::parse_ron(DEFAULT_TABLE).unwrap_or_else(|_| Self {
            irregular: FxHashMap::default(),
        })
    }
}

impl ContractionExpander for ContractionTable {
    fn expand(&self, word: &str) -> String {
        let normalized = word.replace(|c: char| c == '\u{2019}' || c == '\u{2018}', "'");
        // Peel surrounding punctuation, keeping apostrophes that may belong
        // to the contraction itself.
        let start = normalized
            .find(|c: char| c.is_alphanumeric() || c == '\'')
            .unwrap_or(normalized.len());
        let end = normalized
            .rfind(|c: char| c.is_alphanumeric())
            .map_or(start, |i| i + 1);
        if start >= end {
            return word.to_string();
        }
        let (prefix, core, suffix) = (&normalized[..start], &normalized[start..end], &normalized[end..]);

        let Some(mut expanded) = self.expand_core(core) else {
            return word.to_string();
        };
        if core.chars().find(|c| c.is_alphabetic()).is_some_and(char::is_uppercase) {
            if let Some(first) = expanded.chars().next() {
                let upper: String = first.to_uppercase().collect();
                expanded.replace_range(..first.len_utf8(), &upper);
            }
        }
        format!("{}{}{}", prefix, expanded, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_parses() {
        let table = ContractionTable::parse_ron(DEFAULT_TABLE).unwrap();
        assert!(table.irregular.contains_key("won't"));
    }

    #[test]
    fn expands_regular_suffixes() {
        let t = ContractionTable::default();
        assert_eq!(t.expand("don't"), "do not");
        assert_eq!(t.expand("we're"), "we are");
        assert_eq!(t.expand("I'm"), "I am");
        assert_eq!(t.expand("they'll"), "they will");
    }

    #[test]
    fn expands_irregular_forms() {
        let t = ContractionTable::default();
        assert_eq!(t.expand("won't"), "will not");
        assert_eq!(t.expand("can't"), "can not");
        assert_eq!(t.expand("'tis"), "it is");
    }

    #[test]
    fn keeps_punctuation_and_capitalization() {
        let t = ContractionTable::default();
        assert_eq!(t.expand("Don't,"), "Do not,");
        assert_eq!(t.expand("(won't)"), "(will not)");
        assert_eq!(t.expand("it\u{2019}s."), "it is.");
    }

    #[test]
    fn passes_through_plain_words() {
        let t = ContractionTable::default();
        assert_eq!(t.expand("moon"), "moon");
        assert_eq!(t.expand("cat's"), "cat's");
        assert_eq!(t.expand("..."), "...");
    }
}
