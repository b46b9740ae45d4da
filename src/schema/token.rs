use serde::{Deserialize, Serialize};

/// Dependency label carried by the root of every parsed sentence.
pub const ROOT_DEP: &str = "ROOT";

/// A single parsed token. Tree links are indices into the owning
/// [`ParsedSentence`]'s token arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as it appeared in the parsed text.
    pub text: String,
    /// Lowercased surface form.
    pub lower: String,
    /// Penn Treebank part-of-speech tag (`NN`, `VBD`, `HYPH`, ...).
    pub tag: String,
    /// Dependency label relative to the head (`ROOT` for the root).
    pub dep: String,
    /// Index of the head token; `None` only for the root.
    pub head: Option<usize>,
    /// Indices of child tokens, in sentence order.
    pub children: Vec<usize>,
}

impl Token {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            lower: text.to_lowercase(),
            text,
            tag: tag.into(),
            dep: String::new(),
            head: None,
            children: Vec::new(),
        }
    }
}

/// A sentence produced by a parser: its text, its tokens and the index
/// of the dependency root.
///
/// The generator only ever reads these trees; substitutions are made on
/// separate token sequences copied out of [`ParsedSentence::surface_forms`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSentence {
    pub text: String,
    pub tokens: Vec<Token>,
    pub root: usize,
}

impl ParsedSentence {
    pub fn root_token(&self) -> &Token {
        &self.tokens[self.root]
    }

    pub fn token(&self, index: usize) -> &Token {
        &self.tokens[index]
    }

    /// Children of the token at `index`, as `(child_index, child)` pairs.
    pub fn children(&self, index: usize) -> impl Iterator<Item = (usize, &Token)> + '_ {
        self.tokens[index]
            .children
            .iter()
            .map(move |&c| (c, &self.tokens[c]))
    }

    /// Surface forms of all tokens in order.
    pub fn surface_forms(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.text.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_sat() -> ParsedSentence {
        let mut the = Token::new("The", "DT");
        the.dep = "det".to_string();
        the.head = Some(1);
        let mut cat = Token::new("cat", "NN");
        cat.dep = "nsubj".to_string();
        cat.head = Some(2);
        cat.children = vec![0];
        let mut sat = Token::new("sat", "VBD");
        sat.dep = ROOT_DEP.to_string();
        sat.children = vec![1, 3];
        let mut stop = Token::new(".", ".");
        stop.dep = "punct".to_string();
        stop.head = Some(2);

        ParsedSentence {
            text: "The cat sat .".to_string(),
            tokens: vec![the, cat, sat, stop],
            root: 2,
        }
    }

    #[test]
    fn token_lowercases() {
        let t = Token::new("Moon", "NNP");
        assert_eq!(t.lower, "moon");
        assert_eq!(t.text, "Moon");
    }

    #[test]
    fn children_follow_indices() {
        let s = cat_sat();
        assert_eq!(s.root_token().text, "sat");
        let kids: Vec<&str> = s.children(s.root).map(|(_, t)| t.text.as_str()).collect();
        assert_eq!(kids, vec!["cat", "."]);
        assert_eq!(s.surface_forms(), vec!["The", "cat", "sat", "."]);
    }
}
