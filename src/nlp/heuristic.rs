/// Rule-based English parser: tokenization, Penn Treebank tagging and
/// head-rule dependency attachment.
///
/// This is not a statistical parser. It produces plausible trees for the
/// short, simple sentences found in poetry, which is all the generator
/// needs: consistent tags and a tree rooted at the main verb.

use crate::schema::token::{ParsedSentence, Token, ROOT_DEP};

use super::DependencyParser;

const SENTENCE_ENDERS: &[char] = &['.', '!', '?'];
const PUNCTUATION: &[char] = &[
    '.', '!', '?', ',', ';', ':', '"', '\'', '-', '(', ')', '[', ']', '—', '–', '…',
];
const CLOSERS: &[char] = &['"', '\'', ')', ']'];
/// Clitics that stay one token even when separated from their word.
const CLITICS: &[&str] = &["s", "S", "d", "ll", "re", "ve", "m"];

/// Default parser used when no external parser is injected.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicParser;

impl DependencyParser for HeuristicParser {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        for paragraph in split_paragraphs(text) {
            let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
            let mut start = 0;
            let mut i = 0;
            while i < chars.len() {
                if SENTENCE_ENDERS.contains(&chars[i].1) {
                    let mut end = i + 1;
                    while end < chars.len()
                        && (SENTENCE_ENDERS.contains(&chars[end].1)
                            || CLOSERS.contains(&chars[end].1))
                    {
                        end += 1;
                    }
                    if end == chars.len() || chars[end].1.is_whitespace() {
                        let byte_end = chars.get(end).map_or(paragraph.len(), |c| c.0);
                        push_trimmed(&mut sentences, &paragraph[start..byte_end]);
                        start = byte_end;
                    }
                    i = end;
                    continue;
                }
                i += 1;
            }
            push_trimmed(&mut sentences, &paragraph[start..]);
        }
        sentences
    }

    fn parse(&self, text: &str) -> Vec<ParsedSentence> {
        self.segment(text)
            .into_iter()
            .filter_map(|sentence| {
                let words = tokenize(&sentence);
                if words.is_empty() {
                    return None;
                }
                let tags = tag_tokens(&words);
                let mut tokens: Vec<Token> = words
                    .into_iter()
                    .zip(tags)
                    .map(|(w, t)| Token::new(w, t))
                    .collect();
                let root = attach(&mut tokens);
                Some(ParsedSentence {
                    text: sentence,
                    tokens,
                    root,
                })
            })
            .collect()
    }
}

fn push_trimmed(out: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Split at blank lines.
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Split on whitespace and separate punctuation into individual tokens.
/// An apostrophe inside a word starts a clitic token (`cat's` -> `cat`, `'s`),
/// and a free-standing clitic such as `'s` is kept whole.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        let mut remaining = word;
        let mut at_word_start = true;
        while let Some(first) = remaining.chars().next() {
            if first == '\'' {
                let rest = &remaining[1..];
                let run = rest
                    .find(|c: char| !c.is_alphabetic())
                    .unwrap_or(rest.len());
                if run > 0 && (!at_word_start || CLITICS.contains(&&rest[..run])) {
                    tokens.push(remaining[..run + 1].to_string());
                    remaining = &remaining[run + 1..];
                    at_word_start = false;
                    continue;
                }
            }
            if PUNCTUATION.contains(&first) {
                tokens.push(first.to_string());
                remaining = &remaining[first.len_utf8()..];
                at_word_start = false;
                continue;
            }
            match remaining.find(|c: char| PUNCTUATION.contains(&c)) {
                Some(pos) => {
                    tokens.push(remaining[..pos].to_string());
                    remaining = &remaining[pos..];
                    at_word_start = false;
                }
                None => {
                    tokens.push(remaining.to_string());
                    break;
                }
            }
        }
    }
    tokens
}

fn punct_tag(token: &str) -> Option<&'static str> {
    let tag = match token {
        "." | "!" | "?" => ".",
        "," => ",",
        ":" | ";" | "—" | "–" | "…" => ":",
        "-" => "HYPH",
        "(" | "[" => "-LRB-",
        ")" | "]" => "-RRB-",
        "\"" | "'" => "''",
        _ => return None,
    };
    Some(tag)
}

fn closed_class_tag(lower: &str) -> Option<&'static str> {
    let tag = match lower {
        "the" | "a" | "an" | "this" | "that" | "these" | "those" | "every" | "each" | "some"
        | "any" | "no" | "another" | "either" | "neither" => "DT",
        "all" | "both" | "half" => "PDT",
        "i" | "you" | "he" | "she" | "it" | "we" | "they" | "me" | "him" | "us" | "them"
        | "myself" | "yourself" | "himself" | "herself" | "itself" | "ourselves"
        | "themselves" | "thee" | "thou" | "one" => "PRP",
        "my" | "your" | "his" | "her" | "its" | "our" | "their" | "thy" | "thine" => "PRP$",
        "in" | "on" | "at" | "of" | "from" | "with" | "by" | "for" | "into" | "onto" | "over"
        | "under" | "through" | "across" | "beneath" | "above" | "upon" | "like" | "as"
        | "after" | "before" | "between" | "toward" | "towards" | "without" | "within"
        | "against" | "among" | "around" | "behind" | "beyond" | "during" | "since"
        | "until" | "till" | "near" | "below" | "beside" | "along" | "past" | "off"
        | "if" | "because" | "while" | "though" | "although" | "than" | "whether" => "IN",
        "to" => "TO",
        "and" | "or" | "but" | "nor" | "yet" => "CC",
        "can" | "could" | "will" | "would" | "shall" | "should" | "may" | "might" | "must"
        | "'d" | "'ll" => "MD",
        "is" | "has" | "does" => "VBZ",
        "'s" => "POS",
        "am" | "are" | "have" | "do" | "'re" | "'m" | "'ve" => "VBP",
        "was" | "were" | "had" | "did" => "VBD",
        "be" => "VB",
        "been" => "VBN",
        "being" => "VBG",
        "not" | "never" | "very" | "too" | "also" | "always" | "often" | "still" | "just"
        | "now" | "then" | "here" | "there" | "soon" | "ever" | "only" | "again"
        | "forever" | "so" | "once" | "away" | "down" | "up" | "out" | "back" | "together"
        | "alone" | "almost" | "even" | "n't" => "RB",
        "when" | "where" | "why" | "how" => "WRB",
        "who" | "what" | "whom" => "WP",
        "which" | "whose" => "WDT",
        "oh" | "o" | "ah" | "alas" | "yes" => "UH",
        "zero" | "two" | "three" | "four" | "five" | "six" | "seven" | "eight" | "nine"
        | "ten" | "hundred" | "thousand" => "CD",
        _ => return None,
    };
    Some(tag)
}

fn open_class_tag(lower: &str) -> Option<&'static str> {
    let tag = match lower {
        "sat" | "ran" | "came" | "went" | "saw" | "made" | "fell" | "grew" | "knew" | "took"
        | "gave" | "found" | "told" | "felt" | "left" | "stood" | "sang" | "spoke" | "wrote"
        | "flew" | "rose" | "broke" | "lay" | "said" | "heard" | "thought" | "brought"
        | "held" | "kept" | "slept" | "wept" | "swept" | "drank" | "ate" | "began" | "sank"
        | "shone" | "drew" | "blew" | "threw" | "wore" | "hid" | "met" | "lost" | "sought"
        | "caught" | "taught" | "bore" | "woke" | "ground" | "shook" => "VBD",
        "sing" | "dance" | "fly" | "love" | "know" | "see" | "hear" | "feel" | "dream"
        | "walk" | "run" | "sleep" | "weep" | "cry" | "live" | "die" | "fall" | "rise"
        | "shine" | "burn" | "breathe" | "speak" | "wait" | "stay" | "go" | "come" | "find"
        | "hold" | "keep" | "let" | "make" | "take" | "give" | "tell" | "think" | "want"
        | "wander" | "whisper" | "remember" | "forget" | "leave" | "grow" | "touch" | "hope"
        | "sit" | "stand" | "lie" | "bloom" | "drift" | "fade" | "glow" | "wake" | "bring"
        | "carry" | "follow" | "watch" | "listen" | "pray" | "swim" | "turn" => "VBP",
        "dark" | "old" | "cold" | "bright" | "soft" | "sweet" | "green" | "blue" | "red"
        | "white" | "black" | "deep" | "wild" | "long" | "high" | "little" | "small"
        | "great" | "new" | "good" | "bad" | "sad" | "happy" | "golden" | "silent" | "quiet"
        | "young" | "gentle" | "pale" | "warm" | "grey" | "gray" | "last" | "first"
        | "own" | "other" | "such" | "same" | "whole" | "strange" | "slow"
        | "late" | "early" | "lonely" | "lovely" | "holy" | "ugly" | "silly" | "empty"
        | "heavy" | "open" | "free" | "true" | "fair" | "dead" | "alive" | "bare"
        | "dear" | "tender" | "bitter" | "broken" | "wide" | "far" | "many"
        | "few" | "more" | "most" | "much" | "brown" | "yellow" | "silver" | "sorrowful"
        | "beautiful" | "terrible" | "wonderful" => "JJ",
        "thing" | "nothing" | "something" | "everything" | "anything" | "king" | "ring"
        | "wing" | "spring" | "string" | "morning" | "evening" | "ceiling" | "darling"
        | "bus" | "grass" | "glass" | "kiss" | "moss" | "loss" | "dress" | "chess"
        | "bed" | "seed" | "reed" | "weed" | "shed" | "sled" | "need" | "deed" | "heed"
        | "family" | "lily" | "sky" | "eye" | "mouse" | "house" | "dog" | "cat" => "NN",
        "eyes" | "people" | "children" | "men" | "women" | "mice" | "feet" | "teeth"
        | "geese" | "leaves" | "knives" | "scissors" | "skis" => "NNS",
        _ => return None,
    };
    Some(tag)
}

fn suffix_tag(lower: &str) -> &'static str {
    let len = lower.chars().count();
    if lower.chars().all(|c| c.is_ascii_digit() || c == ',') && len > 0 {
        return "CD";
    }
    if len > 4 && lower.ends_with("ing") {
        return "VBG";
    }
    if len > 4 && lower.ends_with("ed") {
        return "VBD";
    }
    if len > 4 && lower.ends_with("ly") {
        return "RB";
    }
    if len > 5 && lower.ends_with("est") {
        return "JJS";
    }
    const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "less", "ive", "able", "ible", "ish"];
    if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return "JJ";
    }
    if len > 3
        && lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
    {
        return "NNS";
    }
    "NN"
}

fn lexical_tag(word: &str, sentence_initial: bool) -> &'static str {
    if let Some(tag) = punct_tag(word) {
        return tag;
    }
    let lower = word.to_lowercase();
    if let Some(tag) = closed_class_tag(&lower).or_else(|| open_class_tag(&lower)) {
        return tag;
    }
    let tag = suffix_tag(&lower);
    if tag == "NN" && !sentence_initial && word.chars().next().is_some_and(char::is_uppercase) {
        return "NNP";
    }
    tag
}

/// Lexical tags refined by the immediately preceding tag.
fn tag_tokens(words: &[String]) -> Vec<String> {
    let mut tags: Vec<&'static str> = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        let mut tag = lexical_tag(word, i == 0);
        let prev = if i > 0 { Some(tags[i - 1]) } else { None };
        match (prev, tag) {
            (Some("TO" | "MD"), "VBP" | "NN") if is_base_verb(word) => tag = "VB",
            (Some("TO" | "MD"), "VBP") => tag = "VB",
            (Some("DT" | "PRP$" | "JJ" | "IN" | "PDT" | "CD"), "VBP" | "VB") => tag = "NN",
            (Some("DT" | "PRP$"), "VBD") if !word.to_lowercase().ends_with("ed") => tag = "NN",
            _ => {}
        }
        tags.push(tag);
    }
    tags.into_iter().map(str::to_string).collect()
}

fn is_base_verb(word: &str) -> bool {
    open_class_tag(&word.to_lowercase()) == Some("VBP")
}

fn is_punct_tag(tag: &str) -> bool {
    matches!(
        tag,
        "." | "," | ":" | "''" | "``" | "-LRB-" | "-RRB-" | "HYPH" | "NFP"
    )
}

fn is_noun_tag(tag: &str) -> bool {
    tag.starts_with("NN") || tag == "PRP"
}

fn is_verb_tag(tag: &str) -> bool {
    tag.starts_with("VB")
}

fn is_modifier_tag(tag: &str) -> bool {
    matches!(
        tag,
        "DT" | "PDT" | "PRP$" | "JJ" | "JJR" | "JJS" | "CD" | "POS"
    )
}

const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "am", "be", "been", "being", "has", "have", "had", "do", "does",
    "did", "'re", "'m", "'ve",
];

/// Attach every token to a head and return the root index.
fn attach(tokens: &mut [Token]) -> usize {
    let n = tokens.len();
    let tags: Vec<String> = tokens.iter().map(|t| t.tag.clone()).collect();
    let lowers: Vec<String> = tokens.iter().map(|t| t.lower.clone()).collect();

    let next_verb = |from: usize| (from + 1..n).find(|&j| is_verb_tag(&tags[j]));
    let is_aux = |i: usize| {
        if tags[i] == "MD" {
            return true;
        }
        if !AUXILIARIES.contains(&lowers[i].as_str()) {
            return false;
        }
        (i + 1..n)
            .find(|&j| !tags[j].starts_with("RB"))
            .is_some_and(|j| is_verb_tag(&tags[j]))
    };

    let root = (0..n)
        .find(|&i| is_verb_tag(&tags[i]) && !is_aux(i))
        .or_else(|| (0..n).find(|&i| is_noun_tag(&tags[i])))
        .or_else(|| (0..n).find(|&i| !is_punct_tag(&tags[i])))
        .unwrap_or(0);

    let is_content = |j: usize| is_noun_tag(&tags[j]) || (is_verb_tag(&tags[j]) && !is_aux(j));
    let nearest_content_left = |i: usize| (0..i).rev().find(|&j| is_content(j));
    // Head noun of the noun phrase starting after `i`: skip modifiers,
    // then take the last noun of the following run.
    let phrase_head = |i: usize| {
        let mut j = i + 1;
        while j < n && is_modifier_tag(&tags[j]) {
            j += 1;
        }
        if j >= n || !is_noun_tag(&tags[j]) {
            return None;
        }
        while j + 1 < n && tags[j + 1].starts_with("NN") && tags[j].starts_with("NN") {
            j += 1;
        }
        Some(j)
    };

    let mut has_object = false;
    let mut heads: Vec<Option<(usize, &'static str)>> = vec![None; n];

    for i in 0..n {
        if i == root {
            continue;
        }
        let tag = tags[i].as_str();
        let attachment = if is_punct_tag(tag) {
            (root, "punct")
        } else if tag == "MD" || (is_verb_tag(tag) && is_aux(i)) {
            (next_verb(i).unwrap_or(root), "aux")
        } else if tag == "TO" && i + 1 < n && tags[i + 1] == "VB" {
            (i + 1, "aux")
        } else if tag == "IN" || tag == "TO" {
            (nearest_content_left(i).unwrap_or(root), "prep")
        } else if tag == "POS" {
            (if i > 0 { i - 1 } else { root }, "case")
        } else if is_modifier_tag(tag) {
            let label = match tag {
                "DT" | "PDT" => "det",
                "PRP$" => "poss",
                "CD" => "nummod",
                _ => "amod",
            };
            match phrase_head(i) {
                Some(h) => (h, label),
                None if label == "amod" => (root, "acomp"),
                None => (root, "dep"),
            }
        } else if is_noun_tag(tag) {
            let compound_head = if tag.starts_with("NN") && i + 1 < n && tags[i + 1].starts_with("NN")
            {
                let mut j = i + 1;
                while j + 1 < n && tags[j + 1].starts_with("NN") {
                    j += 1;
                }
                Some(j)
            } else {
                None
            };
            if let Some(h) = compound_head {
                (h, "compound")
            } else if i + 1 < n && tags[i + 1] == "POS" {
                (phrase_head(i + 1).unwrap_or(root), "poss")
            } else {
                let governor = (0..i)
                    .rev()
                    .find(|&j| !is_modifier_tag(&tags[j]) && !tags[j].starts_with("NN"));
                match governor {
                    Some(j) if tags[j] == "IN" || (tags[j] == "TO" && tags[j + 1] != "VB") => {
                        (j, "pobj")
                    }
                    Some(j) if tags[j] == "CC" => match (0..j).rev().find(|&k| is_noun_tag(&tags[k])) {
                        Some(k) => (k, "conj"),
                        None => (root, "dep"),
                    },
                    _ if i < root => (root, "nsubj"),
                    _ if is_verb_tag(&tags[root]) && !has_object => {
                        has_object = true;
                        (root, "dobj")
                    }
                    _ => (root, "npadvmod"),
                }
            }
        } else if tag.starts_with("RB") || tag == "WRB" {
            if matches!(lowers[i].as_str(), "not" | "never" | "n't") {
                (next_verb(i).unwrap_or(root), "neg")
            } else if i + 1 < n && tags[i + 1].starts_with("JJ") {
                (i + 1, "advmod")
            } else {
                (root, "advmod")
            }
        } else if is_verb_tag(tag) {
            let prev = (0..i)
                .rev()
                .find(|&j| !tags[j].starts_with("RB") && !(is_verb_tag(&tags[j]) && is_aux(j)) && tags[j] != "MD");
            let left_verb = (0..i)
                .rev()
                .find(|&j| is_verb_tag(&tags[j]) && !is_aux(j));
            match prev {
                Some(j) if tags[j] == "TO" => (left_verb.unwrap_or(root), "xcomp"),
                Some(j) if tags[j] == "CC" => (left_verb.unwrap_or(root), "conj"),
                _ => (root, "advcl"),
            }
        } else if tag == "CC" {
            (nearest_content_left(i).unwrap_or(root), "cc")
        } else if tag == "UH" {
            (root, "intj")
        } else {
            (root, "dep")
        };

        let attachment = if attachment.0 == i { (root, "dep") } else { attachment };
        heads[i] = Some(attachment);
    }

    // Re-attach anything that does not reach the root.
    for i in 0..n {
        if i == root {
            continue;
        }
        let mut current = i;
        let mut steps = 0;
        let reaches_root = loop {
            match heads[current] {
                None => break current == root,
                Some((h, _)) => {
                    current = h;
                    steps += 1;
                    if current == root {
                        break true;
                    }
                    if steps > n {
                        break false;
                    }
                }
            }
        };
        if !reaches_root {
            heads[i] = Some((root, "dep"));
        }
    }

    for (i, token) in tokens.iter_mut().enumerate() {
        match heads[i] {
            Some((h, label)) => {
                token.head = Some(h);
                token.dep = label.to_string();
            }
            None => {
                token.head = None;
                token.dep = ROOT_DEP.to_string();
            }
        }
    }
    for i in 0..n {
        if let Some(h) = tokens[i].head {
            tokens[h].children.push(i);
        }
    }
    root
}
