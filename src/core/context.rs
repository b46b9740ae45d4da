/// Session context: the poems generated so far, keyed by name.

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::schema::poem::{Poem, Sentence};

/// Names of poems generated in one session. Names are unique keys.
#[derive(Debug, Clone, Default)]
pub struct PoemRegistry {
    poems: FxHashMap<String, Poem>,
}

impl PoemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.poems.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Poem> {
        self.poems.get(name)
    }

    /// Store `poem` under its name, replacing any poem already there.
    pub fn insert(&mut self, poem: Poem) {
        self.poems.insert(poem.name.clone(), poem);
    }

    pub fn remove(&mut self, name: &str) -> Option<Poem> {
        self.poems.remove(name)
    }

    pub fn len(&self) -> usize {
        self.poems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poems.is_empty()
    }

    /// Draw names with `draw` until one is unused, up to `max_attempts`
    /// draws. After that the last draw gets the smallest free " (n)" suffix.
    pub fn unique_name<R, F>(
        &self,
        sentences: &[Sentence],
        max_attempts: u32,
        rng: &mut R,
        mut draw: F,
    ) -> String
    where
        R: Rng + ?Sized,
        F: FnMut(&[Sentence], &mut R) -> String,
    {
        let mut name = String::new();
        for _ in 0..max_attempts.max(1) {
            name = draw(sentences, rng);
            if !self.contains(&name) {
                return name;
            }
        }
        (2..)
            .map(|n| format!("{name} ({n})"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or(name)
    }
}
