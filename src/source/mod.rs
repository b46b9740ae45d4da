//! Inputs to a generation session: corpus texts and theme words.

pub mod corpus;
pub mod themes;

pub use corpus::{Corpus, CorpusError, DirectoryCorpus, StaticCorpus};
pub use themes::{Detection, DetectedThemes, FixedThemes};

use rand::RngCore;

/// Supplies the raw texts a session learns from.
pub trait CorpusSource {
    /// Load the texts for one session, keyed by name. Sources that sample
    /// draw from `rng`.
    fn load(&self, rng: &mut dyn RngCore) -> Result<Corpus, CorpusError>;
}

/// Supplies the theme words a poem should be about.
pub trait ThemeSource {
    /// Ordered themes, or `None` when there is no usable input.
    fn detect_themes(&self) -> Option<Vec<String>>;
}
