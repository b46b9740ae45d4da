/// Corpus sources: in-memory texts and directories of `.txt` files.

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::RngCore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::CorpusSource;

/// Source name to raw text.
pub type Corpus = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no .txt files in {0}")]
    Empty(PathBuf),
}

/// Texts held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCorpus {
    texts: Corpus,
}

impl StaticCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(name.into(), text.into());
        self
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl CorpusSource for StaticCorpus {
    fn load(&self, _rng: &mut dyn RngCore) -> Result<Corpus, CorpusError> {
        Ok(self.texts.clone())
    }
}

/// Every `.txt` file of a directory, optionally a random sample of them.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    dir: PathBuf,
    sample: usize,
}

impl DirectoryCorpus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sample: 0,
        }
    }

    /// Load at most `count` files per session, chosen at random. 0 loads all.
    pub fn sample(mut self, count: usize) -> Self {
        self.sample = count;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn text_files(&self) -> Result<Vec<PathBuf>, CorpusError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("txt") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl CorpusSource for DirectoryCorpus {
    fn load(&self, rng: &mut dyn RngCore) -> Result<Corpus, CorpusError> {
        let files = self.text_files()?;
        if files.is_empty() {
            return Err(CorpusError::Empty(self.dir.clone()));
        }

        let chosen: Vec<&PathBuf> = if self.sample > 0 && self.sample < files.len() {
            files.choose_multiple(rng, self.sample).collect()
        } else {
            files.iter().collect()
        };

        let mut corpus = Corpus::new();
        for path in chosen {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown")
                .to_string();
            debug!("reading corpus file {}", path.display());
            corpus.insert(name, std::fs::read_to_string(path)?);
        }
        info!(
            "loaded {} of {} corpus files from {}",
            corpus.len(),
            files.len(),
            self.dir.display()
        );
        Ok(corpus)
    }
}
