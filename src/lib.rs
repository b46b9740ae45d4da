//! Poem Engine — template-based poem generation.
//!
//! Learns words, part-of-speech tags and dependency patterns from a small
//! corpus of sample poems, then writes new poems by substituting words into
//! parsed sentence skeletons, revising the draft until every theme appears
//! and its sentiment moves past where it started.

pub mod core;
pub mod nlp;
pub mod schema;
pub mod source;

pub use crate::core::config::GeneratorConfig;
pub use crate::core::pipeline::{PipelineError, PoemEngine, PoemEngineBuilder, PoemOutcome};
pub use crate::schema::poem::{Poem, Sentence};
