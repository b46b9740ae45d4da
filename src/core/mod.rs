pub mod config;
pub mod context;
pub mod coverage;
pub mod format;
pub mod generator;
pub mod lexicon;
pub mod pipeline;
pub mod sentiment;
pub mod synth;

#[cfg(test)]
pub(crate) mod log_capture;
