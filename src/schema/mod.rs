pub mod poem;
pub mod token;
