//! # Classification
//!
//! Pure, total classification of raw tracking identifiers.

pub mod identifier;

pub use identifier::{classify, classify_with_default, Classification};
