//! Text analysis for the featurizer.
//!
//! Tokenizers split raw email text into tokens, token filters normalize or
//! drop them, and analyzers chain the two into a reusable pipeline.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
