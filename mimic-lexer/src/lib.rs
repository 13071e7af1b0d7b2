//!
//! The Mimic Lexical Analyser
//! ==========================
//!
//! This crate turns Mimic source text into a stream of tokens for the
//! message-chain parser.
//!

mod lexer;
mod token;

pub use crate::lexer::Lexer;
pub use crate::token::Token;
