//! # RustKit CSS Parser
//!
//! RustKit-owned CSS tokenizer and stylesheet scanner.
//!
//! ## Overview
//!
//! This crate covers the lexical layer only:
//! - [`tokenize`] turns a value string into [`Token`]s
//! - [`TokenStream`] walks tokens with a rewindable cursor, which is what
//!   property grammars use to implement all-or-nothing parsing
//! - [`parse_stylesheet`] splits a stylesheet into rules and raw declarations
//!
//! Property grammars live in `rustkit-css`.

pub mod stylesheet;
pub mod tokenizer;

pub use stylesheet::{parse_declarations, parse_stylesheet, DeclarationAst, RuleAst, StylesheetAst};
pub use tokenizer::{tokenize, Token, TokenStream};

use thiserror::Error;

/// Errors produced while scanning CSS source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
}
