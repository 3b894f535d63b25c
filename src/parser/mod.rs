//! MOF parser
//!
//! This module provides the textual front end:
//! - **logos** for fast lexing
//! - a recursive-descent parser producing a typed AST
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → MofFile (typed AST, trivia dropped)
//!     ↓
//! Repository → validated model objects
//! ```
//!
//! Parsing collects errors instead of aborting, recovering at production
//! boundaries; callers that need all-or-nothing semantics (the compiler)
//! reject any parse with errors.

pub mod ast;
mod error;
mod lexer;
#[allow(clippy::module_inception)]
mod parser;

pub use ast::*;
pub use error::SyntaxError;
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, parse};

/// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
