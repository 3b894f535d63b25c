//! # cimof-base
//!
//! Core library for CIM MOF parsing, object model, and mock-repository queries.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! compiler    → Batch loading of MOF files into a repository
//!   ↓
//! repository  → Qualifier registry, schema model, instance store
//!   ↓
//! parser      → Logos lexer, recursive-descent parser, typed AST
//!   ↓
//! model       → CIM types, values, qualifiers, classes, instances
//!   ↓
//! base        → Primitives (LineCol, LineIndex, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → model → parser → repository → compiler)
// ============================================================================

/// Foundation types: LineCol/LineIndex, TextRange
pub mod base;

/// CIM object model: types, values, qualifiers, classes, instances
pub mod model;

/// Parser: Logos lexer, recursive-descent parser, typed AST
pub mod parser;

/// Repository: qualifier registry, schema model, instance store
pub mod repository;

/// Compiler: batch loading of MOF text and files
pub mod compiler;

/// Model interchange formats: JSON, YAML
#[cfg(feature = "interchange")]
pub mod interchange;

mod error;

pub use error::ModelError;

// Re-export foundation types
pub use base::{LineCol, LineIndex, TextRange, TextSize};

// Re-export the common entry points
pub use compiler::MofCompiler;
pub use repository::{DEFAULT_NAMESPACE, Namespace, Repository};
