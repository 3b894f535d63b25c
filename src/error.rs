//! The library error type.
//!
//! Every error a load can produce is reported through [`ModelError`].
//! Loads are all-or-nothing per batch: when any of these surfaces, the
//! target repository is left exactly as it was.

use thiserror::Error;

/// Errors raised while compiling MOF or validating it against the model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Malformed declaration text.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        /// 1-indexed source line.
        line: u32,
        /// 1-indexed source column.
        column: u32,
    },

    /// A qualifier was applied or re-declared without a prior declaration.
    #[error("unknown qualifier: {0}")]
    UnknownQualifier(String),

    /// Re-declaration of a qualifier whose flavor forbids override.
    #[error("qualifier '{0}' is already declared and does not permit override")]
    QualifierRedeclarationConflict(String),

    /// Scope/flavor combination outside the CIM-legal set.
    #[error("illegal scope/flavor on qualifier '{qualifier}': {detail}")]
    IllegalScopeFlavor { qualifier: String, detail: String },

    /// A class named a superclass that is not defined.
    #[error("unknown superclass '{superclass}' for class '{class}'")]
    UnknownSuperclass { class: String, superclass: String },

    /// A subclass changed a qualifier value locked by `DisableOverride`.
    #[error("qualifier '{qualifier}' on '{element}' may not be overridden in class '{class}'")]
    QualifierOverrideViolation {
        class: String,
        element: String,
        qualifier: String,
    },

    /// A class was already defined in the namespace.
    #[error("class '{0}' is already defined")]
    DuplicateClass(String),

    /// An operation named a class that is not defined.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// An instance bound a property the class does not expose.
    #[error("unknown property '{property}' for class '{class}'")]
    UnknownProperty { class: String, property: String },

    /// A value does not fit the declared property type.
    #[error("type mismatch for '{class}.{property}': expected {expected}")]
    TypeMismatch {
        class: String,
        property: String,
        expected: String,
    },

    /// An instance omitted one of its class's key properties.
    #[error("missing key property '{property}' for instance of '{class}'")]
    MissingKeyProperty { class: String, property: String },

    /// An instance with the same path already exists.
    #[error("duplicate instance path: {0}")]
    DuplicateInstance(String),

    /// An alias was used before (or without) its declaration.
    ///
    /// Fixture files resolve aliases strictly in file order.
    #[error("unresolved instance alias: ${0}")]
    UnresolvedReference(String),

    /// An alias name was declared twice in one load batch.
    #[error("duplicate instance alias: ${0}")]
    DuplicateAlias(String),

    /// An association class without the required reference structure,
    /// or an association operation against a non-association class.
    #[error("invalid association class '{class}': {detail}")]
    InvalidAssociation { class: String, detail: String },

    /// Lookup against a namespace that was never created.
    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),

    /// Failure reading a fixture file.
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl ModelError {
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
