//! The qualifier registry: leaf store for qualifier type declarations.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::ModelError;
use crate::model::{QualifierDeclaration, casefold};

/// Holds the qualifier declarations of one namespace.
///
/// Declarations are validated on entry and immutable afterwards, except
/// for re-declaration, which is only permitted when the prior
/// declaration's flavor allows override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualifierRegistry {
    /// Folded-name keyed, declaration order preserved.
    declarations: IndexMap<SmolStr, QualifierDeclaration>,
}

impl QualifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a qualifier declaration.
    ///
    /// The scope/flavor combination is validated and unstated flavor
    /// axes are filled with the CIM defaults before storing.
    pub fn declare(&mut self, mut declaration: QualifierDeclaration) -> Result<(), ModelError> {
        declaration.validate()?;
        declaration.flavors = declaration.flavors.normalized();

        let key = casefold(&declaration.name);
        if let Some(existing) = self.declarations.get(&key) {
            if !existing.flavors.permits_override() {
                return Err(ModelError::QualifierRedeclarationConflict(
                    declaration.name.to_string(),
                ));
            }
            tracing::debug!(qualifier = %declaration.name, "re-declaring qualifier");
        }
        self.declarations.insert(key, declaration);
        Ok(())
    }

    /// Look up a declaration; absent names are an error, since every
    /// qualifier use must be declared first.
    pub fn lookup(&self, name: &str) -> Result<&QualifierDeclaration, ModelError> {
        self.get(name)
            .ok_or_else(|| ModelError::UnknownQualifier(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&QualifierDeclaration> {
        self.declarations.get(&casefold(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(&casefold(name))
    }

    /// Declarations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &QualifierDeclaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
