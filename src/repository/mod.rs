//! The repository: namespaces holding qualifiers, classes, and instances.
//!
//! A [`Repository`] is the queryable object graph a loaded fixture set
//! becomes. It is mutated only by the compiler during a load; afterwards
//! every operation takes `&self`, so a repository can be shared across
//! threads without locking.

mod associations;
mod instances;
mod qualifiers;
mod schema;

pub use associations::AssociatorOptions;
pub use instances::{InstanceId, InstanceStore};
pub use qualifiers::QualifierRegistry;
pub use schema::SchemaModel;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::ModelError;
use crate::model::{
    CimClass, CimInstance, CimValue, EffectiveClass, InstancePath, QualifierDeclaration, casefold,
};

/// The namespace every repository starts with.
pub const DEFAULT_NAMESPACE: &str = "root/cimv2";

/// One namespace: a qualifier registry, a schema model, and an instance
/// store that validate against each other.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    name: SmolStr,
    qualifiers: QualifierRegistry,
    schema: SchemaModel,
    instances: InstanceStore,
}

impl Namespace {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            qualifiers: QualifierRegistry::new(),
            schema: SchemaModel::new(),
            instances: InstanceStore::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ============================================================
    // Loading operations (compiler-facing)
    // ============================================================

    /// Register a qualifier declaration.
    pub fn declare_qualifier(&mut self, declaration: QualifierDeclaration) -> Result<(), ModelError> {
        self.qualifiers.declare(declaration)
    }

    /// Define a class, validating it against the qualifier registry and
    /// the classes defined so far.
    pub fn define_class(&mut self, class: CimClass) -> Result<(), ModelError> {
        self.schema.define_class(class, &self.qualifiers)
    }

    /// Create an instance from property bindings, validating it against
    /// the schema. Returns the derived instance path.
    pub fn create_instance(
        &mut self,
        class_name: &str,
        bindings: Vec<(SmolStr, CimValue)>,
    ) -> Result<InstancePath, ModelError> {
        self.instances
            .create_instance(class_name, bindings, &self.schema)
    }

    // ============================================================
    // Queries
    // ============================================================

    pub fn qualifiers(&self) -> &QualifierRegistry {
        &self.qualifiers
    }

    pub fn schema(&self) -> &SchemaModel {
        &self.schema
    }

    pub fn instances(&self) -> &InstanceStore {
        &self.instances
    }

    /// Get a declared class by name.
    pub fn class(&self, name: &str) -> Option<&CimClass> {
        self.schema.class(name)
    }

    /// Get a class with its inherited properties and qualifiers resolved.
    pub fn effective_class(&self, name: &str) -> Option<&EffectiveClass> {
        self.schema.effective_class(name)
    }

    /// Enumerate classes from the hierarchy top or below `root`.
    pub fn enumerate_classes(
        &self,
        root: Option<&str>,
        deep: bool,
    ) -> Result<Vec<&CimClass>, ModelError> {
        self.schema.enumerate_classes(root, deep)
    }

    /// Get an instance by its path.
    pub fn instance(&self, path: &InstancePath) -> Option<&CimInstance> {
        self.instances.get(path)
    }

    /// Enumerate instances of a class, optionally including subclasses.
    pub fn enumerate_instances(
        &self,
        class_name: &str,
        deep: bool,
    ) -> Result<Vec<&CimInstance>, ModelError> {
        self.instances.instances_of(class_name, deep, &self.schema)
    }

    /// Instances associated with `source` through association instances.
    pub fn associators(
        &self,
        source: &InstancePath,
        options: AssociatorOptions<'_>,
    ) -> Result<Vec<&CimInstance>, ModelError> {
        associations::associators(&self.schema, &self.instances, source, options)
    }

    /// Paths of the instances associated with `source`.
    pub fn associator_paths(
        &self,
        source: &InstancePath,
        options: AssociatorOptions<'_>,
    ) -> Result<Vec<InstancePath>, ModelError> {
        Ok(self
            .associators(source, options)?
            .into_iter()
            .map(|instance| instance.path.clone())
            .collect())
    }

    /// Association instances that reference `source`.
    pub fn references<'a>(
        &'a self,
        source: &InstancePath,
        result_class: Option<&'a str>,
        role: Option<&str>,
    ) -> Result<Vec<&'a CimInstance>, ModelError> {
        associations::references(&self.schema, &self.instances, source, result_class, role)
    }
}

/// A set of namespaces, keyed case-insensitively by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Repository {
    namespaces: IndexMap<SmolStr, Namespace>,
}

impl Repository {
    /// A repository with the default namespace pre-created.
    pub fn new() -> Self {
        let mut repository = Self {
            namespaces: IndexMap::new(),
        };
        repository.create_namespace(DEFAULT_NAMESPACE);
        repository
    }

    /// Get or create a namespace.
    pub fn create_namespace(&mut self, name: &str) -> &mut Namespace {
        self.namespaces
            .entry(casefold(name))
            .or_insert_with(|| Namespace::new(name))
    }

    pub fn namespace(&self, name: &str) -> Result<&Namespace, ModelError> {
        self.namespaces
            .get(&casefold(name))
            .ok_or_else(|| ModelError::UnknownNamespace(name.to_string()))
    }

    pub fn namespace_mut(&mut self, name: &str) -> Result<&mut Namespace, ModelError> {
        self.namespaces
            .get_mut(&casefold(name))
            .ok_or_else(|| ModelError::UnknownNamespace(name.to_string()))
    }

    /// The default namespace (always present).
    pub fn default_namespace(&self) -> &Namespace {
        &self.namespaces[0]
    }

    /// Namespace names, in creation order.
    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.namespaces.values().map(Namespace::name)
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}
