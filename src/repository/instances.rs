//! The instance store: validated instances with path and class indexes.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::ModelError;
use crate::model::{
    CimInstance, CimValue, EffectiveClass, InstancePath, PropertyKind, casefold,
};

use super::schema::SchemaModel;

/// Index of an instance in the store's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

impl InstanceId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Holds the instances of one namespace.
///
/// Arena storage is the single source of truth; the path and class maps
/// are lookup indexes over it. Mutation happens only during load —
/// afterwards the store is read-only and freely shared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceStore {
    arena: Vec<CimInstance>,
    /// Canonical path form → instance id.
    by_path: FxHashMap<String, InstanceId>,
    /// Folded creation-class name → instance ids, in creation order.
    by_class: FxHashMap<SmolStr, Vec<InstanceId>>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance of `class_name` from property bindings.
    ///
    /// Validates the class, every property name and value type against
    /// the effective class, and the presence of all key properties, then
    /// derives the instance path. Reference values written as strings
    /// are coerced to paths here.
    pub fn create_instance(
        &mut self,
        class_name: &str,
        bindings: Vec<(SmolStr, CimValue)>,
        schema: &SchemaModel,
    ) -> Result<InstancePath, ModelError> {
        let effective = schema
            .effective_class(class_name)
            .ok_or_else(|| ModelError::UnknownClass(class_name.to_string()))?;

        let mut properties: IndexMap<SmolStr, (SmolStr, CimValue)> = IndexMap::new();
        for (name, value) in bindings {
            let property = effective.property(&name).ok_or_else(|| {
                ModelError::UnknownProperty {
                    class: effective.name.to_string(),
                    property: name.to_string(),
                }
            })?;
            let value = check_value(effective, &property.property.name, value, schema)?;
            properties.insert(casefold(&name), (property.property.name.clone(), value));
        }

        let mut keys = Vec::new();
        for key_property in effective.key_properties() {
            let folded = casefold(&key_property.property.name);
            match properties.get(&folded) {
                Some((name, value)) => keys.push((name.clone(), value.clone())),
                None => {
                    return Err(ModelError::MissingKeyProperty {
                        class: effective.name.to_string(),
                        property: key_property.property.name.to_string(),
                    });
                }
            }
        }

        let path = InstancePath::new(effective.name.clone(), keys);
        let canonical = path.canonical();
        if self.by_path.contains_key(&canonical) {
            return Err(ModelError::DuplicateInstance(path.to_string()));
        }

        tracing::debug!(path = %path, "created instance");

        let id = InstanceId(self.arena.len());
        self.arena.push(CimInstance {
            class_name: effective.name.clone(),
            properties,
            path: path.clone(),
        });
        self.by_path.insert(canonical, id);
        self.by_class
            .entry(casefold(&effective.name))
            .or_default()
            .push(id);
        Ok(path)
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Get an instance by its id (O(1) arena lookup)
    pub fn instance(&self, id: InstanceId) -> Option<&CimInstance> {
        self.arena.get(id.0)
    }

    /// Get an instance by its path.
    pub fn get(&self, path: &InstancePath) -> Option<&CimInstance> {
        let id = self.by_path.get(&path.canonical())?;
        self.instance(*id)
    }

    pub fn contains(&self, path: &InstancePath) -> bool {
        self.by_path.contains_key(&path.canonical())
    }

    /// Enumerate the instances of a class, in creation order.
    ///
    /// With `deep`, instances of every registered subclass are included,
    /// each still keyed by its own creation class.
    pub fn instances_of(
        &self,
        class_name: &str,
        deep: bool,
        schema: &SchemaModel,
    ) -> Result<Vec<&CimInstance>, ModelError> {
        if !schema.contains(class_name) {
            return Err(ModelError::UnknownClass(class_name.to_string()));
        }
        let mut names = vec![SmolStr::from(class_name)];
        if deep {
            names.extend(schema.deep_subclasses(class_name));
        }
        let mut result = Vec::new();
        for name in &names {
            if let Some(ids) = self.by_class.get(&casefold(name)) {
                result.extend(ids.iter().filter_map(|id| self.instance(*id)));
            }
        }
        Ok(result)
    }

    /// All instances, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &CimInstance> {
        self.arena.iter()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Check one bound value against its declared property.
///
/// Returns the (possibly coerced) value: strings bound to reference
/// properties become parsed paths, and reference targets are checked to
/// be the declared class or one of its subclasses.
fn check_value(
    effective: &EffectiveClass,
    property_name: &str,
    value: CimValue,
    schema: &SchemaModel,
) -> Result<CimValue, ModelError> {
    let property = match effective.property(property_name) {
        Some(property) => &property.property,
        None => {
            return Err(ModelError::UnknownProperty {
                class: effective.name.to_string(),
                property: property_name.to_string(),
            });
        }
    };

    let mismatch = || ModelError::TypeMismatch {
        class: effective.name.to_string(),
        property: property_name.to_string(),
        expected: match &property.kind {
            PropertyKind::Data { ty, is_array, .. } if *is_array => {
                format!("{}[]", ty.as_keyword())
            }
            PropertyKind::Data { ty, .. } => ty.as_keyword().to_string(),
            PropertyKind::Reference { class_name } => format!("{class_name} REF"),
        },
    };

    match &property.kind {
        PropertyKind::Reference { class_name } => {
            let path = match value {
                CimValue::Reference(path) => path,
                CimValue::String(text) => InstancePath::parse(&text).ok_or_else(mismatch)?,
                _ => return Err(mismatch()),
            };
            if !schema.is_same_or_subclass(&path.class_name, class_name) {
                return Err(mismatch());
            }
            Ok(CimValue::Reference(path))
        }
        PropertyKind::Data { ty, is_array, .. } => {
            if *is_array {
                let CimValue::Array(items) = &value else {
                    return Err(mismatch());
                };
                if !items.iter().all(|item| ty.accepts(item)) {
                    return Err(mismatch());
                }
                Ok(value)
            } else if ty.accepts(&value) {
                Ok(value)
            } else {
                Err(mismatch())
            }
        }
    }
}
