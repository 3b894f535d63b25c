//! The schema model: class definitions with precomputed effective views.
//!
//! Classes are flattened once at definition time — the effective view of
//! a class carries every inherited property, method, and qualifier with
//! override checks already applied, so queries never re-walk the
//! ancestor chain.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::ModelError;
use crate::model::{
    AppliedQualifier, CimClass, EffectiveClass, EffectiveMethod, EffectiveProperty, PropertyKind,
    QualifierSet, ScopeSet, casefold,
};

use super::qualifiers::QualifierRegistry;

/// Holds the class definitions of one namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModel {
    /// Declared classes, folded-name keyed, definition order preserved.
    classes: IndexMap<SmolStr, CimClass>,
    /// Flattened views, one per class, computed at definition time.
    effective: FxHashMap<SmolStr, EffectiveClass>,
    /// Direct subclasses by folded superclass name.
    subclasses: FxHashMap<SmolStr, Vec<SmolStr>>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ============================================================
    // Definition
    // ============================================================

    /// Define a class.
    ///
    /// Applied qualifiers are resolved against the registry (declaration
    /// must exist, scope must permit the application, implied values are
    /// filled in), the superclass must already be defined, and the
    /// effective view is computed with `DisableOverride` enforcement.
    pub fn define_class(
        &mut self,
        mut class: CimClass,
        registry: &QualifierRegistry,
    ) -> Result<(), ModelError> {
        let key = casefold(&class.name);
        if self.classes.contains_key(&key) {
            return Err(ModelError::DuplicateClass(class.name.to_string()));
        }

        // Resolve class qualifier values first; the association and
        // indication markers determine the class's own scope kind.
        resolve_qualifier_values(&mut class.qualifiers, registry)?;
        let mut class_scope = ScopeSet::CLASS;
        if class.qualifiers.is_true("Association") {
            class_scope |= ScopeSet::ASSOCIATION;
        }
        if class.qualifiers.is_true("Indication") {
            class_scope |= ScopeSet::INDICATION;
        }
        check_qualifier_scopes(&class.qualifiers, class_scope, &class.name, registry)?;

        let superclass_effective = match &class.superclass {
            Some(superclass) => Some(self.effective.get(&casefold(superclass)).ok_or_else(
                || ModelError::UnknownSuperclass {
                    class: class.name.to_string(),
                    superclass: superclass.to_string(),
                },
            )?),
            None => None,
        };

        // Resolve feature qualifiers before merging.
        for property in class.properties.values_mut() {
            resolve_qualifier_values(&mut property.qualifiers, registry)?;
            let scope = if property.kind.is_reference() {
                ScopeSet::REFERENCE
            } else {
                ScopeSet::PROPERTY
            };
            let element = format!("{}.{}", class.name, property.name);
            check_qualifier_scopes(&property.qualifiers, scope, &element, registry)?;
        }
        for method in class.methods.values_mut() {
            resolve_qualifier_values(&mut method.qualifiers, registry)?;
            let element = format!("{}.{}", class.name, method.name);
            check_qualifier_scopes(&method.qualifiers, ScopeSet::METHOD, &element, registry)?;
            for parameter in &mut method.parameters {
                resolve_qualifier_values(&mut parameter.qualifiers, registry)?;
                let element = format!("{}.{}.{}", class.name, method.name, parameter.name);
                check_qualifier_scopes(
                    &parameter.qualifiers,
                    ScopeSet::PARAMETER,
                    &element,
                    registry,
                )?;
            }
        }

        let effective = self.flatten(&class, superclass_effective, registry)?;

        // Reference properties only occur on association classes, and
        // their referenced classes must resolve.
        let is_association = effective.is_association();
        for property in effective.properties.values() {
            if let PropertyKind::Reference { class_name } = &property.property.kind {
                if !is_association {
                    return Err(ModelError::InvalidAssociation {
                        class: class.name.to_string(),
                        detail: format!(
                            "reference property '{}' on a non-association class",
                            property.property.name
                        ),
                    });
                }
                self.check_class_reference(class_name, &class.name)?;
            }
        }
        for method in effective.methods.values() {
            for parameter in &method.method.parameters {
                if let PropertyKind::Reference { class_name } = &parameter.kind {
                    self.check_class_reference(class_name, &class.name)?;
                }
            }
        }
        if is_association {
            let reference_keys = effective
                .key_properties()
                .filter(|p| p.property.is_reference())
                .count();
            if reference_keys < 2 {
                return Err(ModelError::InvalidAssociation {
                    class: class.name.to_string(),
                    detail: "association classes need at least two reference key properties"
                        .into(),
                });
            }
        }

        tracing::debug!(class = %class.name, superclass = ?class.superclass, "defined class");

        if let Some(superclass) = &class.superclass {
            self.subclasses
                .entry(casefold(superclass))
                .or_default()
                .push(class.name.clone());
        }
        self.effective.insert(key.clone(), effective);
        self.classes.insert(key, class);
        Ok(())
    }

    /// A referenced class must be defined, or be the class currently
    /// being defined (self-references are legal).
    fn check_class_reference(&self, referenced: &str, defining: &str) -> Result<(), ModelError> {
        if casefold(referenced) == casefold(defining) || self.contains(referenced) {
            Ok(())
        } else {
            Err(ModelError::UnknownClass(referenced.to_string()))
        }
    }

    /// Compute the effective (flattened) view of a class.
    fn flatten(
        &self,
        class: &CimClass,
        superclass: Option<&EffectiveClass>,
        registry: &QualifierRegistry,
    ) -> Result<EffectiveClass, ModelError> {
        let mut qualifiers = QualifierSet::new();
        let mut properties: IndexMap<SmolStr, EffectiveProperty> = IndexMap::new();
        let mut methods: IndexMap<SmolStr, EffectiveMethod> = IndexMap::new();

        if let Some(superclass) = superclass {
            for qualifier in superclass.qualifiers.iter() {
                if propagates(registry, &qualifier.name) {
                    qualifiers.insert(AppliedQualifier {
                        propagated: true,
                        ..qualifier.clone()
                    });
                }
            }
            for (key, property) in &superclass.properties {
                properties.insert(
                    key.clone(),
                    EffectiveProperty {
                        propagated: true,
                        ..property.clone()
                    },
                );
            }
            for (key, method) in &superclass.methods {
                methods.insert(
                    key.clone(),
                    EffectiveMethod {
                        propagated: true,
                        ..method.clone()
                    },
                );
            }
        }

        merge_qualifiers(&mut qualifiers, &class.qualifiers, registry, &class.name, &class.name)?;

        for (key, property) in &class.properties {
            match properties.get(key) {
                Some(inherited) => {
                    // Override: same type, merged qualifiers, local
                    // default wins when given.
                    if inherited.property.kind != property.kind {
                        return Err(ModelError::TypeMismatch {
                            class: class.name.to_string(),
                            property: property.name.to_string(),
                            expected: kind_description(&inherited.property.kind),
                        });
                    }
                    let mut merged = inherited.property.qualifiers.clone();
                    for qualifier in merged.iter_mut() {
                        qualifier.propagated = true;
                    }
                    let element = format!("{}.{}", class.name, property.name);
                    merge_qualifiers(
                        &mut merged,
                        &property.qualifiers,
                        registry,
                        &class.name,
                        &element,
                    )?;
                    let mut overriding = property.clone();
                    overriding.qualifiers = merged;
                    if overriding.default.is_none() {
                        overriding.default = inherited.property.default.clone();
                    }
                    properties.insert(
                        key.clone(),
                        EffectiveProperty {
                            property: overriding,
                            class_origin: class.name.clone(),
                            propagated: false,
                        },
                    );
                }
                None => {
                    properties.insert(
                        key.clone(),
                        EffectiveProperty {
                            property: property.clone(),
                            class_origin: class.name.clone(),
                            propagated: false,
                        },
                    );
                }
            }
        }

        for (key, method) in &class.methods {
            match methods.get(key) {
                Some(inherited) => {
                    let mut merged = inherited.method.qualifiers.clone();
                    for qualifier in merged.iter_mut() {
                        qualifier.propagated = true;
                    }
                    let element = format!("{}.{}", class.name, method.name);
                    merge_qualifiers(
                        &mut merged,
                        &method.qualifiers,
                        registry,
                        &class.name,
                        &element,
                    )?;
                    let mut overriding = method.clone();
                    overriding.qualifiers = merged;
                    methods.insert(
                        key.clone(),
                        EffectiveMethod {
                            method: overriding,
                            class_origin: class.name.clone(),
                            propagated: false,
                        },
                    );
                }
                None => {
                    methods.insert(
                        key.clone(),
                        EffectiveMethod {
                            method: method.clone(),
                            class_origin: class.name.clone(),
                            propagated: false,
                        },
                    );
                }
            }
        }

        Ok(EffectiveClass {
            name: class.name.clone(),
            superclass: class.superclass.clone(),
            qualifiers,
            properties,
            methods,
        })
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Get a declared class (local features only).
    pub fn class(&self, name: &str) -> Option<&CimClass> {
        self.classes.get(&casefold(name))
    }

    /// Get the flattened view of a class, inherited qualifiers resolved.
    pub fn effective_class(&self, name: &str) -> Option<&EffectiveClass> {
        let effective = self.effective.get(&casefold(name));
        tracing::trace!(class = %name, found = effective.is_some(), "effective class lookup");
        effective
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(&casefold(name))
    }

    /// Declared class names, in definition order.
    pub fn class_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.classes.values().map(|c| &c.name)
    }

    /// Direct subclass names of a class.
    pub fn direct_subclasses(&self, name: &str) -> &[SmolStr] {
        self.subclasses
            .get(&casefold(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All transitive subclass names of a class, pre-order.
    pub fn deep_subclasses(&self, name: &str) -> Vec<SmolStr> {
        let mut result = Vec::new();
        let mut stack: Vec<SmolStr> = self.direct_subclasses(name).to_vec();
        while let Some(class) = stack.pop() {
            stack.extend(self.direct_subclasses(&class).iter().cloned());
            result.push(class);
        }
        result
    }

    /// Whether `sub` is `sup` or one of its transitive subclasses.
    pub fn is_same_or_subclass(&self, sub: &str, sup: &str) -> bool {
        let target = casefold(sup);
        let mut current = casefold(sub);
        loop {
            if current == target {
                return true;
            }
            match self.classes.get(&current).and_then(|c| c.superclass.as_ref()) {
                Some(superclass) => current = casefold(superclass),
                None => return false,
            }
        }
    }

    /// Enumerate classes starting at `root` (or at the hierarchy top).
    ///
    /// Without `deep`, only the next hierarchy level is returned; with
    /// it, the complete subtree.
    pub fn enumerate_classes(
        &self,
        root: Option<&str>,
        deep: bool,
    ) -> Result<Vec<&CimClass>, ModelError> {
        let names: Vec<SmolStr> = match root {
            Some(root) => {
                if !self.contains(root) {
                    return Err(ModelError::UnknownClass(root.to_string()));
                }
                if deep {
                    self.deep_subclasses(root)
                } else {
                    self.direct_subclasses(root).to_vec()
                }
            }
            None if deep => self.class_names().cloned().collect(),
            None => self
                .classes
                .values()
                .filter(|c| c.superclass.is_none())
                .map(|c| c.name.clone())
                .collect(),
        };
        Ok(names
            .iter()
            .filter_map(|name| self.class(name))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Fill implied values for applications written without one (`[Key]`).
fn resolve_qualifier_values(
    qualifiers: &mut QualifierSet,
    registry: &QualifierRegistry,
) -> Result<(), ModelError> {
    for qualifier in qualifiers.iter_mut() {
        let declaration = registry.lookup(&qualifier.name)?;
        if qualifier.value.is_none() {
            qualifier.value = declaration.implied_value();
        }
    }
    Ok(())
}

/// Every applied qualifier's declared scope must admit the element kind.
fn check_qualifier_scopes(
    qualifiers: &QualifierSet,
    scope: ScopeSet,
    element: &str,
    registry: &QualifierRegistry,
) -> Result<(), ModelError> {
    for qualifier in qualifiers.iter() {
        let declaration = registry.lookup(&qualifier.name)?;
        if !declaration.scopes.permits(scope) {
            return Err(ModelError::IllegalScopeFlavor {
                qualifier: qualifier.name.to_string(),
                detail: format!("not applicable to '{element}'"),
            });
        }
    }
    Ok(())
}

/// Apply local qualifier entries over inherited ones, enforcing
/// `DisableOverride`: a locked qualifier may be restated but never
/// changed.
fn merge_qualifiers(
    target: &mut QualifierSet,
    local: &QualifierSet,
    registry: &QualifierRegistry,
    class: &str,
    element: &str,
) -> Result<(), ModelError> {
    for qualifier in local.iter() {
        if let Some(inherited) = target.get(&qualifier.name) {
            if inherited.propagated {
                let declaration = registry.lookup(&qualifier.name)?;
                if !declaration.flavors.permits_override() && inherited.value != qualifier.value {
                    return Err(ModelError::QualifierOverrideViolation {
                        class: class.to_string(),
                        element: element.to_string(),
                        qualifier: qualifier.name.to_string(),
                    });
                }
            }
        }
        target.insert(qualifier.clone());
    }
    Ok(())
}

fn propagates(registry: &QualifierRegistry, name: &str) -> bool {
    registry.get(name).is_none_or(|d| d.flavors.propagates())
}

fn kind_description(kind: &PropertyKind) -> String {
    match kind {
        PropertyKind::Data { ty, is_array, .. } => {
            if *is_array {
                format!("{}[]", ty.as_keyword())
            } else {
                ty.as_keyword().to_string()
            }
        }
        PropertyKind::Reference { class_name } => format!("{class_name} REF"),
    }
}
