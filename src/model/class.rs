//! Class, property, and method declarations, plus the flattened
//! "effective class" view the schema model precomputes.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::qualifier::QualifierSet;
use super::types::{CimType, CimValue, casefold};

/// The declared type of a property or parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Data {
        ty: CimType,
        is_array: bool,
        /// Fixed array size when declared as `name[8]`.
        array_size: Option<u32>,
    },
    /// `ClassName REF name` — a reference to an instance of the named
    /// class (or a subclass of it).
    Reference { class_name: SmolStr },
}

impl PropertyKind {
    pub fn scalar(ty: CimType) -> Self {
        Self::Data {
            ty,
            is_array: false,
            array_size: None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Data { is_array: true, .. })
    }

    /// The intrinsic data type; references report [`CimType::Reference`].
    pub fn ty(&self) -> CimType {
        match self {
            Self::Data { ty, .. } => *ty,
            Self::Reference { .. } => CimType::Reference,
        }
    }
}

/// A property declaration on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct CimProperty {
    pub name: SmolStr,
    pub kind: PropertyKind,
    pub default: Option<CimValue>,
    pub qualifiers: QualifierSet,
}

impl CimProperty {
    /// Key properties carry the `Key` qualifier with a true value.
    pub fn is_key(&self) -> bool {
        self.qualifiers.is_true("Key")
    }

    pub fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct CimParameter {
    pub name: SmolStr,
    pub kind: PropertyKind,
    pub qualifiers: QualifierSet,
}

impl CimParameter {
    /// Input parameters carry `In` (true unless `IN(false)` was written);
    /// parameters are inputs by default.
    pub fn is_in(&self) -> bool {
        match self.qualifiers.get("In").and_then(|q| q.value.as_ref()) {
            Some(CimValue::Boolean(b)) => *b,
            _ => true,
        }
    }

    pub fn is_out(&self) -> bool {
        self.qualifiers.is_true("Out")
    }
}

/// A method declaration on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct CimMethod {
    pub name: SmolStr,
    pub return_type: CimType,
    pub parameters: Vec<CimParameter>,
    pub qualifiers: QualifierSet,
}

/// A class declaration as written: local properties and methods only.
///
/// The inherited view lives in [`EffectiveClass`], computed once by the
/// schema model when the class is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct CimClass {
    pub name: SmolStr,
    pub superclass: Option<SmolStr>,
    pub qualifiers: QualifierSet,
    /// Declaration-ordered, folded-name keyed.
    pub properties: IndexMap<SmolStr, CimProperty>,
    pub methods: IndexMap<SmolStr, CimMethod>,
}

impl CimClass {
    pub fn property(&self, name: &str) -> Option<&CimProperty> {
        self.properties.get(&casefold(name))
    }

    pub fn method(&self, name: &str) -> Option<&CimMethod> {
        self.methods.get(&casefold(name))
    }

    pub fn is_association(&self) -> bool {
        self.qualifiers.is_true("Association")
    }

    pub fn is_indication(&self) -> bool {
        self.qualifiers.is_true("Indication")
    }
}

/// A property as seen on a class after inheritance resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveProperty {
    /// The property with its merged qualifier set.
    pub property: CimProperty,
    /// Name of the class the property was declared on.
    pub class_origin: SmolStr,
    /// True when the property is inherited rather than declared locally.
    pub propagated: bool,
}

/// A method as seen on a class after inheritance resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveMethod {
    pub method: CimMethod,
    pub class_origin: SmolStr,
    pub propagated: bool,
}

/// The flattened view of a class: every visible property and method with
/// inherited qualifiers resolved. Computed once at definition time so
/// queries never re-walk the ancestor chain.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveClass {
    pub name: SmolStr,
    pub superclass: Option<SmolStr>,
    pub qualifiers: QualifierSet,
    pub properties: IndexMap<SmolStr, EffectiveProperty>,
    pub methods: IndexMap<SmolStr, EffectiveMethod>,
}

impl EffectiveClass {
    pub fn property(&self, name: &str) -> Option<&EffectiveProperty> {
        self.properties.get(&casefold(name))
    }

    /// Visible key properties, in declaration order.
    pub fn key_properties(&self) -> impl Iterator<Item = &EffectiveProperty> {
        self.properties.values().filter(|p| p.property.is_key())
    }

    /// Visible reference properties, in declaration order.
    pub fn reference_properties(&self) -> impl Iterator<Item = &EffectiveProperty> {
        self.properties
            .values()
            .filter(|p| p.property.is_reference())
    }

    pub fn is_association(&self) -> bool {
        self.qualifiers.is_true("Association")
    }

    pub fn is_indication(&self) -> bool {
        self.qualifiers.is_true("Indication")
    }
}
