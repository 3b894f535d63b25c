//! Qualifier declarations and applied qualifier sets.
//!
//! A *qualifier declaration* (`Qualifier Key : boolean = false, Scope(...),
//! Flavor(...);`) defines a qualifier's type, default, where it may be
//! applied, and how it propagates. An *applied qualifier* (`[Key]`,
//! `[Description("...")]`) attaches a value to a class, property, method,
//! parameter, or reference.

use bitflags::bitflags;
use indexmap::IndexMap;
use smol_str::SmolStr;

use super::types::{CimType, CimValue, casefold};
use crate::error::ModelError;

bitflags! {
    /// The meta elements a qualifier may be applied to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScopeSet: u16 {
        const ANY         = 1 << 0;
        const CLASS       = 1 << 1;
        const PROPERTY    = 1 << 2;
        const REFERENCE   = 1 << 3;
        const ASSOCIATION = 1 << 4;
        const INDICATION  = 1 << 5;
        const METHOD      = 1 << 6;
        const PARAMETER   = 1 << 7;
    }
}

bitflags! {
    /// Qualifier propagation and override behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FlavorSet: u8 {
        const ENABLE_OVERRIDE  = 1 << 0;
        const DISABLE_OVERRIDE = 1 << 1;
        const TO_SUBCLASS      = 1 << 2;
        const RESTRICTED       = 1 << 3;
        const TRANSLATABLE     = 1 << 4;
    }
}

impl ScopeSet {
    /// Map a MOF scope keyword (case-insensitive) to its flag.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let scope = match keyword.to_ascii_lowercase().as_str() {
            "any" => Self::ANY,
            "class" => Self::CLASS,
            "property" => Self::PROPERTY,
            "reference" => Self::REFERENCE,
            "association" => Self::ASSOCIATION,
            "indication" => Self::INDICATION,
            "method" => Self::METHOD,
            "parameter" => Self::PARAMETER,
            _ => return None,
        };
        Some(scope)
    }

    /// Whether a qualifier with this scope set may be applied to an
    /// element of kind `scope`. `Scope(any)` admits everything.
    pub fn permits(&self, scope: ScopeSet) -> bool {
        self.contains(Self::ANY) || self.intersects(scope)
    }

    /// MOF keywords for the contained scopes, in canonical order.
    pub fn keywords(&self) -> Vec<&'static str> {
        [
            (Self::ANY, "any"),
            (Self::CLASS, "class"),
            (Self::PROPERTY, "property"),
            (Self::REFERENCE, "reference"),
            (Self::ASSOCIATION, "association"),
            (Self::INDICATION, "indication"),
            (Self::METHOD, "method"),
            (Self::PARAMETER, "parameter"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, kw)| *kw)
        .collect()
    }
}

impl FlavorSet {
    /// Map a MOF flavor keyword (case-insensitive) to its flag.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let flavor = match keyword.to_ascii_lowercase().as_str() {
            "enableoverride" => Self::ENABLE_OVERRIDE,
            "disableoverride" => Self::DISABLE_OVERRIDE,
            "tosubclass" => Self::TO_SUBCLASS,
            "restricted" => Self::RESTRICTED,
            "translatable" => Self::TRANSLATABLE,
            _ => return None,
        };
        Some(flavor)
    }

    /// The CIM default flavor: overridable, propagated to subclasses.
    pub fn defaults() -> Self {
        Self::ENABLE_OVERRIDE | Self::TO_SUBCLASS
    }

    /// Fill in unstated flavor axes with their defaults.
    pub fn normalized(self) -> Self {
        let mut flavors = self;
        if !flavors.intersects(Self::ENABLE_OVERRIDE | Self::DISABLE_OVERRIDE) {
            flavors |= Self::ENABLE_OVERRIDE;
        }
        if !flavors.intersects(Self::TO_SUBCLASS | Self::RESTRICTED) {
            flavors |= Self::TO_SUBCLASS;
        }
        flavors
    }

    pub fn permits_override(&self) -> bool {
        !self.contains(Self::DISABLE_OVERRIDE)
    }

    pub fn propagates(&self) -> bool {
        !self.contains(Self::RESTRICTED)
    }

    /// MOF keywords for the contained flavors, in canonical order.
    pub fn keywords(&self) -> Vec<&'static str> {
        [
            (Self::ENABLE_OVERRIDE, "EnableOverride"),
            (Self::DISABLE_OVERRIDE, "DisableOverride"),
            (Self::TO_SUBCLASS, "ToSubclass"),
            (Self::RESTRICTED, "Restricted"),
            (Self::TRANSLATABLE, "Translatable"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, kw)| *kw)
        .collect()
    }
}

/// A qualifier type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifierDeclaration {
    pub name: SmolStr,
    pub ty: CimType,
    pub is_array: bool,
    pub default: Option<CimValue>,
    pub scopes: ScopeSet,
    pub flavors: FlavorSet,
}

impl QualifierDeclaration {
    /// Validate the scope/flavor combination against the CIM rules:
    /// the override and propagation axes each admit one setting, and a
    /// qualifier must be applicable to at least one element kind.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self
            .flavors
            .contains(FlavorSet::ENABLE_OVERRIDE | FlavorSet::DISABLE_OVERRIDE)
        {
            return Err(ModelError::IllegalScopeFlavor {
                qualifier: self.name.to_string(),
                detail: "EnableOverride and DisableOverride are mutually exclusive".into(),
            });
        }
        if self
            .flavors
            .contains(FlavorSet::TO_SUBCLASS | FlavorSet::RESTRICTED)
        {
            return Err(ModelError::IllegalScopeFlavor {
                qualifier: self.name.to_string(),
                detail: "ToSubclass and Restricted are mutually exclusive".into(),
            });
        }
        if self.scopes.is_empty() {
            return Err(ModelError::IllegalScopeFlavor {
                qualifier: self.name.to_string(),
                detail: "qualifier must name at least one scope".into(),
            });
        }
        Ok(())
    }

    /// The value an application without an explicit value carries.
    ///
    /// Naming a boolean qualifier (`[Key]`) asserts it; other types fall
    /// back to the declared default.
    pub fn implied_value(&self) -> Option<CimValue> {
        if self.ty == CimType::Boolean && !self.is_array {
            Some(CimValue::Boolean(true))
        } else {
            self.default.clone()
        }
    }
}

/// A qualifier applied to a schema element.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedQualifier {
    /// Declared spelling of the qualifier name.
    pub name: SmolStr,
    pub value: Option<CimValue>,
    /// True when the value arrived by propagation from a superclass
    /// rather than being written on the element itself.
    pub propagated: bool,
}

/// An ordered, case-insensitive set of applied qualifiers.
///
/// Keys are folded for lookup; iteration yields entries in application
/// order with their declared spelling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QualifierSet {
    entries: IndexMap<SmolStr, AppliedQualifier>,
}

impl QualifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an applied qualifier.
    pub fn insert(&mut self, qualifier: AppliedQualifier) {
        self.entries.insert(casefold(&qualifier.name), qualifier);
    }

    pub fn get(&self, name: &str) -> Option<&AppliedQualifier> {
        self.entries.get(&casefold(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&casefold(name))
    }

    /// True when the qualifier is applied with a true boolean value.
    pub fn is_true(&self, name: &str) -> bool {
        matches!(
            self.get(name).and_then(|q| q.value.as_ref()),
            Some(CimValue::Boolean(true))
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppliedQualifier> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut AppliedQualifier> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<AppliedQualifier> for QualifierSet {
    fn from_iter<I: IntoIterator<Item = AppliedQualifier>>(iter: I) -> Self {
        let mut set = Self::new();
        for qualifier in iter {
            set.insert(qualifier);
        }
        set
    }
}
