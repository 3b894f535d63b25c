//! Instance values.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::types::{CimValue, InstancePath, casefold};

/// A named instance of a class.
///
/// Property values are stored under folded names in declaration order;
/// the path is derived from the key properties at creation time and is
/// the instance's identity within its namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct CimInstance {
    /// Declared spelling of the creation class name.
    pub class_name: SmolStr,
    pub properties: IndexMap<SmolStr, (SmolStr, CimValue)>,
    pub path: InstancePath,
}

impl CimInstance {
    pub fn property(&self, name: &str) -> Option<&CimValue> {
        self.properties.get(&casefold(name)).map(|(_, v)| v)
    }

    /// Property values with their declared spellings, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &CimValue)> {
        self.properties.values().map(|(name, value)| (name, value))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
