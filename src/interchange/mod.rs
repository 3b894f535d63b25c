//! Model interchange formats (feature = "interchange").
//!
//! Serializes a compiled namespace to JSON or YAML for consumption by
//! tools outside the WBEM world. Import is out of scope — MOF text is
//! the authoritative input format.

mod error;
mod export;

pub use error::InterchangeError;
pub use export::{
    ClassExport, InstanceExport, MethodExport, NamespaceExport, PropertyExport, QualifierExport,
};

use crate::repository::Namespace;

/// Serialize a namespace to pretty-printed JSON.
pub fn to_json(namespace: &Namespace) -> Result<String, InterchangeError> {
    let export = NamespaceExport::from_namespace(namespace);
    serde_json::to_string_pretty(&export).map_err(|e| InterchangeError::json(e.to_string()))
}

/// Serialize a namespace to YAML.
pub fn to_yaml(namespace: &Namespace) -> Result<String, InterchangeError> {
    let export = NamespaceExport::from_namespace(namespace);
    serde_yaml::to_string(&export).map_err(|e| InterchangeError::yaml(e.to_string()))
}
