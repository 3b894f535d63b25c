//! The CIM object model.
//!
//! Types in this module are the vocabulary shared by the parser, the
//! repository, and the compiler: CIM data types and values, instance
//! paths, qualifier declarations with their scope/flavor sets, class and
//! instance declarations, and the [`ToMof`] rendering trait.
//!
//! Everything here is plain data — validation against a schema lives in
//! [`crate::repository`].

mod class;
mod instance;
mod mof;
mod qualifier;
mod types;

pub use class::{
    CimClass, CimMethod, CimParameter, CimProperty, EffectiveClass, EffectiveMethod,
    EffectiveProperty, PropertyKind,
};
pub use instance::CimInstance;
pub use mof::ToMof;
pub use qualifier::{AppliedQualifier, FlavorSet, QualifierDeclaration, QualifierSet, ScopeSet};
pub use types::{CimType, CimValue, InstancePath, casefold};
