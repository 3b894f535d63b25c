//! Association traversal over the instance store.
//!
//! An association instance links its endpoints through reference-typed
//! properties. Traversal walks every association instance that
//! references a source path and follows the *other* reference
//! properties out, with the optional class/role filters of the WBEM
//! `Associators`/`References` operations.

use rustc_hash::FxHashSet;

use crate::error::ModelError;
use crate::model::{CimInstance, CimValue, InstancePath};

use super::instances::InstanceStore;
use super::schema::SchemaModel;

/// Filters for [`associators`]; all default to unconstrained.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssociatorOptions<'a> {
    /// Restrict to association instances of this class (or subclasses).
    pub assoc_class: Option<&'a str>,
    /// The reference property naming the *source* end.
    pub role: Option<&'a str>,
    /// The reference property naming the *result* end.
    pub result_role: Option<&'a str>,
    /// Restrict results to instances of this class (or subclasses).
    pub result_class: Option<&'a str>,
}

/// Instances associated with `source` across association instances.
///
/// Dangling endpoint references (paths never created) are skipped, and
/// each associated instance is returned once even when several
/// associations link it.
pub(super) fn associators<'s>(
    schema: &SchemaModel,
    store: &'s InstanceStore,
    source: &InstancePath,
    options: AssociatorOptions<'_>,
) -> Result<Vec<&'s CimInstance>, ModelError> {
    check_class_filter(schema, options.assoc_class, true)?;
    check_class_filter(schema, options.result_class, false)?;

    let source_key = source.canonical();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut result = Vec::new();

    for association in association_instances(schema, store, options.assoc_class) {
        for (role_name, _) in reference_values(association)
            .filter(|(name, path)| path.canonical() == source_key && role_matches(name, options.role))
        {
            for (result_name, target_path) in reference_values(association) {
                if result_name.eq_ignore_ascii_case(role_name)
                    || !role_matches(result_name, options.result_role)
                {
                    continue;
                }
                let Some(target) = store.get(target_path) else {
                    continue;
                };
                if let Some(result_class) = options.result_class {
                    if !schema.is_same_or_subclass(&target.class_name, result_class) {
                        continue;
                    }
                }
                if seen.insert(target_path.canonical()) {
                    result.push(target);
                }
            }
        }
    }
    tracing::trace!(source = %source, count = result.len(), "associators");
    Ok(result)
}

/// Association instances that reference `source`.
pub(super) fn references<'s>(
    schema: &'s SchemaModel,
    store: &'s InstanceStore,
    source: &InstancePath,
    result_class: Option<&'s str>,
    role: Option<&str>,
) -> Result<Vec<&'s CimInstance>, ModelError> {
    check_class_filter(schema, result_class, true)?;

    let source_key = source.canonical();
    let mut result = Vec::new();
    for association in association_instances(schema, store, result_class) {
        let is_match = reference_values(association)
            .any(|(name, path)| path.canonical() == source_key && role_matches(name, role));
        if is_match {
            result.push(association);
        }
    }
    Ok(result)
}

/// Instances whose class is an association, optionally filtered to a
/// class and its subclasses.
fn association_instances<'s>(
    schema: &'s SchemaModel,
    store: &'s InstanceStore,
    class_filter: Option<&'s str>,
) -> impl Iterator<Item = &'s CimInstance> {
    store.iter().filter(move |instance| {
        let Some(effective) = schema.effective_class(&instance.class_name) else {
            return false;
        };
        if !effective.is_association() {
            return false;
        }
        match class_filter {
            Some(filter) => schema.is_same_or_subclass(&instance.class_name, filter),
            None => true,
        }
    })
}

/// The reference-valued properties of an instance.
fn reference_values(
    instance: &CimInstance,
) -> impl Iterator<Item = (&smol_str::SmolStr, &InstancePath)> {
    instance.iter().filter_map(|(name, value)| match value {
        CimValue::Reference(path) => Some((name, path)),
        _ => None,
    })
}

fn role_matches(name: &str, role: Option<&str>) -> bool {
    role.is_none_or(|role| name.eq_ignore_ascii_case(role))
}

/// Class filters must name a defined class; association-side filters
/// must name an association class.
fn check_class_filter(
    schema: &SchemaModel,
    filter: Option<&str>,
    must_be_association: bool,
) -> Result<(), ModelError> {
    let Some(name) = filter else {
        return Ok(());
    };
    let effective = schema
        .effective_class(name)
        .ok_or_else(|| ModelError::UnknownClass(name.to_string()))?;
    if must_be_association && !effective.is_association() {
        return Err(ModelError::InvalidAssociation {
            class: name.to_string(),
            detail: "class is not an association".into(),
        });
    }
    Ok(())
}
