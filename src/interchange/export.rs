//! Export representation of a compiled namespace.
//!
//! The export model is its own set of serde-friendly structs rather than
//! serialization attributes on the repository types: the on-disk shape
//! can stay stable while the in-memory model evolves.

use serde::Serialize;
use smol_str::SmolStr;

use crate::model::{
    CimClass, CimInstance, CimMethod, CimProperty, CimValue, PropertyKind, QualifierDeclaration,
    QualifierSet,
};
use crate::repository::Namespace;

/// One applied qualifier in export form.
#[derive(Debug, Serialize)]
pub struct QualifierEntry {
    pub name: SmolStr,
    pub value: Option<CimValue>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub propagated: bool,
}

/// A qualifier type declaration in export form.
#[derive(Debug, Serialize)]
pub struct QualifierExport {
    pub name: SmolStr,
    #[serde(rename = "type")]
    pub ty: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_array: bool,
    pub default: Option<CimValue>,
    pub scopes: Vec<&'static str>,
    pub flavors: Vec<&'static str>,
}

/// A property declaration in export form.
#[derive(Debug, Serialize)]
pub struct PropertyExport {
    pub name: SmolStr,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_array: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_class: Option<SmolStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<CimValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<QualifierEntry>,
}

/// A method declaration in export form.
#[derive(Debug, Serialize)]
pub struct MethodExport {
    pub name: SmolStr,
    pub return_type: &'static str,
    pub parameters: Vec<PropertyExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<QualifierEntry>,
}

/// A class declaration in export form.
#[derive(Debug, Serialize)]
pub struct ClassExport {
    pub name: SmolStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<SmolStr>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub association: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub indication: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<QualifierEntry>,
    pub properties: Vec<PropertyExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodExport>,
}

/// An instance in export form.
#[derive(Debug, Serialize)]
pub struct InstanceExport {
    pub class_name: SmolStr,
    /// Untyped WBEM path string.
    pub path: String,
    pub properties: Vec<(SmolStr, CimValue)>,
}

/// A whole namespace in export form.
#[derive(Debug, Serialize)]
pub struct NamespaceExport {
    pub namespace: String,
    pub qualifiers: Vec<QualifierExport>,
    pub classes: Vec<ClassExport>,
    pub instances: Vec<InstanceExport>,
}

impl NamespaceExport {
    /// Snapshot a namespace into export form.
    pub fn from_namespace(namespace: &Namespace) -> Self {
        Self {
            namespace: namespace.name().to_string(),
            qualifiers: namespace
                .qualifiers()
                .iter()
                .map(QualifierExport::from_declaration)
                .collect(),
            classes: namespace
                .schema()
                .class_names()
                .filter_map(|name| namespace.class(name))
                .map(ClassExport::from_class)
                .collect(),
            instances: namespace
                .instances()
                .iter()
                .map(InstanceExport::from_instance)
                .collect(),
        }
    }
}

impl QualifierExport {
    fn from_declaration(declaration: &QualifierDeclaration) -> Self {
        Self {
            name: declaration.name.clone(),
            ty: declaration.ty.as_keyword(),
            is_array: declaration.is_array,
            default: declaration.default.clone(),
            scopes: declaration.scopes.keywords(),
            flavors: declaration.flavors.keywords(),
        }
    }
}

fn qualifier_entries(qualifiers: &QualifierSet) -> Vec<QualifierEntry> {
    qualifiers
        .iter()
        .map(|qualifier| QualifierEntry {
            name: qualifier.name.clone(),
            value: qualifier.value.clone(),
            propagated: qualifier.propagated,
        })
        .collect()
}

impl PropertyExport {
    fn from_property(property: &CimProperty) -> Self {
        Self::from_parts(&property.name, &property.kind, property.default.clone(), &property.qualifiers)
    }

    fn from_parts(
        name: &SmolStr,
        kind: &PropertyKind,
        default: Option<CimValue>,
        qualifiers: &QualifierSet,
    ) -> Self {
        let (ty, is_array, reference_class) = match kind {
            PropertyKind::Data { ty, is_array, .. } => {
                (ty.as_keyword().to_string(), *is_array, None)
            }
            PropertyKind::Reference { class_name } => {
                ("ref".to_string(), false, Some(class_name.clone()))
            }
        };
        Self {
            name: name.clone(),
            ty,
            is_array,
            reference_class,
            default,
            qualifiers: qualifier_entries(qualifiers),
        }
    }
}

impl MethodExport {
    fn from_method(method: &CimMethod) -> Self {
        Self {
            name: method.name.clone(),
            return_type: method.return_type.as_keyword(),
            parameters: method
                .parameters
                .iter()
                .map(|parameter| {
                    PropertyExport::from_parts(
                        &parameter.name,
                        &parameter.kind,
                        None,
                        &parameter.qualifiers,
                    )
                })
                .collect(),
            qualifiers: qualifier_entries(&method.qualifiers),
        }
    }
}

impl ClassExport {
    fn from_class(class: &CimClass) -> Self {
        Self {
            name: class.name.clone(),
            superclass: class.superclass.clone(),
            association: class.is_association(),
            indication: class.is_indication(),
            qualifiers: qualifier_entries(&class.qualifiers),
            properties: class
                .properties
                .values()
                .map(PropertyExport::from_property)
                .collect(),
            methods: class.methods.values().map(MethodExport::from_method).collect(),
        }
    }
}

impl InstanceExport {
    fn from_instance(instance: &CimInstance) -> Self {
        Self {
            class_name: instance.class_name.clone(),
            path: instance.path.to_string(),
            properties: instance
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }
}
