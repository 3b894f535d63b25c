//! Schema Tests - Inheritance and Effective Views
//!
//! Class definition against the qualifier registry: inheritance
//! flattening, qualifier propagation, DisableOverride enforcement, and
//! association validation.

#[path = "helpers/mod.rs"]
mod helpers;

use rstest::rstest;
use cimof::model::CimValue;
use cimof::{ModelError, MofCompiler, Repository};

/// Qualifier declarations shared by the schema snippets below.
const QUALIFIERS: &str = "\
Qualifier Association : boolean = false, Scope(association), Flavor(DisableOverride, ToSubclass);
Qualifier Description : string = null, Scope(any), Flavor(EnableOverride, ToSubclass, Translatable);
Qualifier Key : boolean = false, Scope(property, reference), Flavor(DisableOverride, ToSubclass);
Qualifier Version : string = null, Scope(class), Flavor(EnableOverride, Restricted);
";

/// Helper to compile a snippet (after the shared qualifiers) into a
/// fresh repository
fn compile(schema: &str) -> Result<Repository, ModelError> {
    let mut repository = Repository::new();
    MofCompiler::new(&mut repository).compile_str(&format!("{QUALIFIERS}{schema}"))?;
    Ok(repository)
}

// ============================================================================
// Property inheritance
// ============================================================================

#[test]
fn test_subclass_sees_inherited_properties() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let effective = namespace.effective_class("TST_Personsub").unwrap();
    // Own properties plus everything from TST_Person
    for name in ["name", "extraProperty", "likes", "secondProperty", "counter"] {
        assert!(effective.property(name).is_some(), "missing property {name}");
    }

    let inherited = effective.property("name").unwrap();
    assert!(inherited.propagated);
    assert_eq!(inherited.class_origin, "TST_Person");
    assert!(inherited.property.is_key());

    let own = effective.property("counter").unwrap();
    assert!(!own.propagated);
    assert_eq!(own.class_origin, "TST_Personsub");
}

#[test]
fn test_declared_class_keeps_local_properties_only() {
    let repository = helpers::simple_repository();
    let class = repository.default_namespace().class("TST_Personsub").unwrap();
    assert!(class.property("secondProperty").is_some());
    assert!(class.property("name").is_none());
}

#[test]
fn test_inheritance_chain_is_flattened_once() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let effective = namespace.effective_class("CIM_Foo_sub_sub").unwrap();
    assert_eq!(effective.property("InstanceID").unwrap().class_origin, "CIM_Foo");
    assert_eq!(effective.property("cimfoo_sub").unwrap().class_origin, "CIM_Foo_sub");
    assert!(effective.property("cimfoo_sub_sub").is_some());

    // Methods propagate too
    let fuzzy = effective.methods.get("fuzzy").unwrap();
    assert!(fuzzy.propagated);
    assert_eq!(fuzzy.class_origin, "CIM_Foo");
}

#[test]
fn test_property_override_keeps_type_and_merges_qualifiers() {
    let repository = compile(
        "class TST_Base {\n\
         \x20   [Key] string id;\n\
         \x20   [Description (\"base\")] string color = \"red\";\n\
         };\n\
         class TST_Derived : TST_Base {\n\
         \x20   [Description (\"derived\")] string color;\n\
         };\n",
    )
    .unwrap();
    let namespace = repository.default_namespace();

    let effective = namespace.effective_class("TST_Derived").unwrap();
    let color = effective.property("color").unwrap();
    assert!(!color.propagated);
    assert_eq!(color.class_origin, "TST_Derived");
    // Overriding without a default inherits the base default
    assert_eq!(color.property.default, Some(CimValue::String("red".into())));
    assert_eq!(
        color.property.qualifiers.get("Description").unwrap().value,
        Some(CimValue::String("derived".into()))
    );
}

#[test]
fn test_property_override_cannot_change_type() {
    let err = compile(
        "class TST_Base {\n\
         \x20   [Key] string id;\n\
         \x20   string color;\n\
         };\n\
         class TST_Derived : TST_Base {\n\
         \x20   uint32 color;\n\
         };\n",
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { .. }), "{err:?}");
}

// ============================================================================
// Qualifier propagation and override rules
// ============================================================================

#[test]
fn test_disable_override_qualifier_is_locked() {
    let err = compile(
        "class TST_Base {\n\
         \x20   [Key] string id;\n\
         };\n\
         class TST_Derived : TST_Base {\n\
         \x20   [Key (false)] string id;\n\
         };\n",
    )
    .unwrap_err();
    assert_eq!(
        err,
        ModelError::QualifierOverrideViolation {
            class: "TST_Derived".into(),
            element: "TST_Derived.id".into(),
            qualifier: "Key".into(),
        }
    );
}

#[test]
fn test_disable_override_qualifier_may_be_restated() {
    let repository = compile(
        "class TST_Base {\n\
         \x20   [Key] string id;\n\
         };\n\
         class TST_Derived : TST_Base {\n\
         \x20   [Key] string id;\n\
         };\n",
    )
    .unwrap();
    let namespace = repository.default_namespace();
    let effective = namespace.effective_class("TST_Derived").unwrap();
    assert!(effective.property("id").unwrap().property.is_key());
}

#[test]
fn test_enable_override_qualifier_can_change() {
    let repository = compile(
        "[Description (\"base class\")]\n\
         class TST_Base {\n\
         \x20   [Key] string id;\n\
         };\n\
         [Description (\"derived class\")]\n\
         class TST_Derived : TST_Base {\n\
         };\n",
    )
    .unwrap();
    let namespace = repository.default_namespace();
    let effective = namespace.effective_class("TST_Derived").unwrap();
    assert_eq!(
        effective.qualifiers.get("Description").unwrap().value,
        Some(CimValue::String("derived class".into()))
    );
}

#[test]
fn test_restricted_qualifier_does_not_propagate() {
    let repository = compile(
        "[Version (\"1.0\")]\n\
         class TST_Base {\n\
         \x20   [Key] string id;\n\
         };\n\
         class TST_Derived : TST_Base {\n\
         };\n",
    )
    .unwrap();
    let namespace = repository.default_namespace();

    let base = namespace.effective_class("TST_Base").unwrap();
    assert!(base.qualifiers.contains("Version"));

    let derived = namespace.effective_class("TST_Derived").unwrap();
    assert!(!derived.qualifiers.contains("Version"));
}

#[test]
fn test_association_marker_propagates_to_subclass() {
    let repository = compile(
        "class TST_Thing {\n\
         \x20   [Key] string name;\n\
         };\n\
         [Association]\n\
         class TST_Link {\n\
         \x20   [Key] TST_Thing REF one;\n\
         \x20   [Key] TST_Thing REF other;\n\
         };\n\
         class TST_LinkSub : TST_Link {\n\
         };\n",
    )
    .unwrap();
    let namespace = repository.default_namespace();
    assert!(namespace.effective_class("TST_LinkSub").unwrap().is_association());
}

// ============================================================================
// Definition errors
// ============================================================================

#[test]
fn test_unknown_superclass() {
    let err = compile("class TST_Orphan : TST_Missing {\n};\n").unwrap_err();
    assert_eq!(
        err,
        ModelError::UnknownSuperclass {
            class: "TST_Orphan".into(),
            superclass: "TST_Missing".into(),
        }
    );
}

#[test]
fn test_duplicate_class() {
    let err = compile("class TST_Twice {\n};\nclass TST_Twice {\n};\n").unwrap_err();
    assert_eq!(err, ModelError::DuplicateClass("TST_Twice".into()));
}

#[test]
fn test_unknown_qualifier_application() {
    let err = compile("[Sparkly]\nclass TST_Plain {\n};\n").unwrap_err();
    assert_eq!(err, ModelError::UnknownQualifier("Sparkly".into()));
}

#[test]
fn test_qualifier_scope_is_enforced() {
    // Association has Scope(association); applying it to a property is
    // rejected.
    let err = compile(
        "class TST_Plain {\n\
         \x20   [Association] string name;\n\
         };\n",
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::IllegalScopeFlavor { .. }), "{err:?}");
}

#[rstest]
#[case("[Association]\nclass TST_Bad {\n    [Key] string id;\n};\n")]
#[case(
    "class TST_Thing {\n    [Key] string name;\n};\n\
     [Association]\nclass TST_Bad {\n    [Key] TST_Thing REF only;\n};\n"
)]
fn test_association_needs_two_reference_keys(#[case] schema: &str) {
    let err = compile(schema).unwrap_err();
    assert!(matches!(err, ModelError::InvalidAssociation { .. }), "{err:?}");
}

#[test]
fn test_reference_property_outside_association() {
    let err = compile(
        "class TST_Thing {\n    [Key] string name;\n};\n\
         class TST_Holder {\n    TST_Thing REF thing;\n};\n",
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidAssociation { .. }), "{err:?}");
}

// ============================================================================
// Enumeration
// ============================================================================

#[test]
fn test_enumerate_top_level_classes() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let top: Vec<_> = namespace
        .enumerate_classes(None, false)
        .unwrap()
        .iter()
        .map(|c| c.name.to_string())
        .collect();
    assert!(top.contains(&"CIM_Foo".to_string()));
    assert!(top.contains(&"TST_Person".to_string()));
    assert!(!top.contains(&"CIM_Foo_sub".to_string()));
}

#[test]
fn test_enumerate_subclasses() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let next: Vec<_> = namespace
        .enumerate_classes(Some("CIM_Foo"), false)
        .unwrap()
        .iter()
        .map(|c| c.name.to_string())
        .collect();
    assert_eq!(next, vec!["CIM_Foo_sub".to_string()]);

    let deep: Vec<_> = namespace
        .enumerate_classes(Some("CIM_Foo"), true)
        .unwrap()
        .iter()
        .map(|c| c.name.to_string())
        .collect();
    assert_eq!(deep.len(), 2);
    assert!(deep.contains(&"CIM_Foo_sub_sub".to_string()));
}

#[test]
fn test_enumerate_unknown_root() {
    let repository = helpers::simple_repository();
    let err = repository
        .default_namespace()
        .enumerate_classes(Some("TST_Missing"), false)
        .unwrap_err();
    assert_eq!(err, ModelError::UnknownClass("TST_Missing".into()));
}

#[test]
fn test_class_lookup_is_case_insensitive() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();
    let class = namespace.class("tst_person").unwrap();
    assert_eq!(class.name, "TST_Person");
}
