//! Instance Store Tests
//!
//! Instance creation and validation against the schema, path identity,
//! alias resolution order, and enumeration with subclasses.

#[path = "helpers/mod.rs"]
mod helpers;

use rstest::rstest;
use cimof::model::{CimValue, InstancePath};
use cimof::{ModelError, MofCompiler, Repository};

fn compile_into(repository: &mut Repository, source: &str) -> Result<(), ModelError> {
    MofCompiler::new(repository).compile_str(source)
}

// ============================================================================
// Creation and lookup
// ============================================================================

#[test]
fn test_get_instance_by_path() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let mike = namespace.instance(&helpers::person_path("Mike")).unwrap();
    assert_eq!(mike.class_name, "TST_Person");
    assert_eq!(
        mike.property("name"),
        Some(&CimValue::String("Mike".into()))
    );
    assert_eq!(
        mike.property("likes"),
        Some(&CimValue::Array(vec![
            CimValue::String("running".into()),
            CimValue::String("cycling".into()),
        ]))
    );
}

#[test]
fn test_path_lookup_is_case_insensitive_on_names() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let path = InstancePath::new(
        "tst_person",
        vec![("NAME".into(), CimValue::String("Mike".into()))],
    );
    assert!(namespace.instance(&path).is_some());

    // Key values stay case-sensitive
    let path = InstancePath::new(
        "TST_Person",
        vec![("name".into(), CimValue::String("mike".into()))],
    );
    assert!(namespace.instance(&path).is_none());
}

#[test]
fn test_reference_properties_resolve_to_paths() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let lineages = namespace.enumerate_instances("TST_Lineage", false).unwrap();
    assert_eq!(lineages.len(), 3);
    let mike_sofi = lineages
        .iter()
        .find(|i| i.property("InstanceID") == Some(&CimValue::String("MikeSofi".into())))
        .unwrap();
    assert_eq!(
        mike_sofi.property("parent"),
        Some(&CimValue::Reference(helpers::person_path("Mike")))
    );
}

// ============================================================================
// Enumeration with subclasses
// ============================================================================

#[test]
fn test_enumerate_instances_shallow() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let people = namespace.enumerate_instances("TST_Person", false).unwrap();
    assert_eq!(people.len(), 4);
    assert!(people.iter().all(|i| i.class_name == "TST_Person"));
}

#[test]
fn test_enumerate_instances_deep_keyed_by_own_class() {
    let repository = helpers::simple_repository();
    let namespace = repository.default_namespace();

    let people = namespace.enumerate_instances("TST_Person", true).unwrap();
    assert_eq!(people.len(), 5);

    let subclass_instance = people
        .iter()
        .find(|i| i.property("name") == Some(&CimValue::String("Mikesub".into())))
        .unwrap();
    assert_eq!(subclass_instance.class_name, "TST_Personsub");
    assert_eq!(subclass_instance.path.class_name, "TST_Personsub");
}

#[test]
fn test_enumerate_instances_unknown_class() {
    let repository = helpers::simple_repository();
    let err = repository
        .default_namespace()
        .enumerate_instances("TST_Missing", true)
        .unwrap_err();
    assert_eq!(err, ModelError::UnknownClass("TST_Missing".into()));
}

// ============================================================================
// Validation errors
// ============================================================================

#[rstest]
#[case(
    "instance of TST_Person {\n    name = \"Pat\";\n    shoeSize = 42;\n};\n",
    ModelError::UnknownProperty {
        class: "TST_Person".into(),
        property: "shoeSize".into(),
    }
)]
#[case(
    "instance of TST_Person {\n    extraProperty = \"no key\";\n};\n",
    ModelError::MissingKeyProperty {
        class: "TST_Person".into(),
        property: "name".into(),
    }
)]
#[case(
    "instance of TST_Missing {\n    name = \"Pat\";\n};\n",
    ModelError::UnknownClass("TST_Missing".into())
)]
#[case(
    "instance of TST_Person {\n    name = \"Mike\";\n};\n",
    ModelError::DuplicateInstance("TST_Person.name=\"Mike\"".into())
)]
fn test_instance_validation_errors(#[case] source: &str, #[case] expected: ModelError) {
    let mut repository = helpers::simple_repository();
    let err = compile_into(&mut repository, source).unwrap_err();
    assert_eq!(err, expected);
}

#[rstest]
#[case("instance of TST_Person {\n    name = 42;\n};\n")]
#[case("instance of TST_Person {\n    name = \"Pat\";\n    likes = \"not an array\";\n};\n")]
#[case("instance of CIM_Foo {\n    InstanceID = \"f\";\n    IntegerProp = -1;\n};\n")]
fn test_instance_type_mismatches(#[case] source: &str) {
    let mut repository = helpers::simple_repository();
    let err = compile_into(&mut repository, source).unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { .. }), "{err:?}");
}

#[test]
fn test_reference_must_match_declared_class() {
    let mut repository = helpers::simple_repository();
    // family expects a TST_FamilyCollection, not a person
    let err = compile_into(
        &mut repository,
        "instance of TST_MemberOfFamilyCollection {\n\
         \x20   family = \"TST_Person.name=\\\"Mike\\\"\";\n\
         \x20   member = \"TST_Person.name=\\\"Sofi\\\"\";\n\
         };\n",
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::TypeMismatch { .. }), "{err:?}");
}

#[test]
fn test_reference_as_object_path_string() {
    let mut repository = helpers::simple_repository();
    compile_into(
        &mut repository,
        "instance of TST_Lineage {\n\
         \x20   InstanceID = \"SaaraGabi\";\n\
         \x20   parent = \"TST_Person.name=\\\"Saara\\\"\";\n\
         \x20   child = \"TST_Person.name=\\\"Gabi\\\"\";\n\
         };\n",
    )
    .unwrap();

    let namespace = repository.default_namespace();
    let lineages = namespace.enumerate_instances("TST_Lineage", false).unwrap();
    let saara_gabi = lineages
        .iter()
        .find(|i| i.property("InstanceID") == Some(&CimValue::String("SaaraGabi".into())))
        .unwrap();
    assert_eq!(
        saara_gabi.property("parent"),
        Some(&CimValue::Reference(helpers::person_path("Saara")))
    );
}

// ============================================================================
// Aliases
// ============================================================================

#[test]
fn test_alias_must_precede_use() {
    let mut repository = helpers::simple_repository();
    let err = compile_into(
        &mut repository,
        "instance of TST_Lineage {\n\
         \x20   InstanceID = \"Early\";\n\
         \x20   parent = $NotYetDeclared;\n\
         \x20   child = $AlsoMissing;\n\
         };\n\
         instance of TST_Person as $NotYetDeclared { name = \"Late\"; };\n",
    )
    .unwrap_err();
    assert_eq!(err, ModelError::UnresolvedReference("NotYetDeclared".into()));
}

#[test]
fn test_duplicate_alias_in_batch() {
    let mut repository = helpers::simple_repository();
    let err = compile_into(
        &mut repository,
        "instance of TST_Person as $Twin { name = \"TwinA\"; };\n\
         instance of TST_Person as $Twin { name = \"TwinB\"; };\n",
    )
    .unwrap_err();
    assert_eq!(err, ModelError::DuplicateAlias("Twin".into()));
}

#[test]
fn test_alias_scoped_per_batch() {
    let mut repository = helpers::simple_repository();
    // $Mike was an alias of the fixture batch; a later batch cannot see it
    let err = compile_into(
        &mut repository,
        "instance of TST_Lineage {\n\
         \x20   InstanceID = \"Late\";\n\
         \x20   parent = $Mike;\n\
         \x20   child = $Sofi;\n\
         };\n",
    )
    .unwrap_err();
    assert_eq!(err, ModelError::UnresolvedReference("Mike".into()));
}

#[test]
fn test_explicit_null_leaves_property_unset() {
    let mut repository = helpers::simple_repository();
    compile_into(
        &mut repository,
        "instance of TST_Person {\n    name = \"Pat\";\n    extraProperty = NULL;\n};\n",
    )
    .unwrap();
    let namespace = repository.default_namespace();
    let pat = namespace.instance(&helpers::person_path("Pat")).unwrap();
    assert_eq!(pat.property("extraProperty"), None);
}
