//! Compiler Tests
//!
//! Batch loading semantics: all-or-nothing per file, alias scoping
//! across a multi-file batch, namespace targeting, and file IO errors.

#[path = "helpers/mod.rs"]
mod helpers;

use std::fs;
use std::path::PathBuf;

use cimof::model::CimValue;
use cimof::{ModelError, MofCompiler, Repository};

/// Write a set of (name, content) files into a temp dir.
fn write_files(dir: &tempfile::TempDir, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).expect("write fixture file");
            path
        })
        .collect()
}

// ============================================================================
// All-or-nothing loads
// ============================================================================

#[test]
fn test_failed_load_leaves_repository_untouched() {
    let mut repository = helpers::simple_repository();
    let snapshot = repository.clone();

    // The class would be fine; the instance afterwards is not.
    let err = MofCompiler::new(&mut repository)
        .compile_str(
            "class TST_NewThing {\n\
             \x20   [Key] string id;\n\
             };\n\
             instance of TST_NewThing {\n\
             \x20   wrongProperty = 1;\n\
             };\n",
        )
        .unwrap_err();
    assert!(matches!(err, ModelError::UnknownProperty { .. }), "{err:?}");

    // Nothing from the failed batch is visible, not even the class.
    assert_eq!(repository, snapshot);
    assert!(repository.default_namespace().class("TST_NewThing").is_none());
}

#[test]
fn test_syntax_error_aborts_with_position() {
    let mut repository = Repository::new();
    let err = MofCompiler::new(&mut repository)
        .compile_str("class TST_Broken {\n    string name\n};\n")
        .unwrap_err();
    match err {
        ModelError::Syntax { line, .. } => assert_eq!(line, 3),
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_multi_file_batch_commits_per_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(
        &dir,
        &[
            (
                "10_schema.mof",
                "Qualifier Key : boolean = false, Scope(property, reference),\n\
                 \x20   Flavor(DisableOverride, ToSubclass);\n\
                 class TST_Widget {\n\
                 \x20   [Key] string id;\n\
                 };\n",
            ),
            (
                "20_instances.mof",
                "instance of TST_Widget { id = \"w1\"; };\n\
                 instance of TST_Widget { wrong = 1; };\n",
            ),
        ],
    );

    let mut repository = Repository::new();
    let err = MofCompiler::new(&mut repository)
        .compile_files(&paths)
        .unwrap_err();
    assert!(matches!(err, ModelError::UnknownProperty { .. }), "{err:?}");

    // The schema file committed; the failing instance file did not,
    // including its first (valid) instance.
    let namespace = repository.default_namespace();
    assert!(namespace.class("TST_Widget").is_some());
    assert!(namespace.instances().is_empty());
}

// ============================================================================
// Alias scoping across files
// ============================================================================

#[test]
fn test_aliases_span_files_within_a_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(
        &dir,
        &[
            (
                "10_schema.mof",
                "Qualifier Key : boolean = false, Scope(property, reference),\n\
                 \x20   Flavor(DisableOverride, ToSubclass);\n\
                 Qualifier Association : boolean = false, Scope(association),\n\
                 \x20   Flavor(DisableOverride, ToSubclass);\n\
                 class TST_Node {\n\
                 \x20   [Key] string id;\n\
                 };\n\
                 [Association]\n\
                 class TST_Edge {\n\
                 \x20   [Key] TST_Node REF from;\n\
                 \x20   [Key] TST_Node REF to;\n\
                 };\n\
                 instance of TST_Node as $A { id = \"a\"; };\n",
            ),
            (
                "20_edges.mof",
                "instance of TST_Node as $B { id = \"b\"; };\n\
                 instance of TST_Edge { from = $A; to = $B; };\n",
            ),
        ],
    );

    let mut repository = Repository::new();
    MofCompiler::new(&mut repository).compile_files(&paths).unwrap();
    let namespace = repository.default_namespace();
    assert_eq!(namespace.enumerate_instances("TST_Edge", false).unwrap().len(), 1);
}

#[test]
fn test_aliases_do_not_leak_between_batches() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(
        &dir,
        &[(
            "10_schema.mof",
            "Qualifier Key : boolean = false, Scope(property, reference),\n\
             \x20   Flavor(DisableOverride, ToSubclass);\n\
             class TST_Node {\n\
             \x20   [Key] string id;\n\
             };\n\
             instance of TST_Node as $A { id = \"a\"; };\n",
        )],
    );

    let mut repository = Repository::new();
    let mut compiler = MofCompiler::new(&mut repository);
    compiler.compile_files(&paths).unwrap();

    let err = compiler
        .compile_str("instance of TST_Node { id = $A; };\n")
        .unwrap_err();
    assert_eq!(err, ModelError::UnresolvedReference("A".into()));
}

// ============================================================================
// Namespaces and IO
// ============================================================================

#[test]
fn test_compile_into_named_namespace() {
    let mut repository = Repository::new();
    MofCompiler::new(&mut repository)
        .with_namespace("root/test")
        .compile_str(helpers::SIMPLE_MODEL)
        .unwrap();

    // The default namespace stays empty; the target holds the model.
    assert!(repository.default_namespace().schema().is_empty());
    let namespace = repository.namespace("root/test").unwrap();
    assert!(namespace.class("TST_Person").is_some());
    assert_eq!(
        namespace
            .instance(&helpers::person_path("Mike"))
            .and_then(|i| i.property("name")),
        Some(&CimValue::String("Mike".into()))
    );
}

#[test]
fn test_unknown_namespace_lookup() {
    let repository = Repository::new();
    let err = repository.namespace("root/missing").unwrap_err();
    assert_eq!(err, ModelError::UnknownNamespace("root/missing".into()));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let mut repository = Repository::new();
    let err = MofCompiler::new(&mut repository)
        .compile_file("/nonexistent/model.mof")
        .unwrap_err();
    assert!(matches!(err, ModelError::Io { .. }), "{err:?}");
}

#[test]
fn test_compile_directory_of_fixtures() {
    // Collect every .mof under tests/fixtures, as a mock environment
    // would on startup.
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(&fixtures)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "mof"))
        .map(|e| e.into_path())
        .collect();
    paths.sort();

    let mut repository = Repository::new();
    MofCompiler::new(&mut repository).compile_files(&paths).unwrap();
    assert!(!repository.default_namespace().schema().is_empty());
}
