//! Shared test setup.
//!
//! The simple family model is compiled once and cloned per test, so the
//! suite does not re-run the compiler for every case.
#![allow(dead_code)]

use once_cell::sync::Lazy;

use cimof::model::{CimValue, InstancePath};
use cimof::{MofCompiler, Repository};

/// The simple family model fixture source.
pub const SIMPLE_MODEL: &str = include_str!("../fixtures/simple_model.mof");

static SIMPLE_REPOSITORY: Lazy<Repository> = Lazy::new(|| {
    let mut repository = Repository::new();
    MofCompiler::new(&mut repository)
        .compile_str(SIMPLE_MODEL)
        .expect("the simple model fixture compiles");
    repository
});

/// A repository with the simple family model loaded.
pub fn simple_repository() -> Repository {
    SIMPLE_REPOSITORY.clone()
}

/// Path of a `TST_Person` instance keyed by name.
pub fn person_path(name: &str) -> InstancePath {
    InstancePath::new(
        "TST_Person",
        vec![("name".into(), CimValue::String(name.into()))],
    )
}
