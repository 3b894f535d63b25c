//! Parser Tests - Qualifier Declarations
//!
//! Parsing of `Qualifier Name : type = default, Scope(...), Flavor(...);`
//! productions into the typed AST.

use rstest::rstest;
use cimof::model::{CimType, FlavorSet, ScopeSet};
use cimof::parser::{AstValue, Production, QualifierDecl, parse};

/// Helper to parse a single qualifier declaration
fn parse_qualifier(input: &str) -> QualifierDecl {
    let parsed = parse(input);
    assert!(parsed.ok(), "parse errors: {:?}", parsed.errors);
    assert_eq!(parsed.file.productions.len(), 1);
    match parsed.file.productions.into_iter().next() {
        Some(Production::Qualifier(decl)) => decl,
        other => panic!("expected a qualifier declaration, got {other:?}"),
    }
}

// ============================================================================
// Scope and Flavor clauses
// ============================================================================

#[rstest]
#[case(
    "Qualifier Key : boolean = false, Scope(property, reference), Flavor(DisableOverride, ToSubclass);",
    "Key",
    CimType::Boolean,
    ScopeSet::PROPERTY.union(ScopeSet::REFERENCE),
    FlavorSet::DISABLE_OVERRIDE.union(FlavorSet::TO_SUBCLASS)
)]
#[case(
    "Qualifier Association : boolean = false, Scope(association), Flavor(DisableOverride, ToSubclass);",
    "Association",
    CimType::Boolean,
    ScopeSet::ASSOCIATION,
    FlavorSet::DISABLE_OVERRIDE.union(FlavorSet::TO_SUBCLASS)
)]
#[case(
    "Qualifier Description : string = null, Scope(any), Flavor(EnableOverride, ToSubclass, Translatable);",
    "Description",
    CimType::String,
    ScopeSet::ANY,
    FlavorSet::ENABLE_OVERRIDE
        .union(FlavorSet::TO_SUBCLASS)
        .union(FlavorSet::TRANSLATABLE)
)]
fn test_qualifier_declaration(
    #[case] input: &str,
    #[case] name: &str,
    #[case] ty: CimType,
    #[case] scopes: ScopeSet,
    #[case] flavors: FlavorSet,
) {
    let decl = parse_qualifier(input);
    assert_eq!(decl.name, name);
    assert_eq!(decl.ty, ty);
    assert_eq!(decl.scopes, scopes);
    assert_eq!(decl.flavors, flavors);
}

#[test]
fn test_qualifier_without_flavor_clause() {
    let decl = parse_qualifier("Qualifier Units : string = null, Scope(property);");
    // The parser records exactly what was written; defaults are the
    // registry's business.
    assert!(decl.flavors.is_empty());
}

#[test]
fn test_qualifier_defaults() {
    let decl = parse_qualifier("Qualifier In : boolean = true, Scope(parameter);");
    assert_eq!(decl.default, Some(AstValue::Boolean(true)));

    let decl = parse_qualifier("Qualifier Description : string = null, Scope(any);");
    assert_eq!(decl.default, None);
}

#[test]
fn test_array_qualifier() {
    let decl = parse_qualifier("Qualifier Values : string[] = null, Scope(property, method);");
    assert!(decl.is_array);
    assert_eq!(decl.ty, CimType::String);
}

// ============================================================================
// Malformed declarations
// ============================================================================

#[rstest]
#[case("Qualifier : boolean = false, Scope(property);")]
#[case("Qualifier Key boolean, Scope(property);")]
#[case("Qualifier Key : widget = false, Scope(property);")]
#[case("Qualifier Key : boolean = false, Scope(spaceship);")]
#[case("Qualifier Key : boolean = false;")]
fn test_malformed_qualifier_is_an_error(#[case] input: &str) {
    let parsed = parse(input);
    assert!(!parsed.ok(), "expected errors for: {input}");
}

#[test]
fn test_error_position_is_reported() {
    let parsed = parse("Qualifier Key : boolean = false, Scope(spaceship);");
    let error = &parsed.errors[0];
    assert!(error.message.contains("spaceship"), "{}", error.message);
}
