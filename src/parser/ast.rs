//! Typed AST for MOF compilation units.
//!
//! The AST is purely syntactic: qualifier applications are unresolved
//! name/value pairs, alias references are unresolved `$names`, and no
//! schema checks have happened yet. The repository layer turns these
//! into validated model objects.

use smol_str::SmolStr;
use text_size::TextRange;

use crate::model::{CimType, FlavorSet, PropertyKind, ScopeSet};

/// One parsed MOF compilation unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MofFile {
    pub productions: Vec<Production>,
}

/// A top-level MOF production, in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum Production {
    Pragma(PragmaDirective),
    Qualifier(QualifierDecl),
    Class(ClassDecl),
    Instance(InstanceDecl),
}

/// `#pragma name ("argument")`
#[derive(Debug, Clone, PartialEq)]
pub struct PragmaDirective {
    pub name: SmolStr,
    pub argument: String,
    pub span: TextRange,
}

/// `Qualifier Name : type = default, Scope(...), Flavor(...);`
///
/// `flavors` holds exactly what the Flavor clause said (empty when the
/// clause was absent); defaults are filled in during registration.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifierDecl {
    pub name: SmolStr,
    pub ty: CimType,
    pub is_array: bool,
    pub default: Option<AstValue>,
    pub scopes: ScopeSet,
    pub flavors: FlavorSet,
    pub span: TextRange,
}

/// A qualifier application: `Key`, `Description("...")`, `Values {...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedQualifierAst {
    pub name: SmolStr,
    pub value: Option<AstValue>,
    pub span: TextRange,
}

/// `[quals] class Name : Super { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub qualifiers: Vec<AppliedQualifierAst>,
    pub name: SmolStr,
    pub superclass: Option<SmolStr>,
    pub features: Vec<ClassFeature>,
    pub span: TextRange,
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassFeature {
    Property(PropertyDecl),
    Method(MethodDecl),
}

/// `[quals] type name[] = default;` or `[quals] Class REF name;`
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub qualifiers: Vec<AppliedQualifierAst>,
    pub kind: PropertyKind,
    pub name: SmolStr,
    pub default: Option<AstValue>,
    pub span: TextRange,
}

/// `[quals] rtype Name(param, ...);`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub qualifiers: Vec<AppliedQualifierAst>,
    pub return_type: CimType,
    pub name: SmolStr,
    pub parameters: Vec<ParameterDecl>,
    pub span: TextRange,
}

/// A method parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub qualifiers: Vec<AppliedQualifierAst>,
    pub kind: PropertyKind,
    pub name: SmolStr,
    pub span: TextRange,
}

/// `instance of Class as $Alias { prop = value; ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDecl {
    pub qualifiers: Vec<AppliedQualifierAst>,
    pub class_name: SmolStr,
    pub alias: Option<SmolStr>,
    pub property_values: Vec<PropertyValueAst>,
    pub span: TextRange,
}

/// One `name = value;` binding in an instance body.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValueAst {
    pub name: SmolStr,
    pub value: AstValue,
    pub span: TextRange,
}

/// A literal value as written in MOF.
///
/// `Alias` is an unresolved `$name`; `Null` is the explicit NULL keyword.
/// Integers are widened to `i128` so every CIM width fits.
#[derive(Debug, Clone, PartialEq)]
pub enum AstValue {
    Boolean(bool),
    Integer(i128),
    Real(f64),
    String(String),
    Char(char),
    Null,
    Alias(SmolStr),
    Array(Vec<AstValue>),
}
