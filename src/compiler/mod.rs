//! Batch compilation of MOF text into a repository.
//!
//! A compiler targets one namespace of one repository. Each `compile_*`
//! call is a *batch*: files parse up front (in parallel for multi-file
//! batches), then apply strictly in file order. Application is staged on
//! a clone of the target namespace and committed per file, so a failed
//! file leaves the repository exactly as the previous file left it —
//! readers never observe partial state.
//!
//! Instance aliases (`as $Name`) are scoped to the batch: an alias may
//! be used by any later declaration of the same batch, including in
//! later files, and is forgotten when the batch ends.

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::path::{Path, PathBuf};

use crate::base::LineIndex;
use crate::error::ModelError;
use crate::model::{
    AppliedQualifier, CimClass, CimMethod, CimParameter, CimProperty, CimValue, InstancePath,
    QualifierDeclaration, QualifierSet, casefold,
};
use crate::parser::{
    AppliedQualifierAst, AstValue, ClassDecl, ClassFeature, InstanceDecl, MofFile, Parse,
    Production, QualifierDecl, parse,
};
use crate::repository::{DEFAULT_NAMESPACE, Namespace, Repository};

/// Aliases declared so far in the current batch.
type AliasTable = FxHashMap<SmolStr, InstancePath>;

/// Compiles MOF into one namespace of a repository.
pub struct MofCompiler<'r> {
    repository: &'r mut Repository,
    namespace: SmolStr,
}

impl<'r> MofCompiler<'r> {
    /// A compiler targeting the default namespace.
    pub fn new(repository: &'r mut Repository) -> Self {
        Self {
            repository,
            namespace: SmolStr::new(DEFAULT_NAMESPACE),
        }
    }

    /// Retarget to `namespace`, creating it if needed.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.repository.create_namespace(namespace);
        self.namespace = SmolStr::new(namespace);
        self
    }

    /// Compile one MOF string as a batch.
    pub fn compile_str(&mut self, source: &str) -> Result<(), ModelError> {
        let mut aliases = AliasTable::default();
        self.compile_unit(source, &mut aliases)
    }

    /// Compile one MOF file as a batch.
    pub fn compile_file(&mut self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        self.compile_files(&[path.as_ref().to_path_buf()])
    }

    /// Compile several MOF files as one batch, in the given order.
    ///
    /// Files parse in parallel; application stays sequential so alias
    /// resolution sees declarations strictly in file order. Each file
    /// commits on success — an error aborts the batch but keeps the
    /// files committed before it.
    pub fn compile_files(&mut self, paths: &[PathBuf]) -> Result<(), ModelError> {
        let sources = paths
            .par_iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .map(|source| (path.clone(), source))
                    .map_err(|err| ModelError::io(path, &err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut aliases = AliasTable::default();
        for (path, source) in &sources {
            tracing::debug!(path = %path.display(), namespace = %self.namespace, "compiling");
            self.compile_unit(source, &mut aliases)?;
        }
        Ok(())
    }

    /// Parse, stage, apply, and commit one compilation unit.
    fn compile_unit(&mut self, source: &str, aliases: &mut AliasTable) -> Result<(), ModelError> {
        let line_index = LineIndex::new(source);
        let Parse { file, mut errors } = parse(source);
        if let Some(error) = errors.drain(..).next() {
            return Err(error.into_model_error(&line_index));
        }

        let mut stage = self.repository.namespace(&self.namespace)?.clone();
        let mut staged_aliases = aliases.clone();
        apply(&mut stage, file, &mut staged_aliases, &line_index)?;

        *self.repository.namespace_mut(&self.namespace)? = stage;
        *aliases = staged_aliases;
        Ok(())
    }
}

/// Apply parsed productions to a staged namespace, in file order.
fn apply(
    stage: &mut Namespace,
    file: MofFile,
    aliases: &mut AliasTable,
    line_index: &LineIndex,
) -> Result<(), ModelError> {
    for production in file.productions {
        match production {
            Production::Pragma(pragma) => {
                // Locale and namespace pragmas are accepted but not
                // acted on; the compile target is fixed per batch.
                tracing::debug!(name = %pragma.name, argument = %pragma.argument, "ignoring pragma");
            }
            Production::Qualifier(declaration) => {
                stage.declare_qualifier(convert_qualifier_decl(declaration, line_index)?)?;
            }
            Production::Class(declaration) => {
                stage.define_class(convert_class_decl(declaration, line_index)?)?;
            }
            Production::Instance(declaration) => {
                apply_instance(stage, declaration, aliases, line_index)?;
            }
        }
    }
    Ok(())
}

fn apply_instance(
    stage: &mut Namespace,
    declaration: InstanceDecl,
    aliases: &mut AliasTable,
    line_index: &LineIndex,
) -> Result<(), ModelError> {
    let mut bindings = Vec::new();
    let mut bound: FxHashSet<SmolStr> = FxHashSet::default();
    for property_value in declaration.property_values {
        if !bound.insert(casefold(&property_value.name)) {
            return Err(syntax_error(
                format!("property '{}' is bound twice", property_value.name),
                property_value.span,
                line_index,
            ));
        }
        // An explicit NULL leaves the property unset.
        let value = convert_value(
            property_value.value,
            Some(aliases),
            property_value.span,
            line_index,
        )?;
        if let Some(value) = value {
            bindings.push((property_value.name, value));
        }
    }

    let path = stage.create_instance(&declaration.class_name, bindings)?;
    if let Some(alias) = declaration.alias {
        let key = casefold(&alias);
        if aliases.contains_key(&key) {
            return Err(ModelError::DuplicateAlias(alias.to_string()));
        }
        aliases.insert(key, path);
    }
    Ok(())
}

// ============================================================
// AST → model conversion
// ============================================================

fn convert_qualifier_decl(
    declaration: QualifierDecl,
    line_index: &LineIndex,
) -> Result<QualifierDeclaration, ModelError> {
    let default = match declaration.default {
        Some(value) => convert_value(value, None, declaration.span, line_index)?,
        None => None,
    };
    Ok(QualifierDeclaration {
        name: declaration.name,
        ty: declaration.ty,
        is_array: declaration.is_array,
        default,
        scopes: declaration.scopes,
        flavors: declaration.flavors,
    })
}

fn convert_class_decl(
    declaration: ClassDecl,
    line_index: &LineIndex,
) -> Result<CimClass, ModelError> {
    let mut properties = indexmap::IndexMap::new();
    let mut methods = indexmap::IndexMap::new();

    for feature in declaration.features {
        match feature {
            ClassFeature::Property(property) => {
                let span = property.span;
                let name = property.name.clone();
                let converted = CimProperty {
                    name: property.name,
                    kind: property.kind,
                    default: match property.default {
                        Some(value) => convert_value(value, None, span, line_index)?,
                        None => None,
                    },
                    qualifiers: convert_applied_qualifiers(property.qualifiers, line_index)?,
                };
                if properties.insert(casefold(&name), converted).is_some() {
                    return Err(syntax_error(
                        format!("property '{name}' is declared twice"),
                        span,
                        line_index,
                    ));
                }
            }
            ClassFeature::Method(method) => {
                let span = method.span;
                let name = method.name.clone();
                let mut parameters = Vec::new();
                for parameter in method.parameters {
                    if parameters
                        .iter()
                        .any(|p: &CimParameter| casefold(&p.name) == casefold(&parameter.name))
                    {
                        return Err(syntax_error(
                            format!("parameter '{}' is declared twice", parameter.name),
                            parameter.span,
                            line_index,
                        ));
                    }
                    parameters.push(CimParameter {
                        name: parameter.name,
                        kind: parameter.kind,
                        qualifiers: convert_applied_qualifiers(parameter.qualifiers, line_index)?,
                    });
                }
                let converted = CimMethod {
                    name: method.name,
                    return_type: method.return_type,
                    parameters,
                    qualifiers: convert_applied_qualifiers(method.qualifiers, line_index)?,
                };
                if methods.insert(casefold(&name), converted).is_some() {
                    return Err(syntax_error(
                        format!("method '{name}' is declared twice"),
                        span,
                        line_index,
                    ));
                }
            }
        }
    }

    Ok(CimClass {
        name: declaration.name,
        superclass: declaration.superclass,
        qualifiers: convert_applied_qualifiers(declaration.qualifiers, line_index)?,
        properties,
        methods,
    })
}

fn convert_applied_qualifiers(
    qualifiers: Vec<AppliedQualifierAst>,
    line_index: &LineIndex,
) -> Result<QualifierSet, ModelError> {
    let mut set = QualifierSet::new();
    for qualifier in qualifiers {
        let value = match qualifier.value {
            Some(value) => convert_value(value, None, qualifier.span, line_index)?,
            None => None,
        };
        set.insert(AppliedQualifier {
            name: qualifier.name,
            value,
            propagated: false,
        });
    }
    Ok(set)
}

/// Convert a literal, resolving aliases against the batch table.
///
/// `aliases` is `None` outside instance bodies, where `$name` values are
/// not meaningful. NULL converts to `None`.
fn convert_value(
    value: AstValue,
    aliases: Option<&AliasTable>,
    span: crate::parser::TextRange,
    line_index: &LineIndex,
) -> Result<Option<CimValue>, ModelError> {
    let converted = match value {
        AstValue::Boolean(b) => CimValue::Boolean(b),
        AstValue::Integer(i) => CimValue::Integer(i),
        AstValue::Real(r) => CimValue::Real(r),
        AstValue::String(s) => CimValue::String(s),
        AstValue::Char(c) => CimValue::Char16(c),
        AstValue::Null => return Ok(None),
        AstValue::Alias(alias) => {
            let path = aliases
                .and_then(|table| table.get(&casefold(&alias)))
                .ok_or_else(|| ModelError::UnresolvedReference(alias.to_string()))?;
            CimValue::Reference(path.clone())
        }
        AstValue::Array(items) => {
            let mut converted = Vec::with_capacity(items.len());
            for item in items {
                match convert_value(item, aliases, span, line_index)? {
                    Some(value) => converted.push(value),
                    None => {
                        return Err(syntax_error(
                            "NULL is not permitted inside array values".into(),
                            span,
                            line_index,
                        ));
                    }
                }
            }
            CimValue::Array(converted)
        }
    };
    Ok(Some(converted))
}

fn syntax_error(
    message: String,
    span: crate::parser::TextRange,
    line_index: &LineIndex,
) -> ModelError {
    let line_col = line_index.line_col(span.start());
    ModelError::Syntax {
        message,
        line: line_col.line + 1,
        column: line_col.col + 1,
    }
}
