//! Rendering model objects back to MOF text.
//!
//! The output is normalized (canonical whitespace, explicit flavor
//! clauses) but semantically faithful: re-compiling the rendered text
//! yields an equivalent declaration.

use std::fmt::Write;

use super::class::{CimClass, CimMethod, CimParameter, CimProperty, PropertyKind};
use super::instance::CimInstance;
use super::qualifier::{QualifierDeclaration, QualifierSet};
use super::types::CimValue;

/// Render a model object to MOF source text.
pub trait ToMof {
    fn write_mof(&self, out: &mut String);

    fn to_mof(&self) -> String {
        let mut out = String::new();
        self.write_mof(&mut out);
        out
    }
}

fn write_value(out: &mut String, value: &CimValue) {
    match value {
        CimValue::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
        CimValue::Integer(i) => {
            let _ = write!(out, "{i}");
        }
        CimValue::Real(r) => {
            // Keep a decimal point so the literal stays a real
            if r.fract() == 0.0 && r.is_finite() {
                let _ = write!(out, "{r:.1}");
            } else {
                let _ = write!(out, "{r}");
            }
        }
        CimValue::String(s) | CimValue::DateTime(s) => write_quoted(out, s),
        CimValue::Char16(c) => {
            let _ = write!(out, "'{c}'");
        }
        CimValue::Reference(path) => write_quoted(out, &path.to_string()),
        CimValue::Array(items) => {
            out.push_str("{ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push_str(" }");
        }
    }
}

fn write_quoted(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Write `[Qual1, Qual2 ("value")]` ahead of a declaration.
///
/// Propagated entries are skipped — rendering reproduces the declared
/// form, not the flattened view. Boolean-true applications render bare,
/// matching the conventional MOF spelling (`[Key]`).
fn write_qualifier_list(out: &mut String, qualifiers: &QualifierSet, indent: &str) {
    let declared: Vec<_> = qualifiers.iter().filter(|q| !q.propagated).collect();
    if declared.is_empty() {
        return;
    }
    out.push_str(indent);
    out.push('[');
    for (i, qualifier) in declared.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&qualifier.name);
        match &qualifier.value {
            None | Some(CimValue::Boolean(true)) => {}
            Some(array @ CimValue::Array(_)) => {
                out.push(' ');
                write_value(out, array);
            }
            Some(value) => {
                out.push_str(" (");
                write_value(out, value);
                out.push(')');
            }
        }
    }
    out.push_str("]\n");
}

impl ToMof for QualifierDeclaration {
    fn write_mof(&self, out: &mut String) {
        let _ = write!(out, "Qualifier {} : {}", self.name, self.ty.as_keyword());
        if self.is_array {
            out.push_str("[]");
        }
        out.push_str(" = ");
        match &self.default {
            Some(value) => write_value(out, value),
            None => out.push_str("null"),
        }
        let _ = write!(out, ",\n    Scope({})", self.scopes.keywords().join(", "));
        let _ = write!(out, ",\n    Flavor({})", self.flavors.keywords().join(", "));
        out.push_str(";\n");
    }
}

impl ToMof for CimProperty {
    fn write_mof(&self, out: &mut String) {
        write_qualifier_list(out, &self.qualifiers, "      ");
        out.push_str("   ");
        match &self.kind {
            PropertyKind::Data {
                ty,
                is_array,
                array_size,
            } => {
                let _ = write!(out, "{} {}", ty.as_keyword(), self.name);
                if *is_array {
                    match array_size {
                        Some(size) => {
                            let _ = write!(out, "[{size}]");
                        }
                        None => out.push_str("[]"),
                    }
                }
            }
            PropertyKind::Reference { class_name } => {
                let _ = write!(out, "{} REF {}", class_name, self.name);
            }
        }
        if let Some(default) = &self.default {
            out.push_str(" = ");
            write_value(out, default);
        }
        out.push_str(";\n");
    }
}

impl ToMof for CimMethod {
    fn write_mof(&self, out: &mut String) {
        write_qualifier_list(out, &self.qualifiers, "      ");
        let _ = write!(out, "   {} {}(", self.return_type.as_keyword(), self.name);
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('\n');
            parameter.write_mof(out);
        }
        out.push_str(");\n");
    }
}

impl ToMof for CimParameter {
    fn write_mof(&self, out: &mut String) {
        write_qualifier_list(out, &self.qualifiers, "        ");
        out.push_str("      ");
        match &self.kind {
            PropertyKind::Data {
                ty,
                is_array,
                array_size,
            } => {
                let _ = write!(out, "{} {}", ty.as_keyword(), self.name);
                if *is_array {
                    match array_size {
                        Some(size) => {
                            let _ = write!(out, "[{size}]");
                        }
                        None => out.push_str("[]"),
                    }
                }
            }
            PropertyKind::Reference { class_name } => {
                let _ = write!(out, "{} REF {}", class_name, self.name);
            }
        }
    }
}

impl ToMof for CimClass {
    fn write_mof(&self, out: &mut String) {
        write_qualifier_list(out, &self.qualifiers, "");
        let _ = write!(out, "class {}", self.name);
        if let Some(superclass) = &self.superclass {
            let _ = write!(out, " : {superclass}");
        }
        out.push_str(" {\n");
        for property in self.properties.values() {
            out.push('\n');
            property.write_mof(out);
        }
        for method in self.methods.values() {
            out.push('\n');
            method.write_mof(out);
        }
        out.push_str("};\n");
    }
}

impl ToMof for CimInstance {
    fn write_mof(&self, out: &mut String) {
        let _ = write!(out, "instance of {} {{\n", self.class_name);
        for (name, value) in self.iter() {
            let _ = write!(out, "   {name} = ");
            write_value(out, value);
            out.push_str(";\n");
        }
        out.push_str("};\n");
    }
}
