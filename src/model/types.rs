//! CIM data types, values, and instance paths.

use smol_str::SmolStr;
use std::fmt;

/// Casefold a CIM name for index keys.
///
/// CIM names are case-insensitive but case-preserving: lookups go through
/// the folded form, display uses the declared spelling.
pub fn casefold(name: &str) -> SmolStr {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        SmolStr::from(name.to_ascii_lowercase())
    } else {
        SmolStr::from(name)
    }
}

/// The CIM intrinsic data types.
///
/// Array-ness is not part of the type; property and parameter declarations
/// carry a separate array marker, mirroring the MOF `type name[]` syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "lowercase"))]
pub enum CimType {
    Boolean,
    String,
    Char16,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Sint8,
    Sint16,
    Sint32,
    Sint64,
    Real32,
    Real64,
    DateTime,
    /// Reference to a class instance; only legal for properties and
    /// parameters declared with `REF`.
    Reference,
}

impl CimType {
    /// Map a MOF type keyword to a data type (case-insensitive).
    ///
    /// `REF` is not included — reference syntax is `ClassName REF name`
    /// and is recognized structurally by the parser.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let ty = match keyword.to_ascii_lowercase().as_str() {
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "char16" => Self::Char16,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "sint8" => Self::Sint8,
            "sint16" => Self::Sint16,
            "sint32" => Self::Sint32,
            "sint64" => Self::Sint64,
            "real32" => Self::Real32,
            "real64" => Self::Real64,
            "datetime" => Self::DateTime,
            _ => return None,
        };
        Some(ty)
    }

    /// The MOF keyword for this type.
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Char16 => "char16",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint8 => "sint8",
            Self::Sint16 => "sint16",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Real32 => "real32",
            Self::Real64 => "real64",
            Self::DateTime => "datetime",
            Self::Reference => "ref",
        }
    }

    /// Whether a scalar value is acceptable for this type.
    ///
    /// Integer widths are range-checked; strings are accepted for
    /// `datetime` (the repository keeps datetimes in their string form).
    /// References additionally need a class check, which only the schema
    /// can do — here they are matched structurally.
    pub fn accepts(&self, value: &CimValue) -> bool {
        match (self, value) {
            (Self::Boolean, CimValue::Boolean(_)) => true,
            (Self::String, CimValue::String(_)) => true,
            (Self::Char16, CimValue::Char16(_)) => true,
            (Self::DateTime, CimValue::DateTime(_) | CimValue::String(_)) => true,
            (Self::Real32 | Self::Real64, CimValue::Real(_)) => true,
            // MOF integer literals are valid reals
            (Self::Real32 | Self::Real64, CimValue::Integer(_)) => true,
            (Self::Uint8, CimValue::Integer(i)) => u8::try_from(*i).is_ok(),
            (Self::Uint16, CimValue::Integer(i)) => u16::try_from(*i).is_ok(),
            (Self::Uint32, CimValue::Integer(i)) => u32::try_from(*i).is_ok(),
            (Self::Uint64, CimValue::Integer(i)) => u64::try_from(*i).is_ok(),
            (Self::Sint8, CimValue::Integer(i)) => i8::try_from(*i).is_ok(),
            (Self::Sint16, CimValue::Integer(i)) => i16::try_from(*i).is_ok(),
            (Self::Sint32, CimValue::Integer(i)) => i32::try_from(*i).is_ok(),
            (Self::Sint64, CimValue::Integer(i)) => i64::try_from(*i).is_ok(),
            (Self::Reference, CimValue::Reference(_)) => true,
            // Object paths may be written as quoted strings in MOF
            (Self::Reference, CimValue::String(s)) => InstancePath::parse(s).is_some(),
            _ => false,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference)
    }
}

impl fmt::Display for CimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// A CIM property, parameter, or qualifier value.
///
/// Integers are widened to `i128` so that every declared width fits; the
/// declared [`CimType`] stays authoritative for range checks and
/// rendering. "No value" is `Option<CimValue>::None` rather than a null
/// variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
#[cfg_attr(feature = "interchange", serde(untagged))]
pub enum CimValue {
    Boolean(bool),
    Integer(i128),
    Real(f64),
    String(String),
    Char16(char),
    DateTime(String),
    Reference(InstancePath),
    Array(Vec<CimValue>),
}

impl CimValue {
    /// Render into a canonical, case-normalized form usable as an index
    /// key. Strings keep their case (CIM key values compare
    /// case-insensitively only for names, not values).
    fn canonical(&self, out: &mut String) {
        use std::fmt::Write;
        match self {
            Self::Boolean(b) => {
                let _ = write!(out, "{b}");
            }
            Self::Integer(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Real(r) => {
                let _ = write!(out, "{r}");
            }
            Self::String(s) | Self::DateTime(s) => {
                let _ = write!(out, "{s:?}");
            }
            Self::Char16(c) => {
                let _ = write!(out, "'{c}'");
            }
            Self::Reference(path) => out.push_str(&path.canonical()),
            Self::Array(items) => {
                out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.canonical(out);
                }
                out.push('}');
            }
        }
    }
}

/// The identity of an instance: class name plus key property bindings.
///
/// Paths are what reference-typed values hold, and what the instance
/// store indexes by. Key bindings are kept sorted by folded property name
/// so that equal paths have equal canonical forms regardless of the order
/// keys were written in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize))]
pub struct InstancePath {
    pub class_name: SmolStr,
    pub keys: Vec<(SmolStr, CimValue)>,
}

impl InstancePath {
    pub fn new(class_name: impl Into<SmolStr>, mut keys: Vec<(SmolStr, CimValue)>) -> Self {
        keys.sort_by(|(a, _), (b, _)| casefold(a).cmp(&casefold(b)));
        Self {
            class_name: class_name.into(),
            keys,
        }
    }

    /// Canonical index form: folded class and key names, stable key order.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        out.push_str(&casefold(&self.class_name));
        for (name, value) in &self.keys {
            out.push('.');
            out.push_str(&casefold(name));
            out.push('=');
            value.canonical(&mut out);
        }
        out
    }

    /// Parse a WBEM untyped object path, `Class.Key="value",Key2=42`.
    ///
    /// This is the form MOF uses when a reference value is written as a
    /// quoted string instead of an alias. Only string, integer, and
    /// boolean key values occur in practice; anything else fails.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        // Strip an optional namespace prefix ("root/cimv2:")
        let text = match text.rsplit_once(':') {
            Some((ns, rest)) if !ns.contains('"') => rest,
            _ => text,
        };
        let (class_name, keys_text) = match text.split_once('.') {
            Some((c, k)) => (c, Some(k)),
            None => (text, None),
        };
        if class_name.is_empty() || !is_cim_name(class_name) {
            return None;
        }
        let mut keys = Vec::new();
        if let Some(keys_text) = keys_text {
            for binding in split_key_bindings(keys_text) {
                let (name, raw) = binding.split_once('=')?;
                let name = name.trim();
                if !is_cim_name(name) {
                    return None;
                }
                let raw = raw.trim();
                let value = if let Some(stripped) = raw.strip_prefix('"') {
                    CimValue::String(stripped.strip_suffix('"')?.replace("\\\"", "\""))
                } else if raw.eq_ignore_ascii_case("true") {
                    CimValue::Boolean(true)
                } else if raw.eq_ignore_ascii_case("false") {
                    CimValue::Boolean(false)
                } else {
                    CimValue::Integer(raw.parse().ok()?)
                };
                keys.push((SmolStr::from(name), value));
            }
            if keys.is_empty() {
                return None;
            }
        }
        Some(Self::new(class_name, keys))
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name)?;
        for (i, (name, value)) in self.keys.iter().enumerate() {
            write!(f, "{}{}=", if i == 0 { "." } else { "," }, name)?;
            match value {
                CimValue::String(s) | CimValue::DateTime(s) => {
                    write!(f, "\"{}\"", s.replace('"', "\\\""))?
                }
                CimValue::Boolean(b) => write!(f, "{b}")?,
                CimValue::Integer(n) => write!(f, "{n}")?,
                other => {
                    let mut buf = String::new();
                    other.canonical(&mut buf);
                    f.write_str(&buf)?;
                }
            }
        }
        Ok(())
    }
}

fn is_cim_name(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split `Key="a,b",Other=1` on commas outside quotes.
fn split_key_bindings(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth_quote = false;
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if i == 0 || bytes[i - 1] != b'\\' => depth_quote = !depth_quote,
            b',' if !depth_quote => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&text[start..]);
    parts
}
