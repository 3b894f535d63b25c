//! Recursive descent parser for MOF
//!
//! Builds a typed AST from tokens. Errors are collected rather than
//! aborting, with recovery at production boundaries, so a single pass
//! reports everything wrong with a fixture file.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::ast::{
    AppliedQualifierAst, AstValue, ClassDecl, ClassFeature, InstanceDecl, MethodDecl, MofFile,
    ParameterDecl, PragmaDirective, Production, PropertyDecl, PropertyValueAst, QualifierDecl,
};
use super::error::SyntaxError;
use super::lexer::{Lexer, Token, TokenKind};
use crate::model::{CimType, FlavorSet, ScopeSet};

/// Parse result containing the AST and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub file: MofFile,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse MOF source code into an AST
pub fn parse(input: &str) -> Parse {
    // Trivia never reaches the grammar; the AST is not lossless.
    let tokens: Vec<_> = Lexer::new(input).filter(|t| !t.kind.is_trivia()).collect();
    let mut parser = Parser::new(&tokens);
    let file = parser.parse_file();
    Parse {
        file,
        errors: parser.errors,
    }
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    last_end: TextSize,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>]) -> Self {
        Self {
            tokens,
            pos: 0,
            last_end: TextSize::new(0),
            errors: Vec::new(),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Error)
    }

    fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn current_offset(&self) -> TextSize {
        self.current().map(|t| t.offset).unwrap_or(self.last_end)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Error)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.last_end = token.end();
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {what}, found '{}'", self.found_desc()));
            false
        }
    }

    /// Consume an identifier and return its text.
    fn expect_ident(&mut self, what: &str) -> Option<SmolStr> {
        if self.at(TokenKind::Ident) {
            let text = SmolStr::from(self.current_text());
            self.bump();
            Some(text)
        } else {
            self.error(format!("expected {what}, found '{}'", self.found_desc()));
            None
        }
    }

    fn found_desc(&self) -> String {
        if self.at_eof() {
            "end of file".to_string()
        } else {
            self.current_text().to_string()
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| TextRange::at(t.offset, TextSize::of(t.text)))
            .unwrap_or_else(|| TextRange::empty(self.last_end));
        self.errors.push(SyntaxError::new(message, range));
    }

    /// Skip to just past the next `;` (or a closing `}` followed by `;`)
    /// so the next production can parse.
    fn recover_to_semicolon(&mut self) {
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.current_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth = depth.saturating_sub(1),
                TokenKind::Semicolon if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn span_from(&self, start: TextSize) -> TextRange {
        TextRange::new(start, self.last_end.max(start))
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// MofFile = Production*
    fn parse_file(&mut self) -> MofFile {
        let mut file = MofFile::default();
        while !self.at_eof() {
            let pos_before = self.pos;
            if let Some(production) = self.parse_production() {
                file.productions.push(production);
            }
            // Safety: if we didn't make progress, force-skip a token
            if self.pos == pos_before && !self.at_eof() {
                self.error(format!("stuck on token: '{}'", self.current_text()));
                self.bump();
            }
        }
        file
    }

    /// Production = Pragma | QualifierDecl | QualifierList? (ClassDecl | InstanceDecl)
    fn parse_production(&mut self) -> Option<Production> {
        match self.current_kind() {
            TokenKind::Pragma => self.parse_pragma().map(Production::Pragma),
            TokenKind::QualifierKw => self.parse_qualifier_decl().map(Production::Qualifier),
            TokenKind::LBracket | TokenKind::ClassKw | TokenKind::InstanceKw => {
                let qualifiers = if self.at(TokenKind::LBracket) {
                    self.parse_qualifier_list()
                } else {
                    Vec::new()
                };
                match self.current_kind() {
                    TokenKind::ClassKw => self.parse_class_decl(qualifiers).map(Production::Class),
                    TokenKind::InstanceKw => {
                        self.parse_instance_decl(qualifiers).map(Production::Instance)
                    }
                    _ => {
                        self.error(format!(
                            "expected 'class' or 'instance' after qualifier list, found '{}'",
                            self.found_desc()
                        ));
                        self.recover_to_semicolon();
                        None
                    }
                }
            }
            _ => {
                self.error(format!(
                    "expected a qualifier, class, or instance declaration, found '{}'",
                    self.found_desc()
                ));
                self.recover_to_semicolon();
                None
            }
        }
    }

    /// Pragma = '#pragma' Ident '(' String ')'
    fn parse_pragma(&mut self) -> Option<PragmaDirective> {
        let start = self.current_offset();
        self.bump(); // #pragma
        let name = self.expect_ident("pragma name")?;
        self.expect(TokenKind::LParen, "'('");
        let argument = if self.at(TokenKind::String) {
            let text = unescape_string(self.current_text());
            self.bump();
            text
        } else {
            self.error(format!(
                "expected pragma argument string, found '{}'",
                self.found_desc()
            ));
            return None;
        };
        self.expect(TokenKind::RParen, "')'");
        Some(PragmaDirective {
            name,
            argument,
            span: self.span_from(start),
        })
    }

    /// QualifierDecl = 'Qualifier' Ident ':' Type '[]'? ('=' Value)?
    ///                 (',' ('Scope'|'Flavor') '(' IdentList ')')* ';'
    fn parse_qualifier_decl(&mut self) -> Option<QualifierDecl> {
        let start = self.current_offset();
        self.bump(); // Qualifier
        let name = self.expect_ident("qualifier name").or_else(|| {
            self.recover_to_semicolon();
            None
        })?;
        self.expect(TokenKind::Colon, "':'");
        let ty = self.parse_data_type()?;
        let is_array = self.parse_array_suffix().is_some();
        let default = if self.eat(TokenKind::Eq) {
            let value = self.parse_value()?;
            if matches!(value, AstValue::Null) {
                None
            } else {
                Some(value)
            }
        } else {
            None
        };

        let mut scopes = ScopeSet::empty();
        let mut flavors = FlavorSet::empty();
        let mut saw_scope = false;
        while self.eat(TokenKind::Comma) {
            match self.current_kind() {
                TokenKind::ScopeKw => {
                    self.bump();
                    saw_scope = true;
                    self.parse_keyword_list("scope", |p, word| match ScopeSet::from_keyword(word) {
                        Some(scope) => scopes |= scope,
                        None => p.error(format!("unknown scope keyword: '{word}'")),
                    });
                }
                TokenKind::FlavorKw => {
                    self.bump();
                    self.parse_keyword_list("flavor", |p, word| {
                        match FlavorSet::from_keyword(word) {
                            Some(flavor) => flavors |= flavor,
                            None => p.error(format!("unknown flavor keyword: '{word}'")),
                        }
                    });
                }
                _ => {
                    self.error(format!(
                        "expected 'Scope' or 'Flavor', found '{}'",
                        self.found_desc()
                    ));
                    break;
                }
            }
        }
        if !saw_scope {
            self.error(format!("qualifier '{name}' is missing its Scope clause"));
        }
        self.expect(TokenKind::Semicolon, "';'");
        Some(QualifierDecl {
            name,
            ty,
            is_array,
            default,
            scopes,
            flavors,
            span: self.span_from(start),
        })
    }

    /// `'(' Ident (',' Ident)* ')'` — feeds each keyword to `apply`.
    fn parse_keyword_list(&mut self, what: &str, mut apply: impl FnMut(&mut Self, &str)) {
        if !self.expect(TokenKind::LParen, "'('") {
            return;
        }
        loop {
            if self.at(TokenKind::Ident) {
                let word = self.current_text().to_string();
                self.bump();
                apply(self, &word);
            } else {
                self.error(format!(
                    "expected {what} keyword, found '{}'",
                    self.found_desc()
                ));
                break;
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'");
    }

    /// QualifierList = '[' AppliedQualifier (',' AppliedQualifier)* ']'
    fn parse_qualifier_list(&mut self) -> Vec<AppliedQualifierAst> {
        let mut qualifiers = Vec::new();
        self.bump(); // [
        loop {
            let start = self.current_offset();
            // Keyword-looking names ("scope", "flavor") are legal
            // qualifier names; accept any identifier-shaped token.
            let name = match self.current_kind() {
                TokenKind::Ident | TokenKind::ScopeKw | TokenKind::FlavorKw => {
                    let name = SmolStr::from(self.current_text());
                    self.bump();
                    name
                }
                _ => {
                    self.error(format!(
                        "expected qualifier name, found '{}'",
                        self.found_desc()
                    ));
                    break;
                }
            };
            let value = if self.eat(TokenKind::LParen) {
                let value = self.parse_scalar_value();
                self.expect(TokenKind::RParen, "')'");
                value
            } else if self.at(TokenKind::LBrace) {
                self.parse_array_value()
            } else {
                None
            };
            qualifiers.push(AppliedQualifierAst {
                name,
                value,
                span: self.span_from(start),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBracket, "']'");
        qualifiers
    }

    /// ClassDecl = 'class' Ident (':' Ident)? '{' ClassFeature* '}' ';'
    fn parse_class_decl(&mut self, qualifiers: Vec<AppliedQualifierAst>) -> Option<ClassDecl> {
        let start = self.current_offset();
        self.bump(); // class
        let name = self.expect_ident("class name").or_else(|| {
            self.recover_to_semicolon();
            None
        })?;
        let superclass = if self.eat(TokenKind::Colon) {
            self.expect_ident("superclass name")
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{'");
        let mut features = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let pos_before = self.pos;
            if let Some(feature) = self.parse_class_feature() {
                features.push(feature);
            }
            if self.pos == pos_before {
                // parse_class_feature already reported; skip the token
                self.bump();
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.expect(TokenKind::Semicolon, "';'");
        Some(ClassDecl {
            qualifiers,
            name,
            superclass,
            features,
            span: self.span_from(start),
        })
    }

    /// ClassFeature = QualifierList? (Property | ReferenceProperty | Method)
    ///
    /// Disambiguation is by shape: `Ident REF` is a reference property,
    /// a data-type ident followed by `name (` is a method, anything else
    /// with a data type is a property.
    fn parse_class_feature(&mut self) -> Option<ClassFeature> {
        let start = self.current_offset();
        let qualifiers = if self.at(TokenKind::LBracket) {
            self.parse_qualifier_list()
        } else {
            Vec::new()
        };

        if !self.at(TokenKind::Ident) {
            self.error(format!(
                "expected a property or method declaration, found '{}'",
                self.found_desc()
            ));
            return None;
        }

        // Reference property: ClassName REF name
        if self.nth_kind(1) == TokenKind::RefKw {
            let class_name = SmolStr::from(self.current_text());
            self.bump();
            self.bump(); // REF
            let name = self.expect_ident("reference property name")?;
            let default = if self.eat(TokenKind::Eq) {
                self.parse_value()
            } else {
                None
            };
            self.expect(TokenKind::Semicolon, "';'");
            return Some(ClassFeature::Property(PropertyDecl {
                qualifiers,
                kind: crate::model::PropertyKind::Reference { class_name },
                name,
                default,
                span: self.span_from(start),
            }));
        }

        let ty = self.parse_data_type()?;
        let name = self.expect_ident("member name")?;

        if self.eat(TokenKind::LParen) {
            // Method
            let mut parameters = Vec::new();
            if !self.at(TokenKind::RParen) {
                loop {
                    if let Some(parameter) = self.parse_parameter() {
                        parameters.push(parameter);
                    }
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "')'");
            self.expect(TokenKind::Semicolon, "';'");
            Some(ClassFeature::Method(MethodDecl {
                qualifiers,
                return_type: ty,
                name,
                parameters,
                span: self.span_from(start),
            }))
        } else {
            // Property
            let is_array = self.parse_array_suffix();
            let default = if self.eat(TokenKind::Eq) {
                self.parse_value()
            } else {
                None
            };
            self.expect(TokenKind::Semicolon, "';'");
            Some(ClassFeature::Property(PropertyDecl {
                qualifiers,
                kind: crate::model::PropertyKind::Data {
                    ty,
                    is_array: is_array.is_some(),
                    array_size: is_array.flatten(),
                },
                name,
                default,
                span: self.span_from(start),
            }))
        }
    }

    /// Parameter = QualifierList? (Type | Ident 'REF') Ident '[]'?
    fn parse_parameter(&mut self) -> Option<ParameterDecl> {
        let start = self.current_offset();
        let qualifiers = if self.at(TokenKind::LBracket) {
            self.parse_qualifier_list()
        } else {
            Vec::new()
        };

        if self.at(TokenKind::Ident) && self.nth_kind(1) == TokenKind::RefKw {
            let class_name = SmolStr::from(self.current_text());
            self.bump();
            self.bump(); // REF
            let name = self.expect_ident("parameter name")?;
            return Some(ParameterDecl {
                qualifiers,
                kind: crate::model::PropertyKind::Reference { class_name },
                name,
                span: self.span_from(start),
            });
        }

        let ty = self.parse_data_type()?;
        let name = self.expect_ident("parameter name")?;
        let is_array = self.parse_array_suffix();
        Some(ParameterDecl {
            qualifiers,
            kind: crate::model::PropertyKind::Data {
                ty,
                is_array: is_array.is_some(),
                array_size: is_array.flatten(),
            },
            name,
            span: self.span_from(start),
        })
    }

    /// InstanceDecl = 'instance' 'of' Ident ('as' Alias)?
    ///                '{' (Ident '=' Value ';')* '}' ';'
    fn parse_instance_decl(
        &mut self,
        qualifiers: Vec<AppliedQualifierAst>,
    ) -> Option<InstanceDecl> {
        let start = self.current_offset();
        self.bump(); // instance
        self.expect(TokenKind::OfKw, "'of'");
        let class_name = self.expect_ident("class name").or_else(|| {
            self.recover_to_semicolon();
            None
        })?;
        let alias = if self.eat(TokenKind::AsKw) {
            if self.at(TokenKind::Alias) {
                // Strip the '$' sigil
                let alias = SmolStr::from(&self.current_text()[1..]);
                self.bump();
                Some(alias)
            } else {
                self.error(format!(
                    "expected '$alias' after 'as', found '{}'",
                    self.found_desc()
                ));
                None
            }
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{'");
        let mut property_values = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let value_start = self.current_offset();
            let Some(name) = self.expect_ident("property name") else {
                self.recover_to_semicolon();
                continue;
            };
            self.expect(TokenKind::Eq, "'='");
            let Some(value) = self.parse_value() else {
                self.recover_to_semicolon();
                continue;
            };
            self.expect(TokenKind::Semicolon, "';'");
            property_values.push(PropertyValueAst {
                name,
                value,
                span: self.span_from(value_start),
            });
        }
        self.expect(TokenKind::RBrace, "'}'");
        self.expect(TokenKind::Semicolon, "';'");
        Some(InstanceDecl {
            qualifiers,
            class_name,
            alias,
            property_values,
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Values and types
    // =========================================================================

    /// A data type keyword (`uint32`, `string`, ...).
    fn parse_data_type(&mut self) -> Option<CimType> {
        if self.at(TokenKind::Ident) {
            if let Some(ty) = CimType::from_keyword(self.current_text()) {
                self.bump();
                return Some(ty);
            }
        }
        self.error(format!(
            "expected a CIM data type, found '{}'",
            self.found_desc()
        ));
        None
    }

    /// `'[' Integer? ']'` — outer None: no suffix; inner: fixed size.
    fn parse_array_suffix(&mut self) -> Option<Option<u32>> {
        if !self.eat(TokenKind::LBracket) {
            return None;
        }
        let size = if self.at(TokenKind::Integer) {
            let size = self.current_text().parse().ok();
            self.bump();
            size
        } else {
            None
        };
        self.expect(TokenKind::RBracket, "']'");
        Some(size)
    }

    /// Value = Scalar | Array
    fn parse_value(&mut self) -> Option<AstValue> {
        if self.at(TokenKind::LBrace) {
            self.parse_array_value()
        } else {
            self.parse_scalar_value()
        }
    }

    /// Array = '{' (Scalar (',' Scalar)*)? '}'
    fn parse_array_value(&mut self) -> Option<AstValue> {
        self.bump(); // {
        let mut items = Vec::new();
        if !self.at(TokenKind::RBrace) {
            loop {
                items.push(self.parse_scalar_value()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(AstValue::Array(items))
    }

    /// Scalar = String+ | Char | Integer | Real | true | false | NULL | Alias
    ///
    /// Adjacent string literals concatenate, as MOF uses for long
    /// description text.
    fn parse_scalar_value(&mut self) -> Option<AstValue> {
        match self.current_kind() {
            TokenKind::String => {
                let mut text = unescape_string(self.current_text());
                self.bump();
                while self.at(TokenKind::String) {
                    text.push_str(&unescape_string(self.current_text()));
                    self.bump();
                }
                Some(AstValue::String(text))
            }
            TokenKind::Char => {
                let value = unescape_char(self.current_text());
                self.bump();
                value.map(AstValue::Char).or_else(|| {
                    self.error("invalid character literal");
                    None
                })
            }
            TokenKind::Integer => {
                let text = self.current_text();
                match decode_integer(text) {
                    Some(value) => {
                        self.bump();
                        Some(AstValue::Integer(value))
                    }
                    None => {
                        self.error(format!("invalid integer literal: '{text}'"));
                        self.bump();
                        None
                    }
                }
            }
            TokenKind::Real => {
                let value = self.current_text().parse().ok();
                self.bump();
                value.map(AstValue::Real)
            }
            TokenKind::TrueKw => {
                self.bump();
                Some(AstValue::Boolean(true))
            }
            TokenKind::FalseKw => {
                self.bump();
                Some(AstValue::Boolean(false))
            }
            TokenKind::NullKw => {
                self.bump();
                Some(AstValue::Null)
            }
            TokenKind::Alias => {
                let alias = SmolStr::from(&self.current_text()[1..]);
                self.bump();
                Some(AstValue::Alias(alias))
            }
            _ => {
                self.error(format!("expected a value, found '{}'", self.found_desc()));
                None
            }
        }
    }
}

/// Decode a MOF integer literal: decimal, `0x` hex, `101b` binary, or
/// leading-zero octal, with an optional sign.
fn decode_integer(text: &str) -> Option<i128> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()?
    } else if let Some(binary) = digits
        .strip_suffix('b')
        .or_else(|| digits.strip_suffix('B'))
        .filter(|d| d.bytes().all(|b| b == b'0' || b == b'1'))
    {
        i128::from_str_radix(binary, 2).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(digits, 8).ok()?
    } else {
        digits.parse().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Strip quotes and process escapes of a string literal.
fn unescape_string(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Strip quotes and process the escape of a char16 literal.
fn unescape_char(text: &str) -> Option<char> {
    let inner = &text[1..text.len() - 1];
    let mut chars = inner.chars();
    let c = chars.next()?;
    let value = if c == '\\' {
        match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => other,
        }
    } else {
        c
    };
    chars.next().is_none().then_some(value)
}
