// src/construct.rs
//! What a matcher hands back to the builder: one recognized construct plus
//! the line index where its header ends. The builder owns extents and state.

use crate::structure::{
    ConstantInfo,
    FunctionKind,
    ImportInfo,
    InterfaceInfo,
    ParameterInfo,
    PropertyInfo,
    TypeInfo,
    Visibility,
};

/// Read position inside a file's lines.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    pub lines: &'a [&'a str],
    pub idx: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(lines: &'a [&'a str], idx: usize) -> Self {
        Self { lines, idx }
    }

    pub fn line(&self) -> &'a str {
        self.lines[self.idx]
    }

    pub fn trimmed(&self) -> &'a str {
        self.lines[self.idx].trim()
    }
}

/// How a function-like body ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    /// `{ ... }` block: brace balance or indentation.
    Block,
    /// Arrow with an expression body.
    Expression,
}

/// Header of a function, arrow, or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHead {
    pub name: String,
    pub kind: FunctionKind,
    pub params: Vec<ParameterInfo>,
    pub return_type: Option<String>,
    pub exported: bool,
    pub default_export: bool,
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub is_abstract: bool,
    /// Index of the last line the signature occupies.
    pub header_end: usize,
    pub body: BodyShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassHead {
    pub name: String,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub is_abstract: bool,
    pub exported: bool,
    pub default_export: bool,
}

/// One recognized construct.
#[derive(Debug, Clone, PartialEq)]
pub enum Construct {
    Imports(Vec<ImportInfo>),
    Function(FunctionHead),
    Method(FunctionHead),
    Class(ClassHead),
    Property(PropertyInfo),
    Interface(InterfaceInfo),
    Type(TypeInfo),
    Constant(ConstantInfo),
    Decorator(String),
}

/// A named recognizer for one production.
pub type Matcher = fn(&Cursor<'_>) -> Option<Construct>;

/// Runs `matchers` in order and returns the first hit.
pub fn first_match(matchers: &[(&'static str, Matcher)], cursor: &Cursor<'_>) -> Option<(&'static str, Construct)> {
    matchers.iter().find_map(|(name, m)| m(cursor).map(|c| (*name, c)))
}
