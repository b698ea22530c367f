// src/brace_matchers.rs
//! Line recognizers for the brace family (TypeScript / JavaScript).
//!
//! Each production is a named `Matcher`. Tables at the bottom decide which
//! matchers run at top level and which inside a class body; extending the
//! family means adding a function and a table row.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    construct::{BodyShape, ClassHead, Construct, Cursor, FunctionHead, Matcher},
    helpers::{
        brace_counts, brace_extent, find_top_level, join_signature, split_top_level,
        take_balanced, MAX_LOOKAHEAD,
    },
    structure::{
        ConstantInfo, ExportInfo, ExportKind, FunctionInfo, FunctionKind, ImportInfo,
        ImportOrigin, InterfaceInfo, ParameterInfo, PropertyInfo, TypeInfo, TypeKind,
        Visibility,
    },
    vocab::{CONTROL_KEYWORDS, NODE_BUILTINS},
};

// -- Regex patterns ----------------------------------------------------------

static RE_IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^import\s+(type\s+)?(.+?)\s+from\s+['"]([^'"]+)['"]"#).unwrap()
});
static RE_IMPORT_BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^import\s+['"]([^'"]+)['"]"#).unwrap());
static RE_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:const|let|var)\s+(.+?)\s*=\s*require\(\s*['"]([^'"]+)['"]\s*\)"#).unwrap()
});

static RE_EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^export\s+(default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(function|class|interface|type|const|let|var|enum|namespace)\b\s*\*?\s*([A-Za-z_$][\w$]*)",
    )
    .unwrap()
});
static RE_EXPORT_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^export\s+(?:type\s+)?\{([^}]*)\}").unwrap());
static RE_EXPORT_STAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^export\s+\*\s+(?:as\s+([A-Za-z_$][\w$]*)\s+)?from\s+['"][^'"]+['"]"#).unwrap()
});
static RE_EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^export\s+default\b\s*(?:async\s+)?([A-Za-z_$][\w$]*)?").unwrap()
});

static RE_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(export\s+)?(default\s+)?(?:declare\s+)?(async\s+)?function\s*(\*)?\s*([A-Za-z_$][\w$]*)\s*(?:<[^(]*>)?\s*\(",
    )
    .unwrap()
});
static RE_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::\s*[^=]+?)?\s*=\s*(async\s+)?(?:<[^>(]*>\s*)?(?:(function\b\s*\*?\s*[\w$]*\s*\()|(\()|([A-Za-z_$][\w$]*)\s*=>)",
    )
    .unwrap()
});
static RE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(export\s+)?(default\s+)?(?:declare\s+)?(abstract\s+)?class\s+([A-Za-z_$][\w$]*)(?:\s*<[^{]*?>)?(?:\s+extends\s+([A-Za-z_$][\w$.]*)(?:\s*<[^{]*?>)?)?(?:\s+implements\s+([^{]+))?",
    )
    .unwrap()
});
static RE_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(public|private|protected)\s+)?(static\s+)?(?:override\s+)?(abstract\s+)?(?:override\s+)?(async\s+)?(?:(?:get|set)\s+)?(?:\*\s*)?([A-Za-z_$#][\w$]*)\s*(?:<[^(]*>)?\s*\(",
    )
    .unwrap()
});
static RE_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(public|private|protected)\s+)?(static\s+)?(?:declare\s+)?(readonly\s+)?([A-Za-z_$#][\w$]*)([?!])?\s*(?::\s*([^=;]+?))?\s*(?:=\s*(.+?))?\s*;?\s*$",
    )
    .unwrap()
});
static RE_INTERFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(export\s+)?(?:default\s+)?(?:declare\s+)?interface\s+([A-Za-z_$][\w$]*)\s*(?:<([^{]*?)>)?(?:\s+extends\s+([^{]+))?",
    )
    .unwrap()
});
static RE_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(export\s+)?(?:declare\s+)?type\s+([A-Za-z_$][\w$]*)\s*(?:<[^=]*>)?\s*=\s*(.*)$")
        .unwrap()
});
static RE_ENUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)").unwrap()
});
static RE_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(export\s+)?(?:declare\s+)?(?:namespace|module)\s+([A-Za-z_$][\w$.]*)\s*\{").unwrap()
});
static RE_CONSTANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(export\s+)?(default\s+)?const\s+([A-Za-z_$][\w$]*)\s*(?::\s*([^=]+?))?\s*=\s*(.+?)\s*;?\s*$")
        .unwrap()
});

static RE_MEMBER_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:readonly\s+)?([A-Za-z_$][\w$]*)(\?)?\s*(?:<[^(]*>)?\s*\(").unwrap()
});
static RE_MEMBER_PROP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(readonly\s+)?([A-Za-z_$][\w$]*|\[[^\]]+\])(\?)?\s*:\s*(.+?)\s*[;,]?\s*$").unwrap()
});

/// What follows a parameter list: optional `: Type`, then the body opener.
static RE_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?::\s*(.+?))?\s*(\{.*|=>.*|;.*)?$").unwrap()
});

/* ================================ Imports ================================ */

pub fn match_import(c: &Cursor<'_>) -> Option<Construct> {
    let t = c.trimmed();
    let line = c.idx + 1;

    if let Some(caps) = RE_REQUIRE.captures(t) {
        let (names, is_default, is_namespace) = parse_binding(&caps[1]);
        let module = caps[2].to_string();
        return Some(Construct::Imports(vec![ImportInfo {
            origin: Some(classify_module(&module)),
            module,
            names,
            is_default,
            is_namespace,
            line,
        }]));
    }

    if !t.starts_with("import ") && !t.starts_with("import{") {
        return None;
    }

    // `import {` lists may run over several lines
    let mut text = t.to_string();
    let mut j = c.idx;
    while !RE_IMPORT_FROM.is_match(&text)
        && !RE_IMPORT_BARE.is_match(&text)
        && j + 1 < c.lines.len()
        && j - c.idx < MAX_LOOKAHEAD
    {
        j += 1;
        text.push(' ');
        text.push_str(c.lines[j].trim());
    }

    if let Some(caps) = RE_IMPORT_FROM.captures(&text) {
        let (names, is_default, is_namespace) = parse_import_clause(&caps[2]);
        let module = caps[3].to_string();
        return Some(Construct::Imports(vec![ImportInfo {
            origin: Some(classify_module(&module)),
            module,
            names,
            is_default,
            is_namespace,
            line,
        }]));
    }
    let caps = RE_IMPORT_BARE.captures(&text)?;
    let module = caps[1].to_string();
    Some(Construct::Imports(vec![ImportInfo {
        origin: Some(classify_module(&module)),
        module,
        line,
        ..Default::default()
    }]))
}

/// `Default, { a, b as c }`, `* as ns`, `{ type T }` → (names, default, namespace)
fn parse_import_clause(clause: &str) -> (Vec<String>, bool, bool) {
    let mut names = Vec::new();
    let mut is_default = false;
    let mut is_namespace = false;
    for part in split_top_level(clause, ',') {
        if part.starts_with('{') {
            let inner = part.trim_start_matches('{').trim_end_matches('}');
            for n in inner.split(',') {
                let n = n.trim();
                let n = n.strip_prefix("type ").unwrap_or(n).trim();
                if !n.is_empty() {
                    names.push(n.to_string());
                }
            }
        } else if let Some(alias) = part.strip_prefix('*') {
            is_namespace = true;
            let alias = alias.trim();
            let alias = alias.strip_prefix("as").unwrap_or(alias).trim();
            if !alias.is_empty() {
                names.push(alias.to_string());
            }
        } else {
            is_default = true;
            names.push(part);
        }
    }
    (names, is_default, is_namespace)
}

/// Left side of a `require` assignment.
fn parse_binding(binding: &str) -> (Vec<String>, bool, bool) {
    let b = binding.trim();
    if b.starts_with('{') {
        let names = b
            .trim_start_matches('{')
            .trim_end_matches('}')
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        (names, false, false)
    } else {
        (vec![b.to_string()], false, true)
    }
}

/// Relative paths and aliases are internal; node core modules are builtin.
pub fn classify_module(module: &str) -> ImportOrigin {
    if module.starts_with('.') || module.starts_with('/') || module.starts_with("@/") || module.starts_with("~/") {
        return ImportOrigin::Internal;
    }
    if module.starts_with("node:") {
        return ImportOrigin::Builtin;
    }
    let root = module.split('/').next().unwrap_or(module);
    if NODE_BUILTINS.contains(&root) {
        ImportOrigin::Builtin
    } else {
        ImportOrigin::External
    }
}

/* ================================ Exports ================================ */

/// Export records on one line. Not exclusive: the declaration on the same
/// line is still matched by the construct table.
pub fn match_exports(trimmed: &str, line: usize) -> Vec<ExportInfo> {
    if !trimmed.starts_with("export") {
        return Vec::new();
    }
    if let Some(caps) = RE_EXPORT_DECL.captures(trimmed) {
        return vec![ExportInfo {
            name: caps[3].to_string(),
            kind: ExportKind::from_keyword(&caps[2]),
            is_default: caps.get(1).is_some(),
            line,
        }];
    }
    if let Some(caps) = RE_EXPORT_LIST.captures(trimmed) {
        return caps[1]
            .split(',')
            .filter_map(|entry| {
                let entry = entry.trim();
                let entry = entry.strip_prefix("type ").unwrap_or(entry).trim();
                if entry.is_empty() {
                    return None;
                }
                let name = entry.rsplit(" as ").next().unwrap_or(entry).trim();
                Some(ExportInfo {
                    name: name.to_string(),
                    kind: if name == "default" { ExportKind::Default } else { ExportKind::Named },
                    is_default: name == "default",
                    line,
                })
            })
            .collect();
    }
    if let Some(caps) = RE_EXPORT_STAR.captures(trimmed) {
        let name = caps.get(1).map_or("*", |m| m.as_str());
        return vec![ExportInfo { name: name.to_string(), kind: ExportKind::Named, is_default: false, line }];
    }
    if let Some(caps) = RE_EXPORT_DEFAULT.captures(trimmed) {
        let name = match caps.get(1).map(|m| m.as_str()) {
            Some("function" | "class" | "new" | "async") | None => "default",
            Some(ident) => ident,
        };
        return vec![ExportInfo { name: name.to_string(), kind: ExportKind::Default, is_default: true, line }];
    }
    Vec::new()
}

/* =============================== Functions =============================== */

pub fn match_function(c: &Cursor<'_>) -> Option<Construct> {
    if !c.trimmed().contains("function") {
        return None;
    }
    let (sig, header_end) = join_signature(c.lines, c.idx);
    let caps = RE_FUNCTION.captures(&sig)?;
    let open = caps.get(0)?.end() - 1;
    let (params, rest) = take_balanced(&sig, open)?;
    let (return_type, _) = parse_tail(rest)?;

    let kind = if caps.get(4).is_some() {
        FunctionKind::Generator
    } else if caps.get(3).is_some() {
        FunctionKind::Async
    } else {
        FunctionKind::Function
    };
    Some(Construct::Function(FunctionHead {
        name: caps[5].to_string(),
        kind,
        params: parse_params(params),
        return_type,
        exported: caps.get(1).is_some(),
        default_export: caps.get(2).is_some(),
        visibility: None,
        is_static: false,
        is_abstract: false,
        header_end,
        body: BodyShape::Block,
    }))
}

/// `const name = (params) => ...`, `const name = x => ...`, `const name = function (...)`.
pub fn match_arrow(c: &Cursor<'_>) -> Option<Construct> {
    let t = c.trimmed();
    if !["const ", "let ", "var ", "export "].iter().any(|p| t.starts_with(p)) {
        return None;
    }
    let (sig, header_end) = join_signature(c.lines, c.idx);
    let caps = RE_ARROW.captures(&sig)?;
    let name = caps[2].to_string();
    let exported = caps.get(1).is_some();
    let is_async = caps.get(3).is_some();

    let (kind, params, return_type, body) = if let Some(m) = caps.get(4) {
        let (params, rest) = take_balanced(&sig, m.end() - 1)?;
        let (ret, _) = parse_tail(rest)?;
        let kind = if is_async { FunctionKind::Async } else { FunctionKind::Function };
        (kind, parse_params(params), ret, BodyShape::Block)
    } else if let Some(m) = caps.get(5) {
        let (params, rest) = take_balanced(&sig, m.start())?;
        let (ret, tail) = parse_tail(rest)?;
        let after = tail?.strip_prefix("=>")?;
        (FunctionKind::Arrow, parse_params(params), ret, body_shape(after))
    } else {
        let param = caps.get(6)?.as_str();
        let after = &sig[caps.get(0)?.end()..];
        let params = vec![ParameterInfo { name: param.to_string(), ..Default::default() }];
        (FunctionKind::Arrow, params, None, body_shape(after))
    };

    Some(Construct::Function(FunctionHead {
        name,
        kind,
        params,
        return_type,
        exported,
        default_export: false,
        visibility: None,
        is_static: false,
        is_abstract: false,
        header_end,
        body,
    }))
}

fn body_shape(after_arrow: &str) -> BodyShape {
    if after_arrow.trim_start().starts_with('{') { BodyShape::Block } else { BodyShape::Expression }
}

/// Splits what follows `)` into (return type, body opener).
fn parse_tail(rest: &str) -> Option<(Option<String>, Option<&str>)> {
    let caps = RE_TAIL.captures(rest)?;
    let ret = caps.get(1).map(|m| m.as_str().trim().to_string()).filter(|s| !s.is_empty());
    let tail = caps.get(2).map(|m| m.as_str());
    Some((ret, tail))
}

/// Parameter list text (without the parens) into records.
pub fn parse_params(text: &str) -> Vec<ParameterInfo> {
    split_top_level(text, ',').iter().filter_map(|p| parse_param(p)).collect()
}

const PARAM_MODIFIERS: &[&str] = &["public ", "private ", "protected ", "readonly ", "override "];

fn parse_param(raw: &str) -> Option<ParameterInfo> {
    let mut s = raw.trim();
    loop {
        let before = s;
        for m in PARAM_MODIFIERS {
            if let Some(r) = s.strip_prefix(m) {
                s = r.trim_start();
            }
        }
        if s == before {
            break;
        }
    }
    let rest = s.starts_with("...");
    let s = s.trim_start_matches("...");

    let (head, default_value) = match find_top_level(s, '=') {
        Some(i) => (s[..i].trim(), Some(s[i + 1..].trim().to_string())),
        None => (s, None),
    };
    let (name_part, type_text) = match find_top_level(head, ':') {
        Some(i) => (head[..i].trim(), Some(head[i + 1..].trim().to_string())),
        None => (head.trim(), None),
    };
    let marked_optional = name_part.ends_with('?');
    let name = name_part.trim_end_matches('?').trim();
    if name.is_empty() {
        return None;
    }
    Some(ParameterInfo {
        name: name.to_string(),
        type_text: type_text.filter(|t| !t.is_empty()),
        optional: marked_optional || default_value.is_some(),
        default_value: default_value.filter(|d| !d.is_empty()),
        rest,
    })
}

/* ================================ Classes ================================ */

pub fn match_class(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_CLASS.captures(c.trimmed())?;
    let implements = caps
        .get(6)
        .map(|m| split_top_level(m.as_str(), ','))
        .unwrap_or_default();
    Some(Construct::Class(ClassHead {
        name: caps[4].to_string(),
        extends: caps.get(5).map(|m| m.as_str().to_string()),
        implements,
        is_abstract: caps.get(3).is_some(),
        exported: caps.get(1).is_some(),
        default_export: caps.get(2).is_some(),
    }))
}

/// Method signature at class-body level.
pub fn match_method(c: &Cursor<'_>) -> Option<Construct> {
    let (sig, header_end) = join_signature(c.lines, c.idx);
    let caps = RE_METHOD.captures(&sig)?;
    let name = &caps[5];
    if CONTROL_KEYWORDS.contains(&name) {
        return None;
    }
    let open = caps.get(0)?.end() - 1;
    let (params, rest) = take_balanced(&sig, open)?;
    let (return_type, _) = parse_tail(rest)?;

    let visibility = caps
        .get(1)
        .and_then(|m| Visibility::from_str_ic(m.as_str()))
        .unwrap_or(if name.starts_with('#') { Visibility::Private } else { Visibility::Public });

    Some(Construct::Method(FunctionHead {
        name: name.to_string(),
        kind: FunctionKind::Method,
        params: parse_params(params),
        return_type,
        exported: false,
        default_export: false,
        visibility: Some(visibility),
        is_static: caps.get(2).is_some(),
        is_abstract: caps.get(3).is_some(),
        header_end,
        body: BodyShape::Block,
    }))
}

/// Field declaration at class-body level; needs a type or an initializer.
pub fn match_property(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_PROPERTY.captures(c.trimmed())?;
    if caps.get(6).is_none() && caps.get(7).is_none() {
        return None;
    }
    let name = &caps[4];
    if CONTROL_KEYWORDS.contains(&name) {
        return None;
    }
    Some(Construct::Property(PropertyInfo {
        name: name.to_string(),
        type_text: caps.get(6).map(|m| m.as_str().trim().to_string()),
        description: None,
        exported: false,
        readonly: caps.get(3).is_some(),
        optional: caps.get(5).is_some_and(|m| m.as_str() == "?"),
        is_static: caps.get(2).is_some(),
        visibility: caps.get(1).and_then(|m| Visibility::from_str_ic(m.as_str())),
        default_value: caps.get(7).map(|m| m.as_str().trim().to_string()),
    }))
}

/* ============================ Interfaces / types ============================ */

/// Interface header plus its members, read from the brace extent.
pub fn match_interface(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_INTERFACE.captures(c.trimmed())?;
    let mut iface = InterfaceInfo {
        name: caps[2].to_string(),
        line: c.idx + 1,
        exported: caps.get(1).is_some(),
        generic_params: caps.get(3).map(|m| split_top_level(m.as_str(), ',')).unwrap_or_default(),
        extends: caps.get(4).map(|m| split_top_level(m.as_str(), ',')).unwrap_or_default(),
        ..Default::default()
    };

    let end = brace_extent(c.lines, c.idx);
    let (o, cl) = brace_counts(c.line());
    let mut depth = o as i32 - cl as i32;
    for j in c.idx + 1..=end.min(c.lines.len().saturating_sub(1)) {
        let t = c.lines[j].trim();
        if depth == 1 && !t.is_empty() && !t.starts_with("//") && !t.starts_with('*') && !t.starts_with("/*") {
            parse_interface_member(c.lines, j, &mut iface);
        }
        let (o, cl) = brace_counts(c.lines[j]);
        depth += o as i32 - cl as i32;
    }
    Some(Construct::Interface(iface))
}

fn parse_interface_member(lines: &[&str], j: usize, iface: &mut InterfaceInfo) {
    let t = lines[j].trim();
    if let Some(caps) = RE_MEMBER_METHOD.captures(t) {
        let open = caps.get(0).map_or(0, |m| m.end() - 1);
        if let Some((params, rest)) = take_balanced(t, open) {
            if let Some((return_type, _)) = parse_tail(rest.trim_end_matches([';', ','])) {
                iface.methods.push(FunctionInfo {
                    name: caps[1].to_string(),
                    kind: FunctionKind::Method,
                    params: parse_params(params),
                    return_type,
                    line: j + 1,
                    complexity: 1,
                    line_count: 1,
                    ..Default::default()
                });
                return;
            }
        }
    }
    if let Some(caps) = RE_MEMBER_PROP.captures(t) {
        iface.properties.push(PropertyInfo {
            name: caps[2].to_string(),
            type_text: Some(caps[4].trim().to_string()),
            readonly: caps.get(1).is_some(),
            optional: caps.get(3).is_some(),
            ..Default::default()
        });
    }
}

pub fn match_type_alias(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_TYPE.captures(c.trimmed())?;
    let value = caps[3].trim().trim_end_matches(';').trim();
    Some(Construct::Type(TypeInfo {
        name: caps[2].to_string(),
        kind: TypeKind::Type,
        line: c.idx + 1,
        exported: caps.get(1).is_some(),
        value: (!value.is_empty()).then(|| value.to_string()),
        ..Default::default()
    }))
}

pub fn match_enum(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_ENUM.captures(c.trimmed())?;
    Some(Construct::Type(TypeInfo {
        name: caps[2].to_string(),
        kind: TypeKind::Enum,
        line: c.idx + 1,
        exported: caps.get(1).is_some(),
        ..Default::default()
    }))
}

pub fn match_namespace(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_NAMESPACE.captures(c.trimmed())?;
    Some(Construct::Type(TypeInfo {
        name: caps[2].to_string(),
        kind: TypeKind::Namespace,
        line: c.idx + 1,
        exported: caps.get(1).is_some(),
        ..Default::default()
    }))
}

pub fn match_constant(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_CONSTANT.captures(c.trimmed())?;
    Some(Construct::Constant(ConstantInfo {
        name: caps[3].to_string(),
        type_text: caps.get(4).map(|m| m.as_str().trim().to_string()),
        exported: caps.get(1).is_some(),
        default_export: caps.get(2).is_some(),
        line: c.idx + 1,
        value: Some(caps[5].trim().to_string()),
        ..Default::default()
    }))
}

/* ================================= Tables ================================= */

/// Tried in order at brace depth 0; the first hit wins.
pub const TOP_LEVEL: &[(&str, Matcher)] = &[
    ("import", match_import),
    ("class", match_class),
    ("interface", match_interface),
    ("type", match_type_alias),
    ("enum", match_enum),
    ("namespace", match_namespace),
    ("function", match_function),
    ("arrow", match_arrow),
    ("constant", match_constant),
];

/// Tried in order directly inside a class body.
pub const CLASS_BODY: &[(&str, Matcher)] = &[
    ("method", match_method),
    ("property", match_property),
];

/* ================================== Tests ================================== */

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(m: Matcher, src: &str) -> Option<Construct> {
        let lines: Vec<&str> = src.lines().collect();
        m(&Cursor::new(&lines, 0))
    }

    #[test]
    fn default_and_named_import() {
        let Some(Construct::Imports(v)) = run(match_import, "import React, { useState, type FC } from 'react';") else {
            panic!("no import");
        };
        assert_eq!(v[0].module, "react");
        assert_eq!(v[0].names, vec!["React", "useState", "FC"]);
        assert!(v[0].is_default);
        assert_eq!(v[0].origin, Some(ImportOrigin::External));
    }

    #[test]
    fn namespace_and_multiline_import() {
        let Some(Construct::Imports(v)) = run(match_import, "import * as path from 'node:path';") else {
            panic!("no import");
        };
        assert!(v[0].is_namespace);
        assert_eq!(v[0].origin, Some(ImportOrigin::Builtin));

        let src = "import {\n  a,\n  b,\n} from './local';";
        let Some(Construct::Imports(v)) = run(match_import, src) else { panic!("no import") };
        assert_eq!(v[0].names, vec!["a", "b"]);
        assert_eq!(v[0].origin, Some(ImportOrigin::Internal));
    }

    #[test]
    fn require_is_an_import() {
        let Some(Construct::Imports(v)) = run(match_import, "const fs = require('fs');") else {
            panic!("no import");
        };
        assert_eq!(v[0].module, "fs");
        assert_eq!(v[0].origin, Some(ImportOrigin::Builtin));
    }

    #[test]
    fn export_forms() {
        let e = match_exports("export default async function main() {", 3);
        assert_eq!(e[0].name, "main");
        assert_eq!(e[0].kind, ExportKind::Function);
        assert!(e[0].is_default);

        let e = match_exports("export { a, b as c };", 1);
        assert_eq!(e.iter().map(|x| x.name.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);

        let e = match_exports("export default App;", 9);
        assert_eq!(e[0].name, "App");
        assert_eq!(e[0].kind, ExportKind::Default);

        assert!(match_exports("exported = 1", 1).is_empty());
    }

    #[test]
    fn async_function_with_types() {
        let Some(Construct::Function(f)) =
            run(match_function, "export async function load(id: string, opts?: Options): Promise<User> {")
        else {
            panic!("no function");
        };
        assert_eq!(f.name, "load");
        assert_eq!(f.kind, FunctionKind::Async);
        assert!(f.exported);
        assert_eq!(f.return_type.as_deref(), Some("Promise<User>"));
        assert_eq!(f.params.len(), 2);
        assert!(f.params[1].optional);
        assert_eq!(f.params[1].type_text.as_deref(), Some("Options"));
    }

    #[test]
    fn generator_and_multiline_signature() {
        let src = "function* walk(\n  root: Node,\n  depth = 0,\n): Iterable<Node> {\n}";
        let Some(Construct::Function(f)) = run(match_function, src) else { panic!("no function") };
        assert_eq!(f.kind, FunctionKind::Generator);
        assert_eq!(f.header_end, 3);
        assert_eq!(f.params[1].default_value.as_deref(), Some("0"));
        assert!(f.params[1].optional);
    }

    #[test]
    fn arrow_variants() {
        let Some(Construct::Function(f)) = run(match_arrow, "export const add = (a: number, b: number): number => a + b;")
        else {
            panic!("no arrow");
        };
        assert_eq!(f.kind, FunctionKind::Arrow);
        assert_eq!(f.body, BodyShape::Expression);
        assert_eq!(f.return_type.as_deref(), Some("number"));
        assert!(f.exported);

        let Some(Construct::Function(f)) = run(match_arrow, "const inc = x => {") else { panic!("no arrow") };
        assert_eq!(f.params[0].name, "x");
        assert_eq!(f.body, BodyShape::Block);

        assert!(run(match_arrow, "const total = (a + b) * 2;").is_none());
    }

    #[test]
    fn rest_and_destructured_params() {
        let p = parse_params("{ a, b }: Props, ...rest: string[]");
        assert_eq!(p[0].name, "{ a, b }");
        assert_eq!(p[0].type_text.as_deref(), Some("Props"));
        assert!(p[1].rest);
        assert_eq!(p[1].name, "rest");
    }

    #[test]
    fn class_header() {
        let Some(Construct::Class(c)) =
            run(match_class, "export abstract class Repo<T> extends Base<T> implements A, B {")
        else {
            panic!("no class");
        };
        assert_eq!(c.name, "Repo");
        assert_eq!(c.extends.as_deref(), Some("Base"));
        assert_eq!(c.implements, vec!["A", "B"]);
        assert!(c.is_abstract);
        assert!(c.exported);
    }

    #[test]
    fn method_and_property() {
        let Some(Construct::Method(m)) = run(match_method, "private static async fetch(url: string): Promise<void> {")
        else {
            panic!("no method");
        };
        assert_eq!(m.name, "fetch");
        assert_eq!(m.visibility, Some(Visibility::Private));
        assert!(m.is_static);

        assert!(run(match_method, "if (ready) {").is_none());

        let Some(Construct::Property(p)) = run(match_property, "readonly name?: string;") else {
            panic!("no property");
        };
        assert!(p.readonly);
        assert!(p.optional);
        assert_eq!(p.type_text.as_deref(), Some("string"));
        assert!(run(match_property, "doSomething();").is_none());
    }

    #[test]
    fn interface_members() {
        let src = "export interface Store<T> extends Base {\n  readonly id: string;\n  items?: T[];\n  get(key: string): T;\n}";
        let Some(Construct::Interface(i)) = run(match_interface, src) else { panic!("no interface") };
        assert_eq!(i.name, "Store");
        assert_eq!(i.extends, vec!["Base"]);
        assert_eq!(i.generic_params, vec!["T"]);
        assert_eq!(i.properties.len(), 2);
        assert!(i.properties[1].optional);
        assert_eq!(i.methods.len(), 1);
        assert_eq!(i.methods[0].return_type.as_deref(), Some("T"));
    }

    #[test]
    fn type_enum_constant() {
        let Some(Construct::Type(t)) = run(match_type_alias, "export type Id = string | number;") else {
            panic!("no type");
        };
        assert_eq!(t.value.as_deref(), Some("string | number"));
        let Some(Construct::Type(e)) = run(match_enum, "export const enum Color {") else { panic!("no enum") };
        assert_eq!(e.kind, TypeKind::Enum);

        let Some(Construct::Constant(k)) = run(match_constant, "const MAX = 5") else { panic!("no const") };
        assert_eq!(k.name, "MAX");
        assert_eq!(k.value.as_deref(), Some("5"));
        assert!(!k.exported);
    }
}
