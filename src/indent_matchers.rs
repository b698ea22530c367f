// src/indent_matchers.rs
//! Line recognizers for the indentation family (Python).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    construct::{BodyShape, ClassHead, Construct, Cursor, FunctionHead, Matcher},
    helpers::{find_top_level, join_signature, split_top_level, take_balanced, MAX_LOOKAHEAD},
    structure::{
        ConstantInfo, ExportInfo, ExportKind, FunctionKind, ImportInfo, ImportOrigin, ParameterInfo,
        PropertyInfo, Visibility,
    },
    vocab::PYTHON_STDLIB,
};

// -- Regex patterns ----------------------------------------------------------

static RE_FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^from\s+([\w.]+)\s+import\s+(.+)$").unwrap());
static RE_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^import\s+(.+)$").unwrap());
static RE_DECORATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@(.+)$").unwrap());
static RE_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(async\s+)?def\s+([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*\(").unwrap());
static RE_DEF_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:->\s*(.+?))?\s*:\s*(?:#.*)?$").unwrap());
static RE_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^class\s+([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*(?:\(([^)]*)\))?\s*:").unwrap()
});
static RE_SELF_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^self\.([A-Za-z_]\w*)\s*(?::\s*([^=]+?))?\s*=\s*([^=].*)$").unwrap()
});
static RE_CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_]\w*)\s*(?::\s*([^=]+?))?\s*=\s*([^=].*)$").unwrap()
});
static RE_CLASS_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*:\s*([^=]+?)\s*$").unwrap());
static RE_CONSTANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Z_][A-Z0-9_]*)\s*(?::\s*([^=]+?))?\s*=\s*([^=].*)$").unwrap()
});
static RE_DUNDER_ALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^__all__\s*(?::[^=]+)?=\s*[\[(](.*?)[\])]?\s*$").unwrap());
static RE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"]([^'"]+)['"]"#).unwrap());

/* ================================ Imports ================================ */

/// `import a, b as c` yields one record per module; `from m import x, y`
/// yields a single record. Parenthesised lists may span lines.
pub fn match_import(c: &Cursor<'_>) -> Option<Construct> {
    let t = c.trimmed();
    let line = c.idx + 1;

    if let Some(caps) = RE_FROM_IMPORT.captures(t) {
        let module = caps[1].to_string();
        let mut list = caps[2].trim().to_string();
        if list.starts_with('(') && !list.contains(')') {
            let mut j = c.idx;
            while !list.contains(')') && j + 1 < c.lines.len() && j - c.idx < MAX_LOOKAHEAD {
                j += 1;
                list.push(' ');
                list.push_str(c.lines[j].trim());
            }
        }
        let list = strip_comment(&list);
        let list = list.trim().trim_start_matches('(').trim_end_matches(')');
        let is_namespace = list.trim() == "*";
        let names: Vec<String> = list
            .split(',')
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        return Some(Construct::Imports(vec![ImportInfo {
            origin: Some(classify_module(&module)),
            module,
            names,
            is_default: false,
            is_namespace,
            line,
        }]));
    }

    let caps = RE_IMPORT.captures(t)?;
    let imports = strip_comment(&caps[1])
        .split(',')
        .filter_map(|item| {
            let item = item.trim();
            if item.is_empty() {
                return None;
            }
            let module = item.split_whitespace().next().unwrap_or(item).to_string();
            Some(ImportInfo {
                origin: Some(classify_module(&module)),
                names: vec![item.to_string()],
                module,
                is_default: false,
                is_namespace: true,
                line,
            })
        })
        .collect::<Vec<_>>();
    if imports.is_empty() { None } else { Some(Construct::Imports(imports)) }
}

/// Relative imports are internal; stdlib roots are builtin.
pub fn classify_module(module: &str) -> ImportOrigin {
    if module.starts_with('.') {
        return ImportOrigin::Internal;
    }
    let root = module.split('.').next().unwrap_or(module);
    if PYTHON_STDLIB.contains(&root) {
        ImportOrigin::Builtin
    } else {
        ImportOrigin::External
    }
}

fn strip_comment(s: &str) -> String {
    s.split('#').next().unwrap_or(s).to_string()
}

/// Names listed in a one-line `__all__ = [...]`.
pub fn match_all_exports(trimmed: &str, line: usize) -> Vec<ExportInfo> {
    let Some(caps) = RE_DUNDER_ALL.captures(trimmed) else {
        return Vec::new();
    };
    RE_QUOTED
        .captures_iter(&caps[1])
        .map(|m| ExportInfo { name: m[1].to_string(), kind: ExportKind::Named, is_default: false, line })
        .collect()
}

/* ============================ Decorators / defs ============================ */

pub fn match_decorator(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_DECORATOR.captures(c.trimmed())?;
    Some(Construct::Decorator(caps[1].trim().to_string()))
}

/// `[async] def name(params) [-> type]:` with the parameter list possibly
/// spanning several lines. Always reported as a function; the builder turns
/// it into a method inside a class.
pub fn match_def(c: &Cursor<'_>) -> Option<Construct> {
    let t = c.trimmed();
    if !t.starts_with("def ") && !t.starts_with("async ") {
        return None;
    }
    let (sig, header_end) = join_signature(c.lines, c.idx);
    let caps = RE_DEF.captures(&sig)?;
    let open = caps.get(0)?.end() - 1;
    let (params, rest) = take_balanced(&sig, open)?;
    let tail = RE_DEF_TAIL.captures(rest)?;
    let name = caps[2].to_string();

    Some(Construct::Function(FunctionHead {
        visibility: Some(visibility_of(&name)),
        kind: if caps.get(1).is_some() { FunctionKind::Async } else { FunctionKind::Function },
        params: parse_params(params),
        return_type: tail.get(1).map(|m| m.as_str().trim().to_string()),
        exported: !name.starts_with('_'),
        default_export: false,
        is_static: false,
        is_abstract: false,
        header_end,
        body: BodyShape::Block,
        name,
    }))
}

/// Leading underscores mark non-public names.
pub fn visibility_of(name: &str) -> Visibility {
    if name.starts_with("__") && !name.ends_with("__") {
        Visibility::Private
    } else if name.starts_with('_') && !name.starts_with("__") {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

pub fn parse_params(text: &str) -> Vec<ParameterInfo> {
    split_top_level(text, ',')
        .iter()
        .filter_map(|raw| {
            let raw = raw.trim();
            if matches!(raw, "" | "/" | "*" | "self" | "cls") {
                return None;
            }
            let rest = raw.starts_with('*');
            let s = raw.trim_start_matches('*');
            let (head, default_value) = match find_top_level(s, '=') {
                Some(i) => (s[..i].trim(), Some(s[i + 1..].trim().to_string())),
                None => (s, None),
            };
            let (name, type_text) = match head.split_once(':') {
                Some((n, t)) => (n.trim(), Some(t.trim().to_string())),
                None => (head.trim(), None),
            };
            if name.is_empty() {
                return None;
            }
            Some(ParameterInfo {
                name: name.to_string(),
                type_text: type_text.filter(|t| !t.is_empty()),
                optional: default_value.is_some(),
                default_value,
                rest,
            })
        })
        .collect()
}

/* ================================ Classes ================================ */

/// `class Name[(bases)]:`. The first base (other than keyword arguments)
/// becomes `extends`; the others are listed as `implements`.
pub fn match_class(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_CLASS.captures(c.trimmed())?;
    let name = caps[1].to_string();
    let bases: Vec<String> = caps
        .get(2)
        .map(|m| split_top_level(m.as_str(), ','))
        .unwrap_or_default()
        .into_iter()
        .filter(|b| !b.contains('='))
        .collect();
    let is_abstract = bases.iter().any(|b| b == "ABC" || b.ends_with(".ABC"))
        || caps.get(2).is_some_and(|m| m.as_str().contains("ABCMeta"));
    let mut bases = bases.into_iter();
    Some(Construct::Class(ClassHead {
        exported: !name.starts_with('_'),
        name,
        extends: bases.next(),
        implements: bases.collect(),
        is_abstract,
        default_export: false,
    }))
}

/// `self.name = value` anywhere inside a method body.
pub fn match_self_assignment(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_SELF_ASSIGN.captures(c.trimmed())?;
    let name = caps[1].to_string();
    Some(Construct::Property(PropertyInfo {
        visibility: Some(visibility_of(&name)),
        name,
        type_text: Some(caps.get(2).map_or("any", |m| m.as_str().trim()).to_string()),
        default_value: Some(caps[3].trim().to_string()),
        ..Default::default()
    }))
}

/// `name [: type] = value` or `name: type` directly in a class body.
pub fn match_class_attribute(c: &Cursor<'_>) -> Option<Construct> {
    let t = c.trimmed();
    if let Some(caps) = RE_CLASS_ATTR.captures(t) {
        let name = caps[1].to_string();
        return Some(Construct::Property(PropertyInfo {
            visibility: Some(visibility_of(&name)),
            name,
            type_text: caps.get(2).map(|m| m.as_str().trim().to_string()),
            default_value: Some(caps[3].trim().to_string()),
            is_static: true,
            ..Default::default()
        }));
    }
    let caps = RE_CLASS_ANNOTATION.captures(t)?;
    let name = caps[1].to_string();
    Some(Construct::Property(PropertyInfo {
        visibility: Some(visibility_of(&name)),
        name,
        type_text: Some(caps[2].trim().to_string()),
        ..Default::default()
    }))
}

/// Module-level `UPPER_CASE = value`.
pub fn match_constant(c: &Cursor<'_>) -> Option<Construct> {
    let caps = RE_CONSTANT.captures(c.trimmed())?;
    let name = caps[1].to_string();
    Some(Construct::Constant(ConstantInfo {
        exported: !name.starts_with('_'),
        name,
        type_text: caps.get(2).map(|m| m.as_str().trim().to_string()),
        line: c.idx + 1,
        value: Some(caps[3].trim().to_string()),
        ..Default::default()
    }))
}

/// True for a non-blank line that closes the current class: indentation at
/// or left of the class line and a `def`, `class`, decorator or
/// `UPPER_CASE =` start.
pub fn closes_class(line: &str, class_indent: usize) -> bool {
    let t = line.trim();
    if t.is_empty() || crate::helpers::indentation(line) > class_indent {
        return false;
    }
    t.starts_with("def ")
        || t.starts_with("async def ")
        || t.starts_with("class ")
        || t.starts_with('@')
        || (RE_CONSTANT.is_match(t) && !t.contains("self."))
}

/* ================================= Tables ================================= */

/// Tried in order outside classes.
pub const TOP_LEVEL: &[(&str, Matcher)] = &[
    ("import", match_import),
    ("decorator", match_decorator),
    ("class", match_class),
    ("def", match_def),
    ("constant", match_constant),
];

/// Tried in order on class-body lines (method bodies are consumed whole).
pub const CLASS_BODY: &[(&str, Matcher)] = &[
    ("decorator", match_decorator),
    ("class", match_class),
    ("def", match_def),
    ("attribute", match_class_attribute),
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
    fn from_import_with_parenthesised_list() {
        let src = "from .models import (\n    User,\n    Order,\n)";
        let Some(Construct::Imports(v)) = run(match_import, src) else { panic!("no import") };
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].module, ".models");
        assert_eq!(v[0].names, vec!["User", "Order"]);
        assert_eq!(v[0].origin, Some(ImportOrigin::Internal));
    }

    #[test]
    fn plain_import_splits_modules() {
        let Some(Construct::Imports(v)) = run(match_import, "import os, numpy as np  # math") else {
            panic!("no import");
        };
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].module, "os");
        assert_eq!(v[0].origin, Some(ImportOrigin::Builtin));
        assert_eq!(v[1].module, "numpy");
        assert_eq!(v[1].names, vec!["numpy as np"]);
        assert_eq!(v[1].origin, Some(ImportOrigin::External));
    }

    #[test]
    fn def_with_types_and_defaults() {
        let src = "async def fetch(self, url: str, *args, retries: int = 3, **kw) -> dict:";
        let Some(Construct::Function(f)) = run(match_def, src) else { panic!("no def") };
        assert_eq!(f.name, "fetch");
        assert_eq!(f.kind, FunctionKind::Async);
        assert_eq!(f.return_type.as_deref(), Some("dict"));
        let names: Vec<_> = f.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["url", "args", "retries", "kw"]);
        assert!(f.params[1].rest);
        assert!(f.params[2].optional);
        assert_eq!(f.params[2].type_text.as_deref(), Some("int"));
    }

    #[test]
    fn multiline_def() {
        let src = "def build(\n    a,\n    b=None,\n):\n    pass";
        let Some(Construct::Function(f)) = run(match_def, src) else { panic!("no def") };
        assert_eq!(f.header_end, 3);
        assert_eq!(f.params.len(), 2);
    }

    #[test]
    fn private_names() {
        assert_eq!(visibility_of("__secret"), Visibility::Private);
        assert_eq!(visibility_of("_helper"), Visibility::Protected);
        assert_eq!(visibility_of("__init__"), Visibility::Public);
    }

    #[test]
    fn class_bases() {
        let Some(Construct::Class(c)) = run(match_class, "class Repo(Base, Mixin, metaclass=Meta):") else {
            panic!("no class");
        };
        assert_eq!(c.extends.as_deref(), Some("Base"));
        assert_eq!(c.implements, vec!["Mixin"]);

        let Some(Construct::Class(c)) = run(match_class, "class Shape(ABC):") else { panic!("no class") };
        assert!(c.is_abstract);
    }

    #[test]
    fn self_assignment_and_constant() {
        let Some(Construct::Property(p)) = run(match_self_assignment, "self.count = 0") else {
            panic!("no property");
        };
        assert_eq!(p.name, "count");
        assert_eq!(p.type_text.as_deref(), Some("any"));
        assert_eq!(p.default_value.as_deref(), Some("0"));

        let Some(Construct::Constant(k)) = run(match_constant, "MAX_RETRIES = 5") else { panic!("no const") };
        assert_eq!(k.value.as_deref(), Some("5"));
        assert!(run(match_constant, "DEBUG == True").is_none());
    }

    #[test]
    fn dunder_all_lists_exports() {
        let e = match_all_exports("__all__ = ['load', \"save\"]", 4);
        assert_eq!(e.iter().map(|x| x.name.as_str()).collect::<Vec<_>>(), vec!["load", "save"]);
        assert_eq!(e[0].line, 4);
        assert!(match_all_exports("ALL = ['x']", 1).is_empty());
    }

    #[test]
    fn class_closing_lines() {
        assert!(closes_class("def top():", 0));
        assert!(closes_class("@decorator", 0));
        assert!(closes_class("LIMIT = 3", 0));
        assert!(!closes_class("    def method(self):", 0));
        assert!(!closes_class("print('x')", 0));
    }
}
