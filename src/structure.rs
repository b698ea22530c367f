// src/structure.rs
//! Structural records produced per source file: functions, classes, interfaces,
//! types, constants, imports and exports plus the heuristic metadata attached
//! to them.
//!
//! `#[serde(default)]` on every record keeps JSON output readable by older
//! consumers when fields get added.

use serde::{Deserialize, Serialize};
use std::fmt;

/* ================================ Tags ================================ */

/// Source language family. Decides how extents are found.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceFamily {
    /// `.ts`, `.tsx`, `.js`, `.jsx`: blocks close on brace balance.
    #[default]
    Brace,
    /// `.py`: blocks close when indentation drops back.
    Indent,
}

impl SourceFamily {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(SourceFamily::Brace),
            "py" => Some(SourceFamily::Indent),
            _ => None,
        }
    }
}

impl fmt::Display for SourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceFamily::Brace => "brace",
            SourceFamily::Indent => "indent",
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    #[default]
    Function,
    Method,
    Arrow,
    Async,
    Generator,
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FunctionKind::*;
        let s = match self {
            Function => "function", Method => "method", Arrow => "arrow",
            Async => "async", Generator => "generator",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    pub fn from_str_ic<S: AsRef<str>>(s: S) -> Option<Self> {
        match s.as_ref().trim().to_ascii_lowercase().as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Protected => "protected",
        })
    }
}

/// Keyword-based class classification. Order of detection lives in `analyzers`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DesignPattern {
    Singleton,
    Factory,
    Observer,
    Strategy,
    Decorator,
    Adapter,
    Repository,
    Service,
    #[default]
    StandardClass,
}

impl fmt::Display for DesignPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DesignPattern::*;
        let s = match self {
            Singleton => "Singleton", Factory => "Factory", Observer => "Observer",
            Strategy => "Strategy", Decorator => "Decorator", Adapter => "Adapter",
            Repository => "Repository", Service => "Service", StandardClass => "Standard Class",
        };
        f.write_str(s)
    }
}

/// File purpose label. `label()` is the text shown in the report.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Testing,
    Configuration,
    TypesAndInterfaces,
    Utilities,
    Api,
    Components,
    Services,
    Models,
    Controllers,
    Middleware,
    MainModule,
    Classes,
    #[default]
    General,
}

impl Purpose {
    pub fn label(self) -> &'static str {
        use Purpose::*;
        match self {
            Testing => "Тестирование",
            Configuration => "Конфигурация",
            TypesAndInterfaces => "Типы и интерфейсы",
            Utilities => "Утилиты",
            Api => "API",
            Components => "Компоненты",
            Services => "Сервисы",
            Models => "Модели данных",
            Controllers => "Контроллеры",
            Middleware => "Промежуточное ПО",
            MainModule => "Основной модуль",
            Classes => "Классы",
            General => "Общий код",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImportOrigin {
    Internal,
    External,
    Builtin,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Function,
    Class,
    Interface,
    Type,
    #[default]
    Constant,
    Default,
    /// `export { a, b as c }` list entries.
    Named,
}

impl ExportKind {
    /// Maps the declaration keyword following `export` to a kind.
    pub fn from_keyword(kw: &str) -> Self {
        match kw.trim_end_matches('*') {
            "function" => ExportKind::Function,
            "class" => ExportKind::Class,
            "interface" => ExportKind::Interface,
            "type" | "enum" | "namespace" => ExportKind::Type,
            _ => ExportKind::Constant,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Type,
    Enum,
    Namespace,
}

/* ============================ Heuristic records ============================ */

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ErrorHandlingInfo {
    pub try_catch_blocks: usize,
    /// Identifiers bound by `catch (x)` / `except X`.
    pub error_types: Vec<String>,
    /// String literals mentioning an error or exception.
    pub error_messages: Vec<String>,
    pub fallbacks: Vec<String>,
    pub logging: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DataFlowInfo {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub transformations: Vec<String>,
    pub side_effects: Vec<String>,
    pub data_structures: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PerformanceInfo {
    pub bottlenecks: Vec<String>,
    pub optimizations: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigInfo {
    pub environment_variables: Vec<String>,
    pub mentions_config: bool,
    pub mentions_secrets: bool,
    pub has_validation: bool,
}

/* ============================= Construct records ============================= */

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ParameterInfo {
    pub name: String,
    pub type_text: Option<String>,
    pub optional: bool,
    pub default_value: Option<String>,
    /// `...rest` / `*args` / `**kwargs`
    pub rest: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FunctionInfo {
    pub name: String,
    pub kind: FunctionKind,
    pub params: Vec<ParameterInfo>,
    pub return_type: Option<String>,
    pub description: Option<String>,
    pub full_doc: Option<String>,
    pub location: String,
    /// 1-based declaring line.
    pub line: usize,
    pub exported: bool,
    pub default_export: bool,
    pub visibility: Option<Visibility>,
    pub is_static: bool,
    pub decorators: Vec<String>,
    pub complexity: u32,
    pub line_count: usize,
    pub dependencies: Vec<String>,
    pub business_logic: String,
    pub error_handling: ErrorHandlingInfo,
    pub data_flow: DataFlowInfo,
    pub performance: PerformanceInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PropertyInfo {
    pub name: String,
    pub type_text: Option<String>,
    pub description: Option<String>,
    pub exported: bool,
    pub readonly: bool,
    pub optional: bool,
    pub is_static: bool,
    pub visibility: Option<Visibility>,
    pub default_value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClassInfo {
    pub name: String,
    pub description: Option<String>,
    pub full_doc: Option<String>,
    pub location: String,
    pub line: usize,
    pub methods: Vec<FunctionInfo>,
    pub properties: Vec<PropertyInfo>,
    pub exported: bool,
    pub default_export: bool,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub is_abstract: bool,
    pub decorators: Vec<String>,
    pub line_count: usize,
    pub design_pattern: DesignPattern,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct InterfaceInfo {
    pub name: String,
    pub description: Option<String>,
    pub full_doc: Option<String>,
    pub location: String,
    pub line: usize,
    pub exported: bool,
    pub extends: Vec<String>,
    pub generic_params: Vec<String>,
    pub properties: Vec<PropertyInfo>,
    pub methods: Vec<FunctionInfo>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    pub location: String,
    pub line: usize,
    pub exported: bool,
    /// Text after `=` on the declaring line (aliases only).
    pub value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConstantInfo {
    pub name: String,
    pub type_text: Option<String>,
    pub description: Option<String>,
    pub exported: bool,
    pub default_export: bool,
    pub location: String,
    pub line: usize,
    pub value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ImportInfo {
    pub module: String,
    pub names: Vec<String>,
    pub is_default: bool,
    pub is_namespace: bool,
    pub line: usize,
    pub origin: Option<ImportOrigin>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ExportInfo {
    pub name: String,
    pub kind: ExportKind,
    pub is_default: bool,
    pub line: usize,
}

/* ================================ Per file ================================ */

/// Everything recovered from one source file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FileStructure {
    /// Project-relative, `/`-separated.
    pub path: String,
    pub family: SourceFamily,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    pub interfaces: Vec<InterfaceInfo>,
    pub types: Vec<TypeInfo>,
    pub constants: Vec<ConstantInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    /// Bytes.
    pub size: usize,
    pub line_count: usize,
    /// Sum of function and method complexities.
    pub complexity: u32,
    pub purpose: Purpose,
    pub business_domain: String,
    pub architectural_layer: String,
    pub configuration: ConfigInfo,
}

impl FileStructure {
    pub fn new(path: impl Into<String>, family: SourceFamily) -> Self {
        Self { path: path.into(), family, ..Default::default() }
    }

    /// Directory part of `path`; empty for files at the project root.
    pub fn directory(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit_once('/').map_or(self.path.as_str(), |(_, name)| name)
    }

    /// Names that leave the module, in declaration order, without repeats.
    /// Covers exported declarations and explicit `export` statements.
    pub fn exported_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut push = |n: &str| {
            if !names.iter().any(|x| x == n) {
                names.push(n.to_string());
            }
        };
        for f in self.functions.iter().filter(|f| f.exported) { push(&f.name); }
        for c in self.classes.iter().filter(|c| c.exported) { push(&c.name); }
        for i in self.interfaces.iter().filter(|i| i.exported) { push(&i.name); }
        for t in self.types.iter().filter(|t| t.exported) { push(&t.name); }
        for k in self.constants.iter().filter(|k| k.exported) { push(&k.name); }
        for e in &self.exports { push(&e.name); }
        names
    }

    /// Total function and method complexity.
    pub fn recompute_complexity(&mut self) {
        let top: u32 = self.functions.iter().map(|f| f.complexity).sum();
        let methods: u32 = self
            .classes
            .iter()
            .flat_map(|c| c.methods.iter())
            .map(|m| m.complexity)
            .sum();
        self.complexity = top + methods;
    }
}

/* ================================== Tests ================================== */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_from_extension() {
        assert_eq!(SourceFamily::from_extension("TSX"), Some(SourceFamily::Brace));
        assert_eq!(SourceFamily::from_extension("py"), Some(SourceFamily::Indent));
        assert_eq!(SourceFamily::from_extension("rs"), None);
    }

    #[test]
    fn directory_and_file_name_split() {
        let f = FileStructure::new("src/api/users.ts", SourceFamily::Brace);
        assert_eq!(f.directory(), "src/api");
        assert_eq!(f.file_name(), "users.ts");

        let root = FileStructure::new("main.py", SourceFamily::Indent);
        assert_eq!(root.directory(), "");
        assert_eq!(root.file_name(), "main.py");
    }

    #[test]
    fn exported_names_are_unique_and_ordered() {
        let mut f = FileStructure::new("a.ts", SourceFamily::Brace);
        f.functions.push(FunctionInfo { name: "run".into(), exported: true, ..Default::default() });
        f.functions.push(FunctionInfo { name: "hidden".into(), ..Default::default() });
        f.classes.push(ClassInfo { name: "Runner".into(), exported: true, ..Default::default() });
        f.exports.push(ExportInfo { name: "run".into(), kind: ExportKind::Function, ..Default::default() });
        assert_eq!(f.exported_names(), vec!["run".to_string(), "Runner".to_string()]);
    }

    #[test]
    fn complexity_sums_functions_and_methods() {
        let mut f = FileStructure::new("a.py", SourceFamily::Indent);
        f.functions.push(FunctionInfo { complexity: 3, ..Default::default() });
        f.classes.push(ClassInfo {
            methods: vec![FunctionInfo { complexity: 2, ..Default::default() }],
            ..Default::default()
        });
        f.recompute_complexity();
        assert_eq!(f.complexity, 5);
    }

    #[test]
    fn design_pattern_display() {
        assert_eq!(DesignPattern::StandardClass.to_string(), "Standard Class");
        assert_eq!(Purpose::General.to_string(), "Общий код");
    }
}
