// src/map_view.rs
//! Repository map renderer. Pure: same structures and timestamp in, same
//! text out. Labels are Russian, matching the reports the tool has always
//! produced.

use std::fmt::{self, Write as _};

use crate::{
    error::Result,
    helpers::one_line,
    structure::{
        ClassInfo, ConstantInfo, FileStructure, FunctionInfo, FunctionKind, InterfaceInfo, PropertyInfo,
        TypeInfo, TypeKind, Visibility,
    },
};

/// Constant values longer than this are clipped in the listing.
const VALUE_CAP: usize = 80;

const ROOT_LABEL: &str = "Корень проекта";

/// Renders the text report. `generated_at` is embedded verbatim in the footer.
pub fn render_map(files: &[FileStructure], generated_at: &str) -> String {
    let mut out = String::with_capacity(4096 + files.len() * 512);
    // fmt::Write into a String cannot fail
    let _ = write_map(&mut out, files, generated_at);
    out
}

/// Pretty JSON array of the structures.
pub fn render_json(files: &[FileStructure]) -> Result<String> {
    Ok(serde_json::to_string_pretty(files)?)
}

/// Aggregate counts shared by the header and the closing statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub files: usize,
    pub bytes: usize,
    pub functions: (usize, usize),
    pub classes: (usize, usize),
    pub interfaces: (usize, usize),
    pub types: (usize, usize),
    pub constants: (usize, usize),
    pub complexity: u64,
}

impl Totals {
    /// `(total, exported)` pairs over all files.
    pub fn of(files: &[FileStructure]) -> Self {
        fn pair<T>(
            files: &[FileStructure],
            items: impl Fn(&FileStructure) -> &[T],
            exported: impl Fn(&T) -> bool,
        ) -> (usize, usize) {
            files.iter().fold((0, 0), |(all, exp), f| {
                let v = items(f);
                (all + v.len(), exp + v.iter().filter(|&x| exported(x)).count())
            })
        }
        Self {
            files: files.len(),
            bytes: files.iter().map(|f| f.size).sum(),
            functions: pair(files, |f| f.functions.as_slice(), |x: &FunctionInfo| x.exported),
            classes: pair(files, |f| f.classes.as_slice(), |x: &ClassInfo| x.exported),
            interfaces: pair(files, |f| f.interfaces.as_slice(), |x: &InterfaceInfo| x.exported),
            types: pair(files, |f| f.types.as_slice(), |x: &TypeInfo| x.exported),
            constants: pair(files, |f| f.constants.as_slice(), |x: &ConstantInfo| x.exported),
            complexity: files.iter().map(|f| u64::from(f.complexity)).sum(),
        }
    }
}

fn write_map(out: &mut String, files: &[FileStructure], generated_at: &str) -> fmt::Result {
    let totals = Totals::of(files);

    writeln!(out, "# Карта репозитория\n")?;
    writeln!(out, "*Сгенерировано автоматически*\n")?;
    writeln!(out, "> Поддерживаются TypeScript/JavaScript (.ts, .tsx, .js, .jsx) и Python (.py) файлы\n")?;
    writeln!(out, "## 🏗️ Архитектурный обзор\n")?;
    writeln!(out, "### 📊 Общая статистика\n")?;
    writeln!(out, "- Всего файлов: {}", totals.files)?;
    #[allow(clippy::cast_precision_loss)]
    let kb = totals.bytes as f64 / 1024.0;
    writeln!(out, "- Общий размер: {kb:.1} KB")?;
    write_counts(out, &totals)?;
    writeln!(out)?;

    writeln!(out, "### 🎯 Назначения файлов\n")?;
    for (label, count) in purpose_breakdown(files) {
        writeln!(out, "**{label}:** {count} файлов")?;
    }
    writeln!(out)?;

    writeln!(out, "## 📁 Структура\n")?;
    for (dir, dir_files) in group_by_directory(files) {
        let title = if dir.is_empty() { ROOT_LABEL } else { dir };
        writeln!(out, "### 📂 {title}\n")?;
        for file in dir_files {
            write_file(out, file)?;
        }
    }

    writeln!(out, "## 📊 Статистика\n")?;
    writeln!(out, "- Всего файлов: {}", totals.files)?;
    write_counts(out, &totals)?;
    writeln!(out, "- Суммарная сложность: {}", totals.complexity)?;
    writeln!(out)?;

    writeln!(out, "## 🔗 Основные экспорты\n")?;
    for file in files {
        let names = file.exported_names();
        if names.is_empty() {
            continue;
        }
        writeln!(out, "### {}", file.path)?;
        for name in names {
            writeln!(out, "- `{name}`")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "---")?;
    writeln!(out, "*Карта сгенерирована: {generated_at}*")
}

fn write_counts(out: &mut String, t: &Totals) -> fmt::Result {
    writeln!(out, "- Функций: {} (экспортировано: {})", t.functions.0, t.functions.1)?;
    writeln!(out, "- Классов: {} (экспортировано: {})", t.classes.0, t.classes.1)?;
    writeln!(out, "- Интерфейсов: {} (экспортировано: {})", t.interfaces.0, t.interfaces.1)?;
    writeln!(out, "- Типов: {} (экспортировано: {})", t.types.0, t.types.1)?;
    writeln!(out, "- Констант: {} (экспортировано: {})", t.constants.0, t.constants.1)
}

/// Purpose labels in first-seen order with their file counts.
fn purpose_breakdown(files: &[FileStructure]) -> Vec<(&'static str, usize)> {
    let mut groups: Vec<(&'static str, usize)> = Vec::new();
    for f in files {
        let label = f.purpose.label();
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => groups.push((label, 1)),
        }
    }
    groups
}

/// Files grouped by directory, both in first-seen order.
fn group_by_directory(files: &[FileStructure]) -> Vec<(&str, Vec<&FileStructure>)> {
    let mut groups: Vec<(&str, Vec<&FileStructure>)> = Vec::new();
    for f in files {
        let dir = f.directory();
        match groups.iter_mut().find(|(d, _)| *d == dir) {
            Some((_, v)) => v.push(f),
            None => groups.push((dir, vec![f])),
        }
    }
    groups
}

/* ------------------------------- per file ------------------------------- */

fn write_file(out: &mut String, file: &FileStructure) -> fmt::Result {
    writeln!(out, "#### 📄 {}\n", file.file_name())?;
    write!(
        out,
        "*Назначение: {} · Домен: {} · Слой: {} · Сложность: {}",
        file.purpose, file.business_domain, file.architectural_layer, file.complexity
    )?;
    if !file.configuration.environment_variables.is_empty() {
        write!(out, " · Переменные окружения: {}", file.configuration.environment_variables.join(", "))?;
    }
    writeln!(out, "*\n")?;

    if !file.functions.is_empty() {
        writeln!(out, "**Функции:**\n")?;
        for f in &file.functions {
            let export = if f.exported { "export " } else { "" };
            write!(out, "- `{export}{}`", signature(f))?;
            tail(out, f.description.as_deref(), Some(f.line))?;
        }
        writeln!(out)?;
    }

    if !file.classes.is_empty() {
        writeln!(out, "**Классы:**\n")?;
        for c in &file.classes {
            write_class(out, c)?;
        }
    }

    if !file.interfaces.is_empty() {
        writeln!(out, "**Интерфейсы:**\n")?;
        for i in &file.interfaces {
            let export = if i.exported { "export " } else { "" };
            let generics = if i.generic_params.is_empty() { String::new() } else { format!("<{}>", i.generic_params.join(", ")) };
            let extends = if i.extends.is_empty() { String::new() } else { format!(" extends {}", i.extends.join(", ")) };
            write!(out, "- `{export}interface {}{generics}{extends}`", i.name)?;
            tail(out, i.description.as_deref(), Some(i.line))?;
            for p in &i.properties {
                write!(out, "  - `{}`", property(p))?;
                tail(out, p.description.as_deref(), None)?;
            }
            for m in &i.methods {
                write!(out, "  - `{}`", signature(m))?;
                tail(out, m.description.as_deref(), None)?;
            }
            writeln!(out)?;
        }
    }

    if !file.types.is_empty() {
        writeln!(out, "**Типы:**\n")?;
        for t in &file.types {
            let export = if t.exported { "export " } else { "" };
            let keyword = match t.kind {
                TypeKind::Type => "type",
                TypeKind::Enum => "enum",
                TypeKind::Namespace => "namespace",
            };
            let value = t.value.as_deref().map(|v| format!(" = {}", clip(v))).unwrap_or_default();
            write!(out, "- `{export}{keyword} {}{value}`", t.name)?;
            tail(out, t.description.as_deref(), Some(t.line))?;
        }
        writeln!(out)?;
    }

    if !file.constants.is_empty() {
        writeln!(out, "**Константы:**\n")?;
        for k in &file.constants {
            let export = match (k.exported, k.default_export) {
                (_, true) => "export default ",
                (true, false) => "export ",
                _ => "",
            };
            let value = k.value.as_deref().map(|v| format!(" = {}", clip(v))).unwrap_or_default();
            write!(out, "- `{export}{}{value}`", k.name)?;
            tail(out, k.description.as_deref(), Some(k.line))?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn write_class(out: &mut String, c: &ClassInfo) -> fmt::Result {
    let export = if c.exported { "export " } else { "" };
    let abstract_ = if c.is_abstract { "abstract " } else { "" };
    let extends = c.extends.as_deref().map(|e| format!(" extends {e}")).unwrap_or_default();
    let implements = if c.implements.is_empty() { String::new() } else { format!(" implements {}", c.implements.join(", ")) };
    write!(
        out,
        "- `{export}{abstract_}class {}{extends}{implements} (архитектурный паттерн: {})`",
        c.name, c.design_pattern
    )?;
    tail(out, c.description.as_deref(), Some(c.line))?;

    for m in &c.methods {
        let vis = match m.visibility {
            Some(Visibility::Private) => "private ",
            Some(Visibility::Protected) => "protected ",
            _ => "",
        };
        let stat = if m.is_static { "static " } else { "" };
        write!(out, "  - `{vis}{stat}{}`", signature(m))?;
        tail(out, m.description.as_deref(), Some(m.line))?;
    }
    for p in &c.properties {
        write!(out, "  - `{}`", property(p))?;
        tail(out, p.description.as_deref(), None)?;
    }
    writeln!(out)
}

/// ` - description (строка N)` and the line break.
fn tail(out: &mut String, description: Option<&str>, line: Option<usize>) -> fmt::Result {
    if let Some(d) = description {
        write!(out, " - {}", one_line(d))?;
    }
    if let Some(n) = line {
        write!(out, " (строка {n})")?;
    }
    writeln!(out)
}

/// `async name(a?: T, ...rest): R`
pub fn signature(f: &FunctionInfo) -> String {
    let prefix = match f.kind {
        FunctionKind::Async => "async ",
        FunctionKind::Generator => "function* ",
        _ => "",
    };
    let params: Vec<String> = f
        .params
        .iter()
        .map(|p| {
            let rest = if p.rest { "..." } else { "" };
            let opt = if p.optional { "?" } else { "" };
            let ty = p.type_text.as_deref().map(|t| format!(": {t}")).unwrap_or_default();
            format!("{rest}{}{opt}{ty}", p.name)
        })
        .collect();
    let ret = f.return_type.as_deref().map(|r| format!(": {r}")).unwrap_or_default();
    format!("{prefix}{}({}){ret}", f.name, params.join(", "))
}

fn property(p: &PropertyInfo) -> String {
    let stat = if p.is_static { "static " } else { "" };
    let ro = if p.readonly { "readonly " } else { "" };
    let opt = if p.optional { "?" } else { "" };
    let ty = p.type_text.as_deref().map(|t| format!(": {t}")).unwrap_or_default();
    format!("{stat}{ro}{}{opt}{ty}", p.name)
}

fn clip(value: &str) -> String {
    let v = one_line(value);
    if v.chars().count() <= VALUE_CAP {
        return v;
    }
    let head: String = v.chars().take(VALUE_CAP).collect();
    format!("{head}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::build_structure, structure::SourceFamily};
    use indoc::indoc;

    const STAMP: &str = "2024-01-01T00:00:00Z";

    fn sample() -> Vec<FileStructure> {
        let ts = indoc! {"
            /** Entry point. */
            export function testFunction(param: string): string {
              return param;
            }

            function local() {}

            export class TestClass {
              constructor(private name: string) {}
            }
        "};
        let py = indoc! {"
            API_URL = os.getenv('API_URL')

            def _private():
                pass
        "};
        vec![
            build_structure("src/index.ts", ts, SourceFamily::Brace),
            build_structure("main.py", py, SourceFamily::Indent),
        ]
    }

    #[test]
    fn empty_scan_reports_zero_files() {
        let text = render_map(&[], STAMP);
        assert!(text.contains("- Всего файлов: 0"));
        assert!(!text.contains(ROOT_LABEL));
        assert!(text.ends_with("*Карта сгенерирована: 2024-01-01T00:00:00Z*\n"));
    }

    #[test]
    fn listing_has_signatures_and_lines() {
        let text = render_map(&sample(), STAMP);
        assert!(text.contains("- Всего файлов: 2"));
        assert!(text.contains("### 📂 src"));
        assert!(text.contains("### 📂 Корень проекта"));
        assert!(text.contains("- `export testFunction(param: string): string` - Entry point. (строка 2)"));
        assert!(text.contains("TestClass"));
        assert!(text.contains("  - `constructor(name: string)` (строка 9)"));
        assert!(text.contains("Переменные окружения: API_URL"));
    }

    #[test]
    fn exported_counts_match_flags() {
        let files = sample();
        let t = Totals::of(&files);
        assert_eq!(t.functions, (3, 1));
        assert_eq!(t.classes, (1, 1));
        assert_eq!(t.constants, (1, 1));
        let text = render_map(&files, STAMP);
        assert!(text.contains("- Функций: 3 (экспортировано: 1)"));
        assert!(text.contains("### src/index.ts\n- `testFunction`\n- `TestClass`\n"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let files = sample();
        assert_eq!(render_map(&files, STAMP), render_map(&files, STAMP));
    }

    #[test]
    fn json_lists_every_file() {
        let json = render_json(&sample()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v.as_array().map(Vec::len), Some(2));
        assert_eq!(v[0]["path"], "src/index.ts");
        assert_eq!(v[0]["functions"][0]["kind"], "function");
    }

    #[test]
    fn long_values_are_clipped() {
        let long = "x".repeat(200);
        assert_eq!(clip(&long).chars().count(), VALUE_CAP + 1);
        assert_eq!(clip("a  b"), "a b");
    }
}
