// src/builder.rs
//! Turns one source file into a `FileStructure`.
//!
//! A single left-to-right pass over the lines. The scan state is an explicit
//! value (`ScanState`) and anything that attaches to the *next* construct
//! (doc comment, decorators) sits in `Pending`. Matchers only recognize
//! headers; extents, nesting and attachment are decided here.

use tracing::{debug, trace};

use crate::{
    analyzers::{analyze_body, design_pattern},
    brace_matchers::{self, match_exports},
    construct::{first_match, BodyShape, ClassHead, Construct, Cursor, FunctionHead},
    doc_comments::{docstring_at, read_docstring, DocBuffer, DocComment},
    helpers::{
        brace_counts, brace_delta, brace_extent, indent_extent, indentation, is_blank, window,
        MAX_LOOKAHEAD,
    },
    indent_matchers::{self, closes_class, match_all_exports, match_self_assignment},
    intent,
    structure::{ClassInfo, FileStructure, FunctionInfo, FunctionKind, PropertyInfo, SourceFamily},
};

/// Builds the structure of one file. Never fails: lines that match nothing
/// are skipped.
pub fn build_structure(path: &str, content: &str, family: SourceFamily) -> FileStructure {
    let lines: Vec<&str> = content.lines().collect();
    let mut out = Scan::new(path, &lines, family).run();

    out.size = content.len();
    out.line_count = lines.len();
    out.purpose = intent::file_purpose(path, content);
    out.business_domain = intent::business_domain(content);
    out.architectural_layer = intent::architectural_layer(path);
    out.configuration = intent::configuration(content);
    out.recompute_complexity();

    debug!(
        path,
        functions = out.functions.len(),
        classes = out.classes.len(),
        interfaces = out.interfaces.len(),
        imports = out.imports.len(),
        "file structure built"
    );
    out
}

/* ================================ Scan state ================================ */

enum ScanState {
    TopLevel,
    InClass(ClassScope),
}

/// The class currently being filled.
struct ClassScope {
    class: ClassInfo,
    /// Index of the class line.
    start: usize,
    /// Brace family: closing line. Indentation family: last body line seen.
    end: usize,
    /// Brace depth relative to the class line (brace family).
    depth: i32,
    /// Indentation of the class line (indentation family).
    indent: usize,
}

/// Attaches to the next construct.
#[derive(Default)]
struct Pending {
    doc: DocBuffer,
    decorators: Vec<String>,
}

impl Pending {
    fn clear(&mut self) {
        self.doc.clear();
        self.decorators.clear();
    }

    fn take(&mut self) -> (DocComment, Vec<String>) {
        let doc = self.doc.take().unwrap_or_default();
        (doc, std::mem::take(&mut self.decorators))
    }
}

struct Scan<'a> {
    path: &'a str,
    lines: &'a [&'a str],
    family: SourceFamily,
    out: FileStructure,
    state: ScanState,
    pending: Pending,
    /// File-level brace depth (brace family).
    depth: i32,
    in_block_comment: bool,
}

impl<'a> Scan<'a> {
    fn new(path: &'a str, lines: &'a [&'a str], family: SourceFamily) -> Self {
        Self {
            path,
            lines,
            family,
            out: FileStructure::new(path, family),
            state: ScanState::TopLevel,
            pending: Pending::default(),
            depth: 0,
            in_block_comment: false,
        }
    }

    fn run(mut self) -> FileStructure {
        let mut idx = 0;
        while idx < self.lines.len() {
            idx = match (std::mem::replace(&mut self.state, ScanState::TopLevel), self.family) {
                (ScanState::TopLevel, SourceFamily::Brace) => self.brace_top_level(idx),
                (ScanState::InClass(scope), SourceFamily::Brace) => self.brace_class_body(scope, idx),
                (ScanState::TopLevel, SourceFamily::Indent) => self.indent_top_level(idx),
                (ScanState::InClass(scope), SourceFamily::Indent) => self.indent_class_body(scope, idx),
            };
        }
        // end of file closes whatever class is open
        if let ScanState::InClass(scope) = std::mem::replace(&mut self.state, ScanState::TopLevel) {
            self.close_class(scope);
        }
        self.out
    }

    fn close_class(&mut self, scope: ClassScope) {
        let ClassScope { mut class, start, end, .. } = scope;
        let end = end.max(start);
        class.line_count = end - start + 1;
        class.design_pattern = design_pattern(window(self.lines, start, end));
        trace!(class = %class.name, methods = class.methods.len(), "class closed");
        self.out.classes.push(class);
    }

    /// Fills a function record from its header and the 0-based extent `start..=end`.
    fn function_info(
        &self,
        head: FunctionHead,
        start: usize,
        end: usize,
        doc: DocComment,
        decorators: Vec<String>,
    ) -> FunctionInfo {
        let end = end.max(start);
        let analysis = analyze_body(window(self.lines, start, end), Some(head.name.as_str()), self.family);

        FunctionInfo {
            name: head.name,
            kind: head.kind,
            params: head.params,
            return_type: head.return_type,
            description: doc.description,
            full_doc: doc.full,
            location: self.path.to_string(),
            line: start + 1,
            exported: head.exported,
            default_export: head.default_export,
            visibility: head.visibility,
            is_static: head.is_static,
            decorators,
            complexity: analysis.complexity,
            line_count: end - start + 1,
            dependencies: analysis.dependencies,
            business_logic: analysis.business_logic,
            error_handling: analysis.error_handling,
            data_flow: analysis.data_flow,
            performance: analysis.performance,
        }
    }
}

/* ================================ Brace family ================================ */

impl Scan<'_> {
    /// Consumes comment lines, feeding JSDoc blocks into the pending buffer.
    fn comment_line(&mut self, t: &str) -> bool {
        if self.pending.doc.is_open() {
            self.pending.doc.push(t);
            return true;
        }
        if self.in_block_comment {
            if t.contains("*/") {
                self.in_block_comment = false;
            }
            return true;
        }
        if t.starts_with("/**") {
            self.pending.doc.start(t);
            return true;
        }
        if t.starts_with("/*") {
            self.in_block_comment = !t.contains("*/");
            return true;
        }
        t.starts_with("//")
    }

    /// Moves past `start..=end` at file level, carrying their net brace change.
    fn skip(&mut self, start: usize, end: usize) -> usize {
        self.depth = (self.depth + net_delta(self.lines, start, end)).max(0);
        end.max(start) + 1
    }

    fn brace_top_level(&mut self, idx: usize) -> usize {
        let line = self.lines[idx];
        let t = line.trim();
        if self.comment_line(t) {
            return idx + 1;
        }
        if t.is_empty() {
            self.pending.doc.clear();
            return idx + 1;
        }
        if self.depth > 0 {
            // decorator arguments may span lines; keep the decorators
            self.pending.doc.clear();
            return self.skip(idx, idx);
        }
        if let Some(decorator) = t.strip_prefix('@') {
            self.pending.decorators.push(decorator.trim().to_string());
            return self.skip(idx, idx);
        }

        self.out.exports.extend(match_exports(t, idx + 1));

        let cursor = Cursor::new(self.lines, idx);
        let Some((production, construct)) = first_match(brace_matchers::TOP_LEVEL, &cursor) else {
            self.pending.clear();
            return self.skip(idx, idx);
        };
        trace!(production, line = idx + 1, "top-level match");
        let (doc, decorators) = self.pending.take();
        let location = self.path.to_string();

        match construct {
            Construct::Imports(imports) => {
                self.out.imports.extend(imports);
                self.skip(idx, idx)
            }
            Construct::Class(head) => self.open_brace_class(head, idx, doc, decorators),
            Construct::Interface(mut iface) => {
                let end = brace_extent(self.lines, idx);
                iface.description = doc.description;
                iface.full_doc = doc.full;
                iface.location = location;
                for m in &mut iface.methods {
                    m.location.clone_from(&iface.location);
                }
                self.out.interfaces.push(iface);
                self.skip(idx, end)
            }
            Construct::Type(mut ty) => {
                let end = if brace_delta(line) > 0 { brace_extent(self.lines, idx) } else { idx };
                ty.description = doc.description;
                ty.location = location;
                self.out.types.push(ty);
                self.skip(idx, end)
            }
            Construct::Function(head) => {
                let end = match head.body {
                    BodyShape::Block => block_end(self.lines, idx, head.header_end),
                    BodyShape::Expression => expression_extent(self.lines, idx, head.header_end),
                };
                let f = self.function_info(head, idx, end, doc, decorators);
                self.out.functions.push(f);
                self.skip(idx, end)
            }
            Construct::Constant(mut k) => {
                k.description = doc.description;
                k.location = location;
                self.out.constants.push(k);
                self.skip(idx, idx)
            }
            Construct::Method(_) | Construct::Property(_) | Construct::Decorator(_) => self.skip(idx, idx),
        }
    }

    fn open_brace_class(&mut self, head: ClassHead, idx: usize, doc: DocComment, decorators: Vec<String>) -> usize {
        let end = brace_extent(self.lines, idx);
        let scope = ClassScope {
            class: class_info(head, self.path, idx, doc, decorators),
            start: idx,
            end,
            depth: brace_delta(self.lines[idx]).max(0),
            indent: indentation(self.lines[idx]),
        };
        if end == idx {
            // one-line class: nothing to collect
            self.close_class(scope);
        } else {
            self.state = ScanState::InClass(scope);
        }
        idx + 1
    }

    fn brace_class_body(&mut self, mut scope: ClassScope, idx: usize) -> usize {
        let next = self.brace_class_line(&mut scope, idx);
        if next > scope.end {
            self.close_class(scope);
        } else {
            self.state = ScanState::InClass(scope);
        }
        next
    }

    fn brace_class_line(&mut self, scope: &mut ClassScope, idx: usize) -> usize {
        if idx >= scope.end {
            return idx + 1;
        }
        let line = self.lines[idx];
        let t = line.trim();
        if self.comment_line(t) {
            return idx + 1;
        }
        if t.is_empty() {
            self.pending.doc.clear();
            return idx + 1;
        }
        if scope.depth != 1 {
            self.pending.doc.clear();
            scope.depth = (scope.depth + brace_delta(line)).max(0);
            return idx + 1;
        }
        if let Some(decorator) = t.strip_prefix('@') {
            self.pending.decorators.push(decorator.trim().to_string());
            scope.depth = (scope.depth + brace_delta(line)).max(0);
            return idx + 1;
        }

        let cursor = Cursor::new(self.lines, idx);
        let hit = first_match(brace_matchers::CLASS_BODY, &cursor);
        let (doc, decorators) = self.pending.take();
        match hit {
            Some((_, Construct::Method(head))) => {
                let end = block_end(self.lines, idx, head.header_end).min(scope.end);
                scope.depth = (scope.depth + net_delta(self.lines, idx, end)).max(0);
                let method = self.function_info(head, idx, end, doc, decorators);
                scope.class.methods.push(method);
                end + 1
            }
            Some((_, Construct::Property(mut p))) => {
                p.description = doc.description;
                add_property(&mut scope.class, p);
                scope.depth = (scope.depth + brace_delta(line)).max(0);
                idx + 1
            }
            _ => {
                scope.depth = (scope.depth + brace_delta(line)).max(0);
                idx + 1
            }
        }
    }
}

/// Last line of a block-bodied function whose signature ends on `header_end`.
/// Signatures without a body (overloads, abstract members) end there.
fn block_end(lines: &[&str], start: usize, header_end: usize) -> usize {
    if brace_counts(lines[header_end]).0 == 0 {
        return header_end;
    }
    brace_extent(lines, start).max(header_end)
}

/// Last line of an expression-bodied arrow: continuation lines are indented
/// deeper than the declaration or start with a closing bracket; a line ending
/// in `;` stops the expression.
fn expression_extent(lines: &[&str], start: usize, header_end: usize) -> usize {
    let base = indentation(lines[start]);
    let mut end = header_end;
    if lines[header_end].trim_end().ends_with(';') {
        return end;
    }
    let stop = lines.len().min(header_end + 1 + MAX_LOOKAHEAD);
    for (j, l) in lines.iter().enumerate().take(stop).skip(header_end + 1) {
        if is_blank(l) {
            break;
        }
        let t = l.trim_start();
        if indentation(l) <= base && !t.starts_with([')', ']', '}']) {
            break;
        }
        end = j;
        if l.trim_end().ends_with(';') {
            break;
        }
    }
    end
}

fn net_delta(lines: &[&str], start: usize, end: usize) -> i32 {
    window(lines, start, end).iter().map(|l| brace_delta(l)).sum()
}

/* ============================= Indentation family ============================= */

impl Scan<'_> {
    fn indent_top_level(&mut self, idx: usize) -> usize {
        let line = self.lines[idx];
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            return idx + 1;
        }
        if let Some((_, end)) = docstring_at(self.lines, idx) {
            self.pending.clear();
            return end + 1;
        }
        if t.starts_with("__all__") {
            let (text, end) = join_bracketed(self.lines, idx);
            self.out.exports.extend(match_all_exports(&text, idx + 1));
            self.pending.clear();
            return end + 1;
        }

        let cursor = Cursor::new(self.lines, idx);
        let Some((production, construct)) = first_match(indent_matchers::TOP_LEVEL, &cursor) else {
            self.pending.clear();
            return idx + 1;
        };
        trace!(production, line = idx + 1, "top-level match");

        match construct {
            Construct::Decorator(d) => {
                self.pending.decorators.push(d);
                idx + 1
            }
            Construct::Imports(imports) => {
                self.pending.clear();
                self.out.imports.extend(imports);
                join_bracketed(self.lines, idx).1 + 1
            }
            Construct::Class(head) => self.open_indent_class(head, idx),
            Construct::Function(head) => {
                let base = indentation(line);
                let end = indent_extent(self.lines, head.header_end, base);
                let doc = read_docstring(self.lines, head.header_end, base).map(|(d, _)| d).unwrap_or_default();
                let decorators = std::mem::take(&mut self.pending.decorators);
                let f = self.function_info(head, idx, end, doc, decorators);
                self.out.functions.push(f);
                end + 1
            }
            Construct::Constant(mut k) => {
                self.pending.clear();
                k.location = self.path.to_string();
                self.out.constants.push(k);
                idx + 1
            }
            _ => {
                self.pending.clear();
                idx + 1
            }
        }
    }

    fn open_indent_class(&mut self, head: ClassHead, idx: usize) -> usize {
        let base = indentation(self.lines[idx]);
        let (doc, last) = match read_docstring(self.lines, idx, base) {
            Some((doc, end)) => (doc, end),
            None => (DocComment::default(), idx),
        };
        let decorators = std::mem::take(&mut self.pending.decorators);
        self.state = ScanState::InClass(ClassScope {
            class: class_info(head, self.path, idx, doc, decorators),
            start: idx,
            end: last,
            depth: 0,
            indent: base,
        });
        last + 1
    }

    fn indent_class_body(&mut self, mut scope: ClassScope, idx: usize) -> usize {
        let line = self.lines[idx];
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            self.state = ScanState::InClass(scope);
            return idx + 1;
        }
        if closes_class(line, scope.indent) {
            // the line is re-read at top level
            self.close_class(scope);
            return idx;
        }
        scope.end = idx;
        if let Some((_, end)) = docstring_at(self.lines, idx) {
            scope.end = end;
            self.state = ScanState::InClass(scope);
            return end + 1;
        }

        let cursor = Cursor::new(self.lines, idx);
        let next = match first_match(indent_matchers::CLASS_BODY, &cursor).map(|(_, c)| c) {
            Some(Construct::Decorator(d)) => {
                self.pending.decorators.push(d);
                idx + 1
            }
            Some(Construct::Class(_)) => {
                // a nested class ends the current one and opens its own scope
                self.close_class(scope);
                return idx;
            }
            Some(Construct::Function(head)) => self.indent_method(&mut scope, head, idx) + 1,
            Some(Construct::Property(p)) => {
                self.pending.clear();
                add_property(&mut scope.class, p);
                idx + 1
            }
            _ => {
                self.pending.clear();
                idx + 1
            }
        };
        self.state = ScanState::InClass(scope);
        next
    }

    /// Records a method and the `self.x = ...` assignments in its body.
    /// Returns the method's last line.
    fn indent_method(&mut self, scope: &mut ClassScope, head: FunctionHead, idx: usize) -> usize {
        let base = indentation(self.lines[idx]);
        let end = indent_extent(self.lines, head.header_end, base);
        let doc = read_docstring(self.lines, head.header_end, base).map(|(d, _)| d).unwrap_or_default();
        let decorators = std::mem::take(&mut self.pending.decorators);

        let is_static = decorators.iter().any(|d| d == "staticmethod" || d == "classmethod");
        if decorators.iter().any(|d| d.ends_with("abstractmethod")) {
            scope.class.is_abstract = true;
        }
        for j in head.header_end + 1..=end {
            if let Some(Construct::Property(p)) = match_self_assignment(&Cursor::new(self.lines, j)) {
                add_property(&mut scope.class, p);
            }
        }

        let mut method = self.function_info(head, idx, end, doc, decorators);
        method.kind = FunctionKind::Method;
        method.exported = false;
        method.is_static = is_static;
        scope.class.methods.push(method);
        scope.end = end;
        end
    }
}

/// Joins lines from `start` while `(`/`[` opened on them are still open.
fn join_bracketed(lines: &[&str], start: usize) -> (String, usize) {
    let open = |s: &str| {
        s.chars().fold(0i32, |n, c| match c {
            '(' | '[' => n + 1,
            ')' | ']' => n - 1,
            _ => n,
        })
    };
    let mut text = lines[start].trim().to_string();
    let mut end = start;
    while open(&text) > 0 && end + 1 < lines.len() && end - start < MAX_LOOKAHEAD {
        end += 1;
        text.push(' ');
        text.push_str(lines[end].trim());
    }
    (text, end)
}

/* ================================ Shared ================================ */

fn class_info(head: ClassHead, path: &str, idx: usize, doc: DocComment, decorators: Vec<String>) -> ClassInfo {
    ClassInfo {
        name: head.name,
        description: doc.description,
        full_doc: doc.full,
        location: path.to_string(),
        line: idx + 1,
        exported: head.exported,
        default_export: head.default_export,
        extends: head.extends,
        implements: head.implements,
        is_abstract: head.is_abstract,
        decorators,
        ..Default::default()
    }
}

/// First declaration of a name wins.
fn add_property(class: &mut ClassInfo, p: PropertyInfo) {
    if !class.properties.iter().any(|q| q.name == p.name) {
        class.properties.push(p);
    }
}

/* ================================== Tests ================================== */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{DesignPattern, TypeKind, Visibility};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn names<T>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<&str> {
        items.iter().map(name).collect()
    }

    const TS_FIXTURE: &str = indoc! {r#"
        import { readFile } from 'fs';
        import axios from 'axios';

        /** Max retries. */
        export const MAX = 5;

        /**
         * Base shape.
         */
        export interface Shape {
          id: string;
          area(): number;
        }

        export type Id = string | number;

        export enum Color { Red, Green }

        /**
         * Fetches a user.
         * @param id user id
         */
        export async function fetchUser(id: string): Promise<User> {
          try {
            const res = await axios.get(`/users/${id}`);
            return res.data;
          } catch (err) {
            console.log('error: fetch failed');
            return null;
          }
        }

        @Injectable()
        export class Foo extends Bar implements Baz {
          private count: number = 0;
          static instance: Foo;

          constructor(private name: string) {
            super();
          }

          /** Resets the counter. */
          method(): void {
            if (this.count > 1) {
              this.count = 0;
            }
          }
        }

        export const double = (x: number): number => x * 2;

        function helper() {
          const inner = 1;
          function nested() {}
        }
    "#};

    #[test]
    fn brace_top_level_constructs() {
        let fs = build_structure("src/index.ts", TS_FIXTURE, SourceFamily::Brace);

        assert_eq!(fs.imports.len(), 2);
        assert_eq!(names(&fs.functions, |f| f.name.as_str()), vec!["fetchUser", "double", "helper"]);
        assert_eq!(names(&fs.interfaces, |i| i.name.as_str()), vec!["Shape"]);
        assert_eq!(names(&fs.types, |t| t.name.as_str()), vec!["Id", "Color"]);
        assert_eq!(fs.types[1].kind, TypeKind::Enum);
        assert_eq!(fs.exports.len(), 7);
        assert_eq!(fs.line_count, 55);

        let max = &fs.constants[0];
        assert_eq!(fs.constants.len(), 1);
        assert_eq!(max.name, "MAX");
        assert_eq!(max.value.as_deref(), Some("5"));
        assert_eq!(max.line, 5);
        assert!(max.exported);
        assert_eq!(max.description.as_deref(), Some("Max retries."));

        let shape = &fs.interfaces[0];
        assert_eq!(shape.description.as_deref(), Some("Base shape."));
        assert_eq!(shape.location, "src/index.ts");
        assert_eq!(shape.properties.len(), 1);
        assert_eq!(shape.methods.len(), 1);
    }

    #[test]
    fn brace_function_extent_and_analysis() {
        let fs = build_structure("src/index.ts", TS_FIXTURE, SourceFamily::Brace);
        let f = &fs.functions[0];
        assert_eq!(f.kind, FunctionKind::Async);
        assert_eq!(f.line, 23);
        assert_eq!(f.line_count, 9);
        assert_eq!(f.description.as_deref(), Some("Fetches a user."));
        assert!(f.exported);
        assert!(f.error_handling.try_catch_blocks >= 1);
        assert!(f.error_handling.error_types.contains(&"err".to_string()));
        assert!(!f.error_handling.logging.is_empty());
        assert!(f.dependencies.contains(&"get".to_string()));
        assert!(!f.dependencies.contains(&"fetchUser".to_string()));

        let double = &fs.functions[1];
        assert_eq!(double.kind, FunctionKind::Arrow);
        assert_eq!(double.line_count, 1);

        // nested declarations stay inside their function
        assert_eq!(fs.functions[2].line_count, 4);
    }

    #[test]
    fn brace_class_members() {
        let fs = build_structure("src/index.ts", TS_FIXTURE, SourceFamily::Brace);
        assert_eq!(fs.classes.len(), 1);
        let foo = &fs.classes[0];
        assert_eq!(foo.name, "Foo");
        assert_eq!(foo.line, 34);
        assert_eq!(foo.line_count, 15);
        assert_eq!(foo.extends.as_deref(), Some("Bar"));
        assert_eq!(foo.implements, vec!["Baz"]);
        assert_eq!(foo.decorators, vec!["Injectable()"]);
        assert!(foo.exported);
        assert_eq!(foo.design_pattern, DesignPattern::Singleton);

        assert_eq!(names(&foo.properties, |p| p.name.as_str()), vec!["count", "instance"]);
        assert_eq!(foo.properties[0].visibility, Some(Visibility::Private));
        assert!(foo.properties[1].is_static);

        assert_eq!(names(&foo.methods, |m| m.name.as_str()), vec!["constructor", "method"]);
        assert_eq!(foo.methods[0].params.len(), 1);
        assert_eq!(foo.methods[1].kind, FunctionKind::Method);
        assert_eq!(foo.methods[1].description.as_deref(), Some("Resets the counter."));
        assert_eq!(foo.methods[1].complexity, 2);
    }

    #[test]
    fn class_with_one_multiline_method() {
        let src = indoc! {"
            class Foo extends Bar {
              method(): void {
                return;
              }
            }
        "};
        let fs = build_structure("a.ts", src, SourceFamily::Brace);
        assert_eq!(fs.classes.len(), 1);
        let foo = &fs.classes[0];
        assert_eq!(foo.extends.as_deref(), Some("Bar"));
        assert_eq!(foo.methods.len(), 1);
        assert_eq!(foo.methods[0].name, "method");
        assert_eq!(foo.methods[0].kind, FunctionKind::Method);
        assert!(fs.functions.is_empty());
    }

    #[test]
    fn one_line_class_and_overloads() {
        let src = indoc! {"
            export class Empty {}
            export function pick(a: string): string;
            export function pick(a: number): number;
            export function pick(a: any): any {
              return a;
            }
            const after = 1;
        "};
        let fs = build_structure("a.ts", src, SourceFamily::Brace);
        assert_eq!(fs.classes.len(), 1);
        assert_eq!(fs.classes[0].line_count, 1);
        assert_eq!(fs.functions.len(), 3);
        assert_eq!(fs.functions[2].line_count, 3);
        assert_eq!(names(&fs.constants, |k| k.name.as_str()), vec!["after"]);
    }

    #[test]
    fn unterminated_class_is_closed_at_end_of_file() {
        let src = "export class Broken {\n  run() {\n    go();\n";
        let fs = build_structure("a.ts", src, SourceFamily::Brace);
        assert_eq!(fs.classes.len(), 1);
        assert_eq!(fs.classes[0].methods.len(), 1);
    }

    const PY_FIXTURE: &str = indoc! {r#"
        """Billing service."""
        import os
        from typing import (
            List,
            Optional,
        )

        __all__ = ["InvoiceService", "charge"]

        MAX_RETRIES = 3


        @dataclass
        class Invoice:
            """An invoice."""
            total: float = 0.0


        class InvoiceService(BaseService):
            """Handles invoices.

            More text.
            """

            rate = 0.2

            def __init__(self, repo, *, timeout: int = 5):
                self.repo = repo
                self._cache = {}

            @staticmethod
            def fmt(value: float) -> str:
                return f"{value:.2f}"

            async def charge_all(self, items: List[Invoice]) -> None:
                for item in items:
                    if item.total > 0 and self.repo:
                        await self.repo.save(item)


        def charge(invoice, amount=None):
            """Charge an invoice."""
            try:
                return invoice.pay(amount)
            except ValueError as e:
                logging.error("payment error")
                return None


        def _helper():
            pass
    "#};

    #[test]
    fn indent_module_level() {
        let fs = build_structure("billing/service.py", PY_FIXTURE, SourceFamily::Indent);

        assert_eq!(fs.imports.len(), 2);
        assert_eq!(fs.imports[1].module, "typing");
        assert_eq!(fs.imports[1].names, vec!["List", "Optional"]);
        assert_eq!(names(&fs.exports, |e| e.name.as_str()), vec!["InvoiceService", "charge"]);

        assert_eq!(fs.constants.len(), 1);
        assert_eq!(fs.constants[0].name, "MAX_RETRIES");
        assert_eq!(fs.constants[0].value.as_deref(), Some("3"));
        assert_eq!(fs.constants[0].line, 10);

        assert_eq!(names(&fs.functions, |f| f.name.as_str()), vec!["charge", "_helper"]);
        let charge = &fs.functions[0];
        assert_eq!(charge.description.as_deref(), Some("Charge an invoice."));
        assert_eq!(charge.params[1].default_value.as_deref(), Some("None"));
        assert_eq!(charge.error_handling.error_types, vec!["ValueError"]);
        assert!(!charge.error_handling.logging.is_empty());
        assert!(!fs.functions[1].exported);
    }

    #[test]
    fn indent_classes_and_members() {
        let fs = build_structure("billing/service.py", PY_FIXTURE, SourceFamily::Indent);
        assert_eq!(names(&fs.classes, |c| c.name.as_str()), vec!["Invoice", "InvoiceService"]);

        let invoice = &fs.classes[0];
        assert_eq!(invoice.decorators, vec!["dataclass"]);
        assert_eq!(invoice.description.as_deref(), Some("An invoice."));
        assert_eq!(names(&invoice.properties, |p| p.name.as_str()), vec!["total"]);

        let svc = &fs.classes[1];
        assert_eq!(svc.extends.as_deref(), Some("BaseService"));
        assert_eq!(svc.description.as_deref(), Some("Handles invoices."));
        assert_eq!(names(&svc.methods, |m| m.name.as_str()), vec!["__init__", "fmt", "charge_all"]);
        assert!(svc.methods.iter().all(|m| m.kind == FunctionKind::Method && !m.exported));
        assert!(svc.methods[1].is_static);
        assert_eq!(svc.methods[0].params.len(), 2);
        assert_eq!(svc.methods[2].complexity, 4);
        assert_eq!(names(&svc.properties, |p| p.name.as_str()), vec!["rate", "repo", "_cache"]);
        assert_eq!(svc.properties[2].visibility, Some(Visibility::Protected));
    }

    #[test]
    fn abstract_method_marks_class_abstract() {
        let src = indoc! {"
            class Shape:
                @abstractmethod
                def area(self):
                    ...

            def main():
                pass
        "};
        let fs = build_structure("shape.py", src, SourceFamily::Indent);
        assert!(fs.classes[0].is_abstract);
        assert_eq!(fs.classes[0].methods.len(), 1);
        assert_eq!(names(&fs.functions, |f| f.name.as_str()), vec!["main"]);
    }

    #[test]
    fn lowercase_module_assignment_does_not_close_a_class() {
        // accepted approximation: only def/class/@/UPPER_CASE lines close
        let src = indoc! {"
            class A:
                def run(self):
                    pass
            logger = get_logger()
        "};
        let fs = build_structure("a.py", src, SourceFamily::Indent);
        assert_eq!(names(&fs.classes[0].properties, |p| p.name.as_str()), vec!["logger"]);
    }

    #[test]
    fn recursion_and_builtins_are_dependencies() {
        let py = indoc! {"
            def fact(n):
                print(n)
                return fact(n - 1)
        "};
        let fs = build_structure("m.py", py, SourceFamily::Indent);
        assert_eq!(fs.functions[0].dependencies, vec!["print", "fact"]);

        let ts = "export function walk(n) {\n  const t = typeof(n);\n  return walk(n - 1);\n}\n";
        let fs = build_structure("w.ts", ts, SourceFamily::Brace);
        assert_eq!(fs.functions[0].dependencies, vec!["typeof", "walk"]);
    }

    #[test]
    fn file_level_metadata() {
        let fs = build_structure("src/index.ts", TS_FIXTURE, SourceFamily::Brace);
        assert_eq!(fs.size, TS_FIXTURE.len());
        let sum: u32 = fs.functions.iter().map(|f| f.complexity).sum::<u32>()
            + fs.classes.iter().flat_map(|c| &c.methods).map(|m| m.complexity).sum::<u32>();
        assert_eq!(fs.complexity, sum);
    }
}
