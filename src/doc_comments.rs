// src/doc_comments.rs
//! JSDoc blocks (`/** ... */`) and Python docstrings.

use crate::helpers::{indentation, is_blank};

/// A cleaned doc comment: first paragraph plus the full text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: Option<String>,
    pub full: Option<String>,
}

/* ================================ JSDoc ================================ */

/// Accumulates a `/** ... */` block line by line.
#[derive(Debug, Default)]
pub struct DocBuffer {
    lines: Vec<String>,
    open: bool,
}

impl DocBuffer {
    /// Starts a new block, dropping anything buffered before.
    pub fn start(&mut self, line: &str) {
        self.lines.clear();
        self.lines.push(line.to_string());
        self.open = !line.contains("*/");
    }

    pub fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
        if line.contains("*/") {
            self.open = false;
        }
    }

    /// True while inside an unterminated block.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.open = false;
    }

    /// Hands out the finished block (if any) and resets the buffer.
    pub fn take(&mut self) -> Option<DocComment> {
        if self.lines.is_empty() || self.open {
            self.clear();
            return None;
        }
        let raw = self.lines.join("\n");
        self.clear();
        let doc = parse_jsdoc(&raw);
        if doc.full.is_none() { None } else { Some(doc) }
    }
}

/// Strips comment markers. Description stops at the first `@tag` line.
pub fn parse_jsdoc(raw: &str) -> DocComment {
    let cleaned: Vec<String> = raw
        .lines()
        .map(|l| {
            let t = l.trim();
            let t = t.strip_prefix("/**").unwrap_or(t);
            let t = t.strip_suffix("*/").unwrap_or(t).trim();
            t.strip_prefix('*').unwrap_or(t).trim().to_string()
        })
        .collect();

    let description: Vec<&str> = cleaned
        .iter()
        .take_while(|l| !l.starts_with('@'))
        .map(String::as_str)
        .filter(|l| !l.is_empty())
        .collect();
    let full: Vec<&str> = cleaned.iter().map(String::as_str).filter(|l| !l.is_empty()).collect();

    DocComment {
        description: non_empty(description.join(" ")),
        full: non_empty(full.join("\n")),
    }
}

/* ============================== Docstrings ============================== */

/// Reads a docstring opening on the first non-blank line after `after`,
/// provided that line is indented deeper than `base` (i.e. inside the body).
/// Returns the comment and the index of its closing line.
pub fn read_docstring(lines: &[&str], after: usize, base: usize) -> Option<(DocComment, usize)> {
    let first = (after + 1..lines.len()).find(|&j| !is_blank(lines[j]))?;
    if indentation(lines[first]) <= base {
        return None;
    }
    docstring_at(lines, first)
}

/// Reads a triple-quoted string opening on `lines[first]`.
pub fn docstring_at(lines: &[&str], first: usize) -> Option<(DocComment, usize)> {
    let t = lines.get(first)?.trim();
    let t = t.trim_start_matches(['r', 'R', 'u', 'U']);
    let quote = if t.starts_with("\"\"\"") {
        "\"\"\""
    } else if t.starts_with("'''") {
        "'''"
    } else {
        return None;
    };

    let opening = &t[quote.len()..];
    let mut body: Vec<String> = Vec::new();
    let end;
    if let Some(pos) = opening.find(quote) {
        body.push(opening[..pos].trim().to_string());
        end = first;
    } else {
        body.push(opening.trim().to_string());
        let mut j = first + 1;
        loop {
            if j >= lines.len() {
                // unterminated: take what we have
                end = lines.len() - 1;
                break;
            }
            let l = lines[j].trim();
            if let Some(pos) = l.find(quote) {
                body.push(l[..pos].trim().to_string());
                end = j;
                break;
            }
            body.push(l.to_string());
            j += 1;
        }
    }

    while body.first().is_some_and(String::is_empty) {
        body.remove(0);
    }
    while body.last().is_some_and(String::is_empty) {
        body.pop();
    }
    let paragraph: Vec<&str> = body
        .iter()
        .map(String::as_str)
        .take_while(|l| !l.is_empty())
        .collect();

    let doc = DocComment {
        description: non_empty(paragraph.join(" ")),
        full: non_empty(body.join("\n")),
    };
    Some((doc, end))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
