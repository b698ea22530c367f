// src/helpers.rs
//! Small line-level utilities shared by the matchers, analyzers and builder.
//! - Brace counting that ignores string literals and `//` comments
//! - Top-level comma splitting and balanced-group extraction
//! - Signature joining across lines (bounded lookahead)
//! - Indentation and dedup helpers

/// Upper bound on lines joined when a signature spans several lines.
pub const MAX_LOOKAHEAD: usize = 50;

/* =============================== Brace counting =============================== */

/// Counts `{` and `}` outside string literals and line comments.
pub fn brace_counts(line: &str) -> (usize, usize) {
    let mut opens = 0usize;
    let mut closes = 0usize;
    let bytes = line.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = skip_string_like(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            b'{' => opens += 1,
            b'}' => closes += 1,
            _ => {}
        }
        i += 1;
    }
    (opens, closes)
}

/// Net brace change for one line.
pub fn brace_delta(line: &str) -> i32 {
    let (o, c) = brace_counts(line);
    o as i32 - c as i32
}

/// Last line index of the brace-delimited block that starts at `start`.
///
/// The block ends where the balance returns to zero after the first `{`.
/// A declaration that never opens a brace ends at its first line, or at the
/// first line ending in `;` while scanning for the opening brace.
pub fn brace_extent(lines: &[&str], start: usize) -> usize {
    let mut balance: i64 = 0;
    let mut opened = false;
    for (j, line) in lines.iter().enumerate().skip(start) {
        let (o, c) = brace_counts(line);
        if o > 0 {
            opened = true;
        }
        balance += o as i64;
        balance -= c as i64;
        if opened && balance <= 0 {
            return j;
        }
        if !opened && (line.trim_end().ends_with(';') || j >= start + MAX_LOOKAHEAD) {
            return j;
        }
    }
    if opened { lines.len().saturating_sub(1).max(start) } else { start }
}

/// Returns the index just past a quoted literal starting at `i`.
fn skip_string_like(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

/* ============================== Grouping / split ============================== */

/// Splits on `sep` at nesting depth 0 (`()`, `[]`, `{}`, `<>`), ignoring
/// separators inside quotes. Pieces are trimmed; empty pieces are dropped.
pub fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut cur = String::new();
    let mut prev = '\0';
    for ch in s.chars() {
        if let Some(q) = quote {
            cur.push(ch);
            if ch == q && prev != '\\' {
                quote = None;
            }
            prev = ch;
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            // `=>` is not a closing angle
            '>' if prev != '=' => depth -= 1,
            c if c == sep && depth <= 0 => {
                let piece = cur.trim();
                if !piece.is_empty() {
                    out.push(piece.to_string());
                }
                cur.clear();
                prev = ch;
                continue;
            }
            _ => {}
        }
        cur.push(ch);
        prev = ch;
    }
    let piece = cur.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
    out
}

/// Byte position of the first `sep` at depth 0, skipping `=>` and `==` when
/// splitting on `=`.
pub fn find_top_level(s: &str, sep: char) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' | b'`' => {
                i = skip_string_like(bytes, i);
                continue;
            }
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if i == 0 || bytes[i - 1] != b'=' => depth -= 1,
            _ => {}
        }
        if depth <= 0 && b == sep as u8 {
            let next = bytes.get(i + 1).copied();
            let prev = if i > 0 { Some(bytes[i - 1]) } else { None };
            let is_compound = sep == '='
                && (matches!(next, Some(b'>' | b'='))
                    || matches!(prev, Some(b'=' | b'!' | b'<' | b'>')));
            if !is_compound {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

/// Given `s[open]` == `(`, returns (inner text, text after the matching `)`).
pub fn take_balanced(s: &str, open: usize) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0i32;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = skip_string_like(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[open + 1..i], &s[i + 1..]));
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Net `(` minus `)` outside quotes.
pub fn paren_balance(s: &str) -> i32 {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = skip_string_like(bytes, i);
                continue;
            }
            b'(' => depth += 1,
            b')' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    depth
}

/// Joins `lines[start..]` (trimmed, space-separated) until parentheses balance.
/// Returns the joined text and the index of the last line used.
pub fn join_signature(lines: &[&str], start: usize) -> (String, usize) {
    let mut text = lines[start].trim().to_string();
    let mut end = start;
    while paren_balance(&text) > 0 && end + 1 < lines.len() && end - start < MAX_LOOKAHEAD {
        end += 1;
        let next = lines[end].trim();
        if !text.ends_with('(') && !next.starts_with(')') {
            text.push(' ');
        }
        text.push_str(next);
    }
    (text, end)
}

/* ================================ Indentation ================================ */

/// Leading whitespace width; a tab counts as one column.
pub fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Last line of an indentation block opened by `lines[start]`.
/// Body runs while lines are blank or indented deeper than `base`;
/// trailing blank lines are not part of the block.
pub fn indent_extent(lines: &[&str], start: usize, base: usize) -> usize {
    let mut last = start;
    for (j, line) in lines.iter().enumerate().skip(start + 1) {
        if is_blank(line) {
            continue;
        }
        if indentation(line) <= base {
            break;
        }
        last = j;
    }
    last
}

/// Clamp `[start, end]` to `lines` and return the slice.
pub fn window<'a>(lines: &'a [&'a str], start: usize, end: usize) -> &'a [&'a str] {
    if lines.is_empty() || start >= lines.len() {
        return &[];
    }
    let end = end.min(lines.len() - 1).max(start);
    &lines[start..=end]
}

/* ================================= Dedup etc ================================= */

pub fn dedup_preserve_order(mut v: Vec<String>) -> Vec<String> {
    use std::collections::HashSet;
    let mut seen = HashSet::with_capacity(v.len());
    v.retain(|s| seen.insert(s.clone()));
    v
}

/// Push unless already present.
pub fn push_unique(v: &mut Vec<String>, item: impl Into<String>) {
    let item = item.into();
    if !v.iter().any(|x| x == &item) {
        v.push(item);
    }
}

/// Collapses runs of whitespace into single spaces.
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/* ==================================== Tests ==================================== */
