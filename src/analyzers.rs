// src/analyzers.rs
//! Heuristic analyzers over a line range. Keyword driven, approximate, and
//! infallible: an empty range simply yields empty results.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    helpers::{indentation, is_blank, push_unique, window},
    structure::{DataFlowInfo, DesignPattern, ErrorHandlingInfo, PerformanceInfo, SourceFamily},
    vocab::{
        BUSINESS_KEYWORDS, CALL_EXCLUDES, DESIGN_PATTERNS, FALLBACK_MARKERS, FLOW_INPUTS,
        FLOW_OUTPUTS, FLOW_SIDE_EFFECTS, FLOW_STRUCTURES, FLOW_TRANSFORMS, GENERAL_LOGIC,
        LOGGING_MARKERS, OPTIMIZATION_MARKERS,
    },
};

static RE_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:if|elif|for|while|switch|catch|except)\b").unwrap());
static RE_LOGICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"&&|\|\||\band\b|\bor\b").unwrap());
// `?` neither doubled nor followed by `.` or `:` (`??`, `?.`, `x?: T`)
static RE_TERNARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|[^?])\?[^?.:][^:]*:").unwrap());
static RE_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_$][\w$]*)\s*\(").unwrap());
static RE_TRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:try|catch|except)\b").unwrap());
static RE_CATCH_BINDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"catch\s*\(\s*([^)]+?)\s*\)").unwrap());
static RE_EXCEPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"except\s+(\([^)]*\)|[\w.]+)(?:\s+as\s+\w+)?\s*:").unwrap()
});
static RE_ERROR_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)['"`]([^'"`]*(?:error|exception)[^'"`]*)['"`]"#).unwrap()
});
static RE_LOOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:for|while)\b").unwrap());

/// Everything computed for one function or method body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeAnalysis {
    pub complexity: u32,
    pub dependencies: Vec<String>,
    pub business_logic: String,
    pub error_handling: ErrorHandlingInfo,
    pub data_flow: DataFlowInfo,
    pub performance: PerformanceInfo,
}

/// Runs every range analyzer over 1-based inclusive lines `start..=end` of `content`.
pub fn analyze_range(content: &str, start: usize, end: usize, family: SourceFamily) -> RangeAnalysis {
    let lines: Vec<&str> = content.lines().collect();
    analyze_window(window(&lines, start.saturating_sub(1), end.saturating_sub(1)), family)
}

pub fn analyze_window(lines: &[&str], family: SourceFamily) -> RangeAnalysis {
    analyze_body(lines, None, family)
}

/// Like [`analyze_window`] for a body whose first line declares `declared`.
/// The declaring `name(` is not a call; recursive calls still are.
pub fn analyze_body(lines: &[&str], declared: Option<&str>, family: SourceFamily) -> RangeAnalysis {
    RangeAnalysis {
        complexity: complexity(lines, family),
        dependencies: calls(lines, declared, family),
        business_logic: business_logic(lines),
        error_handling: error_handling(lines, family),
        data_flow: data_flow(lines),
        performance: performance(lines, family),
    }
}

fn is_comment(t: &str, family: SourceFamily) -> bool {
    match family {
        SourceFamily::Brace => t.starts_with("//") || t.starts_with("/*") || t.starts_with('*'),
        SourceFamily::Indent => t.starts_with('#'),
    }
}

/* =============================== Complexity =============================== */

/// 1 + branches, loops, switches, catches, logical operators and ternaries.
pub fn complexity(lines: &[&str], family: SourceFamily) -> u32 {
    let mut score = 1u32;
    for line in lines {
        let t = line.trim();
        if t.is_empty() || is_comment(t, family) {
            continue;
        }
        let hits = RE_BRANCH.find_iter(t).count()
            + RE_LOGICAL.find_iter(t).count()
            + RE_TERNARY.find_iter(t).count();
        score += u32::try_from(hits).unwrap_or(u32::MAX);
    }
    score
}

/* ============================== Dependencies ============================== */

/// Called identifiers, first-seen order, call-shaped keywords excluded.
pub fn dependencies(lines: &[&str], family: SourceFamily) -> Vec<String> {
    calls(lines, None, family)
}

fn calls(lines: &[&str], declared: Option<&str>, family: SourceFamily) -> Vec<String> {
    let mut deps = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let t = line.trim();
        if is_comment(t, family) {
            continue;
        }
        for (n, caps) in RE_CALL.captures_iter(t).enumerate() {
            let name = &caps[1];
            if CALL_EXCLUDES.contains(&name) {
                continue;
            }
            let at = caps.get(0).map_or(0, |m| m.start());
            if i == 0 && n == 0 && declared == Some(name) && is_declaration(&t[..at]) {
                continue;
            }
            push_unique(&mut deps, name);
        }
    }
    deps
}

/// Header text before the name: `def `, `export async function `, `public static `.
/// An `=` or `(` means the name is called, as in `const f = () => f(n)`.
fn is_declaration(prefix: &str) -> bool {
    !prefix.contains(['=', '('])
}

/* ============================= Business logic ============================= */

pub fn business_logic(lines: &[&str]) -> String {
    let mut found: Vec<String> = Vec::new();
    for line in lines {
        let l = line.to_lowercase();
        for kw in BUSINESS_KEYWORDS {
            if l.contains(kw) {
                push_unique(&mut found, *kw);
            }
        }
    }
    if found.is_empty() { GENERAL_LOGIC.to_string() } else { found.join(", ") }
}

/* ============================== Error handling ============================== */

pub fn error_handling(lines: &[&str], family: SourceFamily) -> ErrorHandlingInfo {
    let mut info = ErrorHandlingInfo::default();
    for line in lines {
        let t = line.trim();
        if t.is_empty() || is_comment(t, family) {
            continue;
        }
        let l = t.to_lowercase();
        if RE_TRY.is_match(&l) {
            info.try_catch_blocks += 1;
        }
        for caps in RE_CATCH_BINDING.captures_iter(t) {
            push_unique(&mut info.error_types, caps[1].trim());
        }
        for caps in RE_EXCEPT.captures_iter(t) {
            let raw = caps[1].trim_start_matches('(').trim_end_matches(')');
            for ty in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                push_unique(&mut info.error_types, ty);
            }
        }
        for caps in RE_ERROR_LITERAL.captures_iter(t) {
            push_unique(&mut info.error_messages, caps[1].trim());
        }
        for marker in FALLBACK_MARKERS {
            if l.contains(marker) {
                push_unique(&mut info.fallbacks, *marker);
            }
        }
        for (needle, marker) in LOGGING_MARKERS {
            if l.contains(needle) {
                push_unique(&mut info.logging, *marker);
            }
        }
    }
    info
}

/* ================================ Data flow ================================ */

pub fn data_flow(lines: &[&str]) -> DataFlowInfo {
    let mut info = DataFlowInfo::default();
    for line in lines {
        let l = line.to_lowercase();
        let tag = |vocab: &[&str], into: &mut Vec<String>| {
            for kw in vocab {
                if l.contains(kw) {
                    push_unique(into, *kw);
                }
            }
        };
        tag(FLOW_INPUTS, &mut info.inputs);
        tag(FLOW_OUTPUTS, &mut info.outputs);
        tag(FLOW_TRANSFORMS, &mut info.transformations);
        tag(FLOW_SIDE_EFFECTS, &mut info.side_effects);
        tag(FLOW_STRUCTURES, &mut info.data_structures);
    }
    info
}

/* =============================== Performance =============================== */

pub fn performance(lines: &[&str], family: SourceFamily) -> PerformanceInfo {
    let mut info = PerformanceInfo::default();
    let mut open_loops: Vec<usize> = Vec::new();
    let mut await_run = 0usize;
    let mut gathered = false;

    for line in lines {
        if is_blank(line) {
            continue;
        }
        let t = line.trim();
        if is_comment(t, family) {
            continue;
        }
        let l = t.to_lowercase();

        // loops close when indentation returns to their level
        let indent = indentation(line);
        open_loops.retain(|&i| i < indent);
        let loop_hits = RE_LOOP.find_iter(t).count();
        if loop_hits > 0 {
            if !open_loops.is_empty() || loop_hits > 1 {
                push_unique(&mut info.bottlenecks, "nested_loops");
            }
            open_loops.push(indent);
        }

        if l.contains("promise.all") || l.contains("asyncio.gather") {
            gathered = true;
        }
        if l.contains("await ") {
            await_run += 1;
            if await_run >= 2 && !gathered {
                push_unique(&mut info.bottlenecks, "sequential_awaits");
            }
        } else {
            await_run = 0;
        }

        for (needle, marker) in OPTIMIZATION_MARKERS {
            if l.contains(needle) {
                push_unique(&mut info.optimizations, *marker);
            }
        }
    }
    info
}

/* ============================== Design pattern ============================== */

/// First matching keyword rule over the lowercased class text.
pub fn design_pattern(lines: &[&str]) -> DesignPattern {
    let text = lines.join("\n").to_lowercase();
    if text.contains("instance") && text.contains("static") {
        return DesignPattern::Singleton;
    }
    DESIGN_PATTERNS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| text.contains(n)))
        .map_or(DesignPattern::StandardClass, |(_, p)| *p)
}

/* ================================== Tests ================================== */
