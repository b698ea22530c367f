// src/scan.rs
//! Corpus scanner: include/exclude globs, directory walk, per-file dispatch.
//!
//! Per-file problems never abort a scan. They are logged and collected as
//! `ScanWarning`s next to the structures that did parse.

use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::{
    borrow::Cow,
    collections::HashSet,
    fmt, fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    builder::build_structure,
    error::{MapError, Result},
    structure::{FileStructure, SourceFamily},
};

pub const DEFAULT_INCLUDE: &[&str] = &["**/*.ts", "**/*.tsx", "**/*.py", "**/*.js", "**/*.jsx"];

pub const DEFAULT_EXCLUDE: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/.git/**",
    "**/__pycache__/**",
    "**/*.pyc",
    "**/build/**",
    "**/coverage/**",
];

/// Files above this size are reported and skipped (bundles, generated code).
const MAX_FILE_BYTES: u64 = 2_000_000;

const MATCH_OPTS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Tried in order; earlier patterns place their files first.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include: DEFAULT_INCLUDE.iter().map(ToString::to_string).collect(),
            exclude: DEFAULT_EXCLUDE.iter().map(ToString::to_string).collect(),
            respect_gitignore: false,
        }
    }
}

/// A file that matched the include globs but was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub path: String,
    pub reason: String,
}

impl ScanWarning {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self { path: path.to_string(), reason: reason.into() }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub files: Vec<FileStructure>,
    pub warnings: Vec<ScanWarning>,
}

/// Scans `root` and builds one structure per matched source file.
///
/// Order: include pattern order, then walk order (sorted by file name).
/// Each file appears at most once. An empty result is not an error.
pub fn scan_project(root: &Path, cfg: &ScanConfig) -> Result<ScanReport> {
    if !root.is_dir() {
        return Err(MapError::io(
            root,
            io::Error::new(io::ErrorKind::NotFound, "project root is not a directory"),
        ));
    }

    let includes = compile(&cfg.include);
    let excludes = compile(&cfg.exclude);
    let candidates = walk(root, &cfg.exclude, cfg.respect_gitignore);
    debug!(root = %root.display(), candidates = candidates.len(), "walk finished");

    let mut report = ScanReport::default();
    let mut seen: HashSet<&str> = HashSet::new();
    for pattern in &includes {
        for (rel, abs) in &candidates {
            if seen.contains(rel.as_str()) || !pattern.matches_with(rel, MATCH_OPTS) {
                continue;
            }
            if excludes.iter().any(|x| x.matches_with(rel, MATCH_OPTS)) {
                continue;
            }
            seen.insert(rel);
            match read_source(rel, abs) {
                Ok(structure) => report.files.push(structure),
                Err(w) => {
                    warn!(path = %w.path, reason = %w.reason, "skipping file");
                    report.warnings.push(w);
                }
            }
        }
    }

    info!(files = report.files.len(), warnings = report.warnings.len(), "scan complete");
    Ok(report)
}

fn read_source(rel: &str, abs: &Path) -> std::result::Result<FileStructure, ScanWarning> {
    let ext = abs.extension().and_then(|e| e.to_str()).unwrap_or("");
    let family = SourceFamily::from_extension(ext)
        .ok_or_else(|| ScanWarning::new(rel, "unsupported file type"))?;

    let size = fs::metadata(abs)
        .map_err(|e| ScanWarning::new(rel, format!("metadata: {e}")))?
        .len();
    if size > MAX_FILE_BYTES {
        return Err(ScanWarning::new(rel, format!("too large ({size} bytes)")));
    }

    let bytes = fs::read(abs).map_err(|e| ScanWarning::new(rel, format!("read failed: {e}")))?;
    // legacy encodings still map; bad bytes become U+FFFD
    let content = String::from_utf8_lossy(&bytes);
    if matches!(content, Cow::Owned(_)) {
        debug!(file = rel, "not valid UTF-8, decoded lossily");
    }
    Ok(build_structure(rel, &content, family))
}

/// Compiles glob patterns, dropping (and logging) invalid ones.
fn compile(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pat) => Some(pat),
            Err(e) => {
                warn!(pattern = %p, error = %e, "invalid glob pattern ignored");
                None
            }
        })
        .collect()
}

/// Directory patterns derived from `…/**` excludes; matching directories are
/// not descended into.
fn prune_patterns(exclude: &[String]) -> Vec<Pattern> {
    exclude
        .iter()
        .filter_map(|p| p.strip_suffix("/**"))
        .filter_map(|p| Pattern::new(p).ok())
        .collect()
}

/// Every file under `root` as (relative `/` path, absolute path), in walk order.
fn walk(root: &Path, exclude: &[String], respect_gitignore: bool) -> Vec<(String, PathBuf)> {
    let prune = prune_patterns(exclude);
    let base = root.to_path_buf();

    let walker = WalkBuilder::new(root)
        .standard_filters(respect_gitignore)
        .hidden(true)
        .require_git(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |dent| {
            let is_dir = dent.file_type().is_some_and(|t| t.is_dir());
            if !is_dir || dent.depth() == 0 {
                return true;
            }
            let rel = normalize_rel(&base, dent.path());
            !prune.iter().any(|p| p.matches_with(&rel, MATCH_OPTS))
        })
        .build();

    let mut out = Vec::new();
    for entry in walker {
        let dent = match entry {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "walk error");
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        out.push((normalize_rel(root, dent.path()), dent.path().to_path_buf()));
    }
    out
}

fn normalize_rel(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, body: &str) {
        let p = dir.path().join(rel);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, body).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.py", "def run():\n    pass\n");
        write(&dir, "a.ts", "export const A = 1;\n");
        write(&dir, "src/c.tsx", "export function C() {\n  return null;\n}\n");
        write(&dir, "node_modules/x/index.js", "module.exports = 1;\n");
        write(&dir, "dist/out.js", "var a = 1;\n");
        write(&dir, "notes.md", "# notes\n");
        dir
    }

    fn paths(report: &ScanReport) -> Vec<&str> {
        report.files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn default_config_orders_by_include_pattern() {
        let dir = fixture();
        let report = scan_project(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(paths(&report), vec!["a.ts", "src/c.tsx", "b.py"]);
        assert!(report.warnings.is_empty());
        assert_eq!(report.files[1].functions[0].name, "C");
    }

    #[test]
    fn unsupported_match_becomes_a_warning() {
        let dir = fixture();
        let cfg = ScanConfig { include: vec!["**/*.md".into(), "**/*.py".into()], ..ScanConfig::default() };
        let report = scan_project(dir.path(), &cfg).unwrap();
        assert_eq!(paths(&report), vec!["b.py"]);
        assert_eq!(report.warnings, vec![ScanWarning::new("notes.md", "unsupported file type")]);
    }

    #[test]
    fn invalid_globs_are_dropped_and_files_listed_once() {
        let dir = fixture();
        let cfg = ScanConfig {
            include: vec!["[".into(), "**/*.ts".into(), "a.ts".into()],
            ..ScanConfig::default()
        };
        let report = scan_project(dir.path(), &cfg).unwrap();
        assert_eq!(paths(&report), vec!["a.ts"]);
    }

    #[test]
    fn excluded_directories_are_pruned() {
        let dir = fixture();
        let cfg = ScanConfig { include: vec!["**/*.js".into()], ..ScanConfig::default() };
        let report = scan_project(dir.path(), &cfg).unwrap();
        assert!(report.files.is_empty());

        let cfg = ScanConfig { include: vec!["**/*.js".into()], exclude: vec![], respect_gitignore: false };
        let report = scan_project(dir.path(), &cfg).unwrap();
        assert_eq!(paths(&report), vec!["dist/out.js", "node_modules/x/index.js"]);
    }

    #[test]
    fn gitignore_is_opt_in() {
        let dir = fixture();
        write(&dir, ".gitignore", "a.ts\n");

        let report = scan_project(dir.path(), &ScanConfig::default()).unwrap();
        assert!(paths(&report).contains(&"a.ts"));

        let cfg = ScanConfig { respect_gitignore: true, ..ScanConfig::default() };
        let report = scan_project(dir.path(), &cfg).unwrap();
        assert!(!paths(&report).contains(&"a.ts"));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.ts"), b"export function ok() {}\n// caf\xe9\n").unwrap();
        let report = scan_project(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(paths(&report), vec!["x.ts"]);
        assert!(report.warnings.is_empty());
        assert_eq!(report.files[0].functions[0].name, "ok");
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let report = scan_project(dir.path(), &ScanConfig::default()).unwrap();
        assert!(report.files.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = scan_project(&dir.path().join("nope"), &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }
}
