// src/util.rs

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use std::path::{Path, PathBuf};

/// RFC3339 stamp embedded in report footers.
pub fn now_timestamp() -> String {
    // e.g., 2025-08-10T14:03:59-05:00
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `2025-08-10`
pub fn date_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d").to_string()
}

/// `1403` (hours and minutes, no separator).
pub fn time_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%H%M").to_string()
}

/// Directory name of `p`, canonicalized when possible, safe for filenames.
/// Falls back to "project" instead of erroring.
pub fn project_name_from_path(p: &Path) -> String {
    // canonicalize when possible, but don't fail the whole call if it errors
    let canon: PathBuf = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
    canon
        .file_name()
        .or_else(|| canon.parent().and_then(|pp| pp.file_name()))
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "project".into())
}

pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' => out.push(ch),
            ' ' => out.push('_'),
            _ => out.push('-'),
        }
    }
    out.trim_matches(['-', '_']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn stamps_are_zero_padded() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(date_stamp(&at), "2024-03-07");
        assert_eq!(time_stamp(&at), "0905");
    }

    #[test]
    fn slugify_replaces_unsafe_chars() {
        assert_eq!(slugify("My App (v2)"), "My_App_-v2");
        assert_eq!(slugify("--x--"), "x");
    }

    #[test]
    fn project_name_uses_last_component() {
        let dir = tempfile::TempDir::new().unwrap();
        let sub = dir.path().join("web app");
        std::fs::create_dir(&sub).unwrap();
        assert_eq!(project_name_from_path(&sub), "web_app");
    }
}
