// src/intent.rs
//! File-level classification: purpose, business domain, architectural layer,
//! configuration surface. Offline keyword cascades, first hit wins.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    helpers::push_unique,
    structure::{ConfigInfo, Purpose},
    vocab::{
        ARCHITECTURAL_LAYERS, BUSINESS_DOMAINS, CONFIG_MARKERS, GENERAL_DOMAIN, GENERAL_LAYER,
        PURPOSE_BY_NAME, SECRET_MARKERS, VALIDATION_MARKERS,
    },
};

static RE_PROCESS_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"process\.env\.([A-Z_][A-Z0-9_]*)").unwrap());
static RE_PY_ENV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"os\.(?:environ(?:\.get)?\s*[\[(]|getenv\s*\()\s*['"]([A-Za-z_][A-Za-z0-9_]*)['"]"#).unwrap()
});

/// File name rules first, then content rules, else `General`.
pub fn file_purpose(path: &str, content: &str) -> Purpose {
    let name = path.rsplit('/').next().unwrap_or(path);
    if let Some((_, purpose)) = PURPOSE_BY_NAME.iter().find(|(needles, _)| any_in(name, needles)) {
        return *purpose;
    }

    let cl = content.to_lowercase();
    if contains(&cl, "export default") && contains(&cl, "function") { return Purpose::MainModule; }
    if contains(&cl, "interface") && contains(&cl, "export") { return Purpose::TypesAndInterfaces; }
    if contains(&cl, "class") && contains(&cl, "export") { return Purpose::Classes; }
    if contains(&cl, "describe(") || contains(&cl, "it(") { return Purpose::Testing; }
    if contains(&cl, "process.env") || contains(&cl, "config") { return Purpose::Configuration; }

    Purpose::General
}

pub fn business_domain(content: &str) -> String {
    let cl = content.to_lowercase();
    BUSINESS_DOMAINS
        .iter()
        .find(|(needles, _)| any_in(&cl, needles))
        .map_or(GENERAL_DOMAIN, |(_, d)| *d)
        .to_string()
}

/// Whole path segments only: `src/services/x.ts` is business logic,
/// `src/myservices.ts` is not.
pub fn architectural_layer(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    ARCHITECTURAL_LAYERS
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| parts.contains(n)))
        .map_or(GENERAL_LAYER, |(_, l)| *l)
        .to_string()
}

pub fn configuration(content: &str) -> ConfigInfo {
    let mut info = ConfigInfo::default();
    for caps in RE_PROCESS_ENV.captures_iter(content).chain(RE_PY_ENV.captures_iter(content)) {
        push_unique(&mut info.environment_variables, &caps[1]);
    }
    let cl = content.to_lowercase();
    info.mentions_config = any_in(&cl, CONFIG_MARKERS);
    info.mentions_secrets = any_in(&cl, SECRET_MARKERS);
    info.has_validation = any_in(&cl, VALIDATION_MARKERS);
    info
}

/* ----------------------------- helpers ----------------------------- */

#[inline]
fn contains(hay: &str, needle: &str) -> bool { hay.contains(needle) }

fn any_in(hay: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| hay.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_prefers_file_name() {
        assert_eq!(file_purpose("src/user.test.ts", "export default function x() {}"), Purpose::Testing);
        assert_eq!(file_purpose("src/api.ts", ""), Purpose::Api);
        assert_eq!(file_purpose("lib/string_helpers.py", ""), Purpose::Utilities);
    }

    #[test]
    fn purpose_from_content() {
        assert_eq!(file_purpose("src/index.ts", "export default function main() {}"), Purpose::MainModule);
        assert_eq!(file_purpose("src/shape.ts", "export interface Shape {}"), Purpose::TypesAndInterfaces);
        assert_eq!(file_purpose("src/a.ts", "export class A {}"), Purpose::Classes);
        assert_eq!(file_purpose("src/a.ts", "const port = process.env.PORT"), Purpose::Configuration);
        assert_eq!(file_purpose("src/a.py", "x = 1"), Purpose::General);
    }

    #[test]
    fn domain_and_layer() {
        assert_eq!(business_domain("def charge(invoice): ..."), "Billing & Payments");
        assert_eq!(business_domain("x = 1"), GENERAL_DOMAIN);
        assert_eq!(architectural_layer("src/services/users.ts"), "Business Logic Layer");
        assert_eq!(architectural_layer("src/myservices.ts"), GENERAL_LAYER);
    }

    #[test]
    fn environment_variables_both_families() {
        let info = configuration("const a = process.env.API_URL;\nkey = os.environ.get('DB_HOST')\nos.getenv(\"API_URL\")");
        assert_eq!(info.environment_variables, vec!["API_URL", "DB_HOST"]);
        assert!(!info.mentions_secrets);
    }
}
