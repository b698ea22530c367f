// src/vocab.rs
//! Fixed keyword vocabularies used by the heuristic analyzers.
//! Order matters wherever a table is scanned for the first hit.

use crate::structure::{DesignPattern, Purpose};

/// Business-logic verbs, reported in this order.
pub const BUSINESS_KEYWORDS: &[&str] = &[
    "validate", "check", "verify", "process", "calculate", "compute", "transform",
    "convert", "format", "parse", "serialize", "deserialize", "save", "load",
    "create", "update", "delete", "find", "search", "filter", "sort", "group",
    "aggregate", "sum", "count", "average", "authenticate", "authorize",
    "encrypt", "decrypt", "hash", "sign", "send", "receive", "notify", "log",
    "audit", "backup", "restore",
];

pub const GENERAL_LOGIC: &str = "general logic";

/// Keywords written like calls (`if (x)`, `return (y)`); never dependencies.
pub const CALL_EXCLUDES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "elif", "except", "with",
];

/// Words that can never name a method or property.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "elif",
    "except", "with", "typeof", "await", "new", "super", "print",
];

/// File-name rules, checked before content rules.
pub const PURPOSE_BY_NAME: &[(&[&str], Purpose)] = &[
    (&["test", "spec"], Purpose::Testing),
    (&["config"], Purpose::Configuration),
    (&["types", "interfaces"], Purpose::TypesAndInterfaces),
    (&["utils", "helpers"], Purpose::Utilities),
    (&["api", "routes"], Purpose::Api),
    (&["components"], Purpose::Components),
    (&["services"], Purpose::Services),
    (&["models"], Purpose::Models),
    (&["controllers"], Purpose::Controllers),
    (&["middleware"], Purpose::Middleware),
];

/// Design-pattern rules over lowercased class text; first match wins.
pub const DESIGN_PATTERNS: &[(&[&str], DesignPattern)] = &[
    (&["singleton"], DesignPattern::Singleton),
    (&["factory", "create"], DesignPattern::Factory),
    (&["observer", "subscribe", "emit"], DesignPattern::Observer),
    (&["strategy", "algorithm"], DesignPattern::Strategy),
    (&["decorator", "@"], DesignPattern::Decorator),
    (&["adapter", "adapt"], DesignPattern::Adapter),
    (&["repository", "data access"], DesignPattern::Repository),
    (&["service", "business logic"], DesignPattern::Service),
];

pub const BUSINESS_DOMAINS: &[(&[&str], &str)] = &[
    (&["user", "auth", "login"], "Authentication & Authorization"),
    (&["payment", "billing", "invoice"], "Billing & Payments"),
    (&["order", "cart", "purchase"], "Orders & Shopping"),
    (&["product", "catalog", "inventory"], "Product Management"),
    (&["notification", "email", "sms"], "Notifications"),
    (&["report", "analytics", "dashboard"], "Reporting & Analytics"),
    (&["file", "upload", "download"], "File Management"),
];

pub const GENERAL_DOMAIN: &str = "General Business Logic";

/// Matched against whole path segments.
pub const ARCHITECTURAL_LAYERS: &[(&[&str], &str)] = &[
    (&["controllers", "routes"], "Presentation Layer"),
    (&["services", "business"], "Business Logic Layer"),
    (&["models", "entities"], "Data Layer"),
    (&["middleware", "interceptors"], "Middleware Layer"),
    (&["utils", "helpers"], "Utility Layer"),
    (&["config", "settings"], "Configuration Layer"),
];

pub const GENERAL_LAYER: &str = "General Layer";

/* ------------------------------ data flow ------------------------------ */

pub const FLOW_INPUTS: &[&str] = &["read", "input", "get"];
pub const FLOW_OUTPUTS: &[&str] = &["write", "output", "return"];
pub const FLOW_TRANSFORMS: &[&str] = &["map", "filter", "reduce"];
pub const FLOW_SIDE_EFFECTS: &[&str] = &["console.log", "fs.write", "db.insert", "print("];
pub const FLOW_STRUCTURES: &[&str] = &["array", "object", "map", "set"];

/* ---------------------------- error handling ---------------------------- */

pub const FALLBACK_MARKERS: &[&str] = &["fallback", "default", "else"];

/// (needle, marker) pairs; the marker is what gets recorded.
pub const LOGGING_MARKERS: &[(&str, &str)] = &[
    ("console.", "console"),
    ("logger", "logger"),
    ("logging.", "logging"),
    ("log(", "log"),
];

/* ------------------------------ performance ------------------------------ */

pub const OPTIMIZATION_MARKERS: &[(&str, &str)] = &[
    ("cache", "caching"),
    ("memoize", "memoization"),
    ("optimize", "optimization"),
];

/* ------------------------------ import origin ------------------------------ */

pub const NODE_BUILTINS: &[&str] = &[
    "assert", "buffer", "child_process", "cluster", "crypto", "dgram", "dns",
    "events", "fs", "http", "http2", "https", "net", "os", "path", "process",
    "querystring", "readline", "stream", "string_decoder", "timers", "tls",
    "tty", "url", "util", "v8", "vm", "worker_threads", "zlib",
];

pub const PYTHON_STDLIB: &[&str] = &[
    "abc", "argparse", "asyncio", "base64", "collections", "contextlib", "copy",
    "csv", "dataclasses", "datetime", "enum", "functools", "glob", "hashlib",
    "http", "importlib", "inspect", "io", "itertools", "json", "logging", "math",
    "os", "pathlib", "pickle", "random", "re", "shutil", "socket", "sqlite3",
    "string", "subprocess", "sys", "tempfile", "threading", "time", "typing",
    "unittest", "urllib", "uuid",
];

/* ------------------------------ configuration ------------------------------ */

pub const CONFIG_MARKERS: &[&str] = &["config", "settings", "dotenv", ".env"];
pub const SECRET_MARKERS: &[&str] = &["secret", "password", "token", "api_key", "apikey", "private_key"];
pub const VALIDATION_MARKERS: &[&str] = &["validate", "schema", "required", "zod", "joi", "pydantic"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_keywords_have_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for k in BUSINESS_KEYWORDS {
            assert!(seen.insert(*k), "duplicate keyword {k}");
        }
    }

    #[test]
    fn pattern_table_keeps_singleton_first() {
        assert_eq!(DESIGN_PATTERNS[0].1, DesignPattern::Singleton);
        assert_eq!(DESIGN_PATTERNS.last().map(|p| p.1), Some(DesignPattern::Service));
    }
}
