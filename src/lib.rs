// src/lib.rs
#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod util;
pub mod helpers;
pub mod vocab;
pub mod structure;

pub mod doc_comments;
pub mod construct;
pub mod brace_matchers;
pub mod indent_matchers;
pub mod analyzers;
pub mod intent;
pub mod builder;

pub mod config;
pub mod scan;
pub mod map_view;
pub mod report;
pub mod manifest;
pub mod export;

pub mod commands;

pub use builder::build_structure;
pub use error::{ExportError, MapError};
pub use scan::{scan_project, ScanConfig, ScanReport};
pub use structure::{FileStructure, SourceFamily};
