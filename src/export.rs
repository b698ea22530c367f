// src/export.rs
//! Code export through `code2prompt`.
//!
//! Inside a NEIRA super-project (a directory holding both `neira-core` and
//! `neira-cli-mcp`, searched upward from the working directory) a named
//! profile picks which packages go into the dump. Anywhere else the current
//! project is exported whole. Dumps land in
//! `<root>/.neira/export_code/<date>/v<HHMM>/`.

use chrono::{DateTime, TimeZone};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info, warn};

use crate::{
    error::ExportError,
    util::{date_stamp, project_name_from_path, time_stamp},
};

pub type Result<T> = std::result::Result<T, ExportError>;

pub const TOOL: &str = "code2prompt";
pub const EXPORT_IGNORE: &str = ".exportignore";

/// Markers of the super-project root; both must be present.
const ROOT_MARKERS: [&str; 2] = ["neira-core", "neira-cli-mcp"];
const PACKAGE_PREFIX: &str = "neira-";

/// Excludes applied to every super-project export.
pub const COMMON_EXCLUDES: &[&str] = &[
    // build output and dependencies
    "**/node_modules/**", "**/dist/**", "**/out/**", "**/build/**", "**/.next/**",
    "**/.turbo/**", "**/coverage/**", "*.log", "*.map", "*.lock",
    "*.DS_Store", "*.idea*", "*.vscode*", ".git/**",
    "*/.neira/export_code/*",
    // submodule duplicate of neira-core
    "**/neira-enterprise/platform/**",
    // scratch
    "**/logs/**", "**/tmp/**", "**/temp/**", "**/.cache/**",
    // tests and fixtures
    "**/__tests__/**", "**/spec/**", "**/test/**", "**/*test*/**",
    "**/neira-apps/examples/**", "**/fixtures/**",
    // site sources of the docs package
    "**/neira-docs/blog/**", "**/neira-docs/src/**", "**/neira-docs/static/**",
    "**/.docusaurus/**",
    // binaries and media
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.bmp", "*.webp", "*.svg", "*.ico", "*.icns",
    "*.wav", "*.mp3", "*.mp4", "*.avi", "*.mov", "*.css", "*.dll", "*.bin", "*.dmg",
    "*.pdf", "*.exe", "*.ttf", "*.woff", "*.woff2", "*.otf",
    // service files
    "**/public/**", "**/drizzle/**", "**/storybook-static/**",
    "*.backup", "*.yml", "*.yaml", "**/*archive*/**",
    "*package-lock.json", "*yarn.lock", "*.pnp.cjs", "*.pnp.js", "*.pnp.loader.mjs",
    "**/.yarn/**", "**/install-state.gz",
    "*.tsbuildinfo", "*.tgz", "*.tar.gz",
    "*.db", "*.sqlite", "*.sqlite3",
    "**/LICENSE", "**/LICENSE.*", "**/*.LICENSE", "**/COPYING", "**/COPYRIGHT",
    "**/scripts/**",
];

/// Excludes for a plain (non super-project) export.
pub const BASIC_EXCLUDES: &[&str] = &[
    "node_modules", "dist", ".git", "*.log", "*.map", "*.lock", "*.DS_Store",
    ".idea", ".vscode", "coverage", ".next", "build", "out", ".turbo",
    "tmp", "temp", ".cache", "*.tsbuildinfo", "*.tgz", "*.tar.gz",
];

const SKIP_TESTS: &[&str] = &["*tests*", "*test.ts", "*spec.ts"];

/* ================================ Profiles ================================ */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profile {
    General,
    Mobile,
    Community,
    Enterprise,
    Cli,
    Cloud,
    Docs,
    Build,
    Tests,
    All,
    /// A discovered `neira-*` package directory.
    Package(String),
}

impl Profile {
    /// Built-in profiles with their descriptions, in help order.
    pub const BUILTIN: &'static [(&'static str, &'static str)] = &[
        ("general", "Основные компоненты без документации и тестов"),
        ("mobile", "Мобильная часть (neira-mobile-core + neira-mobile-bff)"),
        ("community", "Открытая экосистема (neira-core + neira-apps)"),
        ("enterprise", "Коммерческая часть (neira-enterprise)"),
        ("cli", "Инструменты разработчика (neira-cli-mcp)"),
        ("cloud", "Облачные сервисы (neira-cloud-backend)"),
        ("docs", "Документация (neira-docs/docs + README файлы)"),
        ("build", "Конфигурация сборки и CI"),
        ("tests", "Тесты и вспомогательные скрипты"),
        ("all", "Максимально полный дамп"),
    ];

    /// Built-in name, or one of the discovered `packages`.
    pub fn resolve(name: &str, packages: &[String]) -> Result<Self> {
        Ok(match name {
            "general" => Profile::General,
            "mobile" => Profile::Mobile,
            "community" => Profile::Community,
            "enterprise" => Profile::Enterprise,
            "cli" => Profile::Cli,
            "cloud" => Profile::Cloud,
            "docs" => Profile::Docs,
            "build" => Profile::Build,
            "tests" => Profile::Tests,
            "all" => Profile::All,
            other if packages.iter().any(|p| p == other) => Profile::Package(other.to_string()),
            other => return Err(ExportError::UnknownProfile(other.to_string())),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Profile::General => "general",
            Profile::Mobile => "mobile",
            Profile::Community => "community",
            Profile::Enterprise => "enterprise",
            Profile::Cli => "cli",
            Profile::Cloud => "cloud",
            Profile::Docs => "docs",
            Profile::Build => "build",
            Profile::Tests => "tests",
            Profile::All => "all",
            Profile::Package(p) => p,
        }
    }

    pub fn description(&self) -> &'static str {
        Self::BUILTIN
            .iter()
            .find(|(n, _)| *n == self.name())
            .map_or("Динамический пакет", |(_, d)| *d)
    }

    /// `(includes, excludes)` this profile adds on top of the common excludes.
    fn filters(&self) -> (Vec<String>, Vec<String>) {
        let s = |v: &[&str]| v.iter().map(ToString::to_string).collect::<Vec<_>>();
        let package = |globs: &[&str]| (s(globs), s(SKIP_TESTS));
        match self {
            Profile::General => (
                s(&[
                    "package.json", "README.md", "CHANGELOG.md", "ROADMAP.md",
                    "neira-mobile-core/package.json", "neira-mobile-core/packages/**",
                    "neira-core/package.json", "neira-core/packages/**",
                    "neira-enterprise/package.json", "neira-enterprise/packages/**",
                    "neira-cli-mcp/package.json", "neira-cli-mcp/src/**",
                    "neira-cloud-backend/package.json", "neira-cloud-backend/services/**",
                ]),
                s(&["*tests*", "*test.ts", "*spec.ts", ".github/*", "*docs*", "neira-docs/*"]),
            ),
            Profile::Mobile => package(&["neira-mobile-core/**"]),
            Profile::Community => package(&["neira-core/**", "neira-apps/**"]),
            Profile::Enterprise => package(&["neira-enterprise/**"]),
            Profile::Cli => package(&["neira-cli-mcp/**"]),
            Profile::Cloud => package(&["neira-cloud-backend/**"]),
            Profile::Docs => (
                s(&["neira-docs/docs/**", "*.md", "**/README*", "*.mmd", ".neira/docs/**"]),
                s(&["*node_modules*"]),
            ),
            Profile::Build => (
                s(&[
                    "package.json", "turbo.json", "**/package.json",
                    "*.config.js", "*.config.ts", "*.config.json",
                    ".github/workflows/**", "**/scripts/**",
                    "tsconfig.json", "**/tsconfig.json",
                ]),
                Vec::new(),
            ),
            Profile::Tests => (
                s(&["**/tests/**", "*test.ts", "*spec.ts", "**/scripts/**", "**/__tests__/**"]),
                Vec::new(),
            ),
            // heavy UI sources make the full dump unusable
            Profile::All => (Vec::new(), s(&["neira-core/packages/apps/librechat-ui/src/**"])),
            Profile::Package(p) => (vec![format!("{p}/**")], Vec::new()),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* ============================== Discovery ============================== */

/// Nearest ancestor of `start` (inclusive) holding both root markers.
pub fn find_super_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| ROOT_MARKERS.iter().all(|m| dir.join(m).exists()))
        .map(Path::to_path_buf)
}

/// `neira-*` directories under `root` that carry a `package.json`, sorted.
pub fn discover_packages(root: &Path) -> Vec<String> {
    let entries = match fs::read_dir(root) {
        Ok(e) => e,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "could not list packages");
            return Vec::new();
        }
    };
    let mut out: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().join("package.json").is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(PACKAGE_PREFIX))
        .collect();
    out.sort();
    out
}

/// Extra exclude globs from `<root>/.exportignore`. Blank lines and `#`
/// comments are skipped; a missing file means none.
pub fn read_export_ignore(root: &Path) -> Result<Vec<String>> {
    let path = root.join(EXPORT_IGNORE);
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ExportError::io(path, e)),
    };
    Ok(parse_export_ignore(&text))
}

pub fn parse_export_ignore(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/* ================================ Plan ================================ */

/// What to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    SuperProject { profile: Profile, packages: Vec<String> },
    /// No super-project above the working directory.
    CurrentProject { name: String },
}

/// Everything needed to run one export, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub root: PathBuf,
    pub target: Target,
    pub version_dir: PathBuf,
    pub output_file: PathBuf,
    /// From `.exportignore`.
    pub extra_excludes: Vec<String>,
}

impl ExportPlan {
    /// Resolves root, profile and output location for an export started in `cwd`.
    pub fn resolve<Tz: TimeZone>(
        cwd: &Path,
        profile: &str,
        output: Option<&str>,
        now: &DateTime<Tz>,
    ) -> Result<Self>
    where
        Tz::Offset: fmt::Display,
    {
        let (date, time) = (date_stamp(now), time_stamp(now));

        let (root, target, default_name) = match find_super_root(cwd) {
            Some(root) => {
                let packages = discover_packages(&root);
                let profile = Profile::resolve(profile, &packages)?;
                let name = format!("v{time}-{date}-{profile}-neira-super-app.md");
                debug!(root = %root.display(), %profile, packages = packages.len(), "super-project export");
                (root, Target::SuperProject { profile, packages }, name)
            }
            None => {
                let name = project_name_from_path(cwd);
                info!(cwd = %cwd.display(), "no super-project found, exporting current project");
                let file = format!("v{time}-{date}-{name}.md");
                (cwd.to_path_buf(), Target::CurrentProject { name }, file)
            }
        };

        let version_dir = root.join(".neira").join("export_code").join(date).join(format!("v{time}"));
        let output_file = version_dir.join(output.map_or(default_name, str::to_string));
        let extra_excludes = read_export_ignore(&root)?;

        Ok(Self { root, target, version_dir, output_file, extra_excludes })
    }

    /// Arguments for `code2prompt`, run with `root` as working directory.
    pub fn args(&self) -> Vec<String> {
        let root_arg = match &self.target {
            Target::SuperProject { .. } => self.root.to_string_lossy().into_owned(),
            Target::CurrentProject { .. } => ".".to_string(),
        };
        let mut args = vec![
            root_arg,
            "--no-clipboard".to_string(),
            "-O".to_string(),
            self.output_file.to_string_lossy().into_owned(),
        ];
        let mut push = |flag: &str, values: &mut dyn Iterator<Item = String>| {
            for v in values {
                args.push(flag.to_string());
                args.push(v);
            }
        };

        match &self.target {
            Target::SuperProject { profile, .. } => {
                push("-e", &mut COMMON_EXCLUDES.iter().map(ToString::to_string));
                push("-e", &mut self.extra_excludes.iter().cloned());
                let (includes, excludes) = profile.filters();
                push("-i", &mut includes.into_iter());
                push("-e", &mut excludes.into_iter());
            }
            Target::CurrentProject { .. } => {
                push("-e", &mut BASIC_EXCLUDES.iter().map(ToString::to_string));
                push("-e", &mut self.extra_excludes.iter().cloned());
            }
        }
        args
    }
}

/* ================================ Runner ================================ */

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Output file existed and `force` was off.
    AlreadyExists(PathBuf),
    Exported {
        path: PathBuf,
        /// Rough size in thousands of words.
        tokens_k: usize,
    },
}

/// Runs `<tool> --version`; returns its trimmed output.
pub fn check_tool(tool: &str) -> Result<String> {
    match Command::new(tool).arg("--version").output() {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            debug!(tool, %version, "tool found");
            Ok(version)
        }
        Ok(out) => {
            debug!(tool, code = ?out.status.code(), "version check failed");
            Err(ExportError::ToolMissing(tool.to_string()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ExportError::ToolMissing(tool.to_string())),
        Err(source) => Err(ExportError::Spawn { tool: tool.to_string(), source }),
    }
}

/// Runs `tool` with `args` in `cwd`, capturing output. Non-zero exit is
/// `ExportError::Failed`.
pub fn run_tool(tool: &str, args: &[String], cwd: &Path) -> Result<String> {
    debug!(tool, args = %args.join(" "), "running");
    let out = Command::new(tool)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| ExportError::Spawn { tool: tool.to_string(), source })?;

    if out.status.success() {
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    } else {
        Err(ExportError::Failed {
            code: out.status.code(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        })
    }
}

/// Executes `plan` with `tool`. Checks the tool first, then the overwrite guard.
pub fn run_export(plan: &ExportPlan, tool: &str, force: bool) -> Result<ExportOutcome> {
    check_tool(tool)?;

    if plan.output_file.exists() && !force {
        info!(path = %plan.output_file.display(), "export exists, not overwriting");
        return Ok(ExportOutcome::AlreadyExists(plan.output_file.clone()));
    }
    fs::create_dir_all(&plan.version_dir).map_err(|e| ExportError::io(&plan.version_dir, e))?;

    run_tool(tool, &plan.args(), &plan.root)?;
    let tokens_k = estimate_tokens(&plan.output_file);
    info!(path = %plan.output_file.display(), tokens_k, "export complete");
    Ok(ExportOutcome::Exported { path: plan.output_file.clone(), tokens_k })
}

/// Whitespace-separated words in thousands, rounded up. 0 if unreadable.
pub fn estimate_tokens(path: &Path) -> usize {
    fs::read_to_string(path).map_or(0, |text| text.split_whitespace().count().div_ceil(1000))
}
