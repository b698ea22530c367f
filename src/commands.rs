// src/commands.rs

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::MapConfig,
    error::ExportError,
    export::{self, ExportOutcome, ExportPlan, Profile, Target},
    manifest, map_view,
    report::{self, WriteOutcome},
    scan, util,
};

/// Repository map generator for TypeScript/JavaScript and Python projects
#[derive(Parser, Debug)]
#[command(name = "repomap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the repository map
    Map {
        /// Project root to scan
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Report file (default REPOSITORY_MAP.txt in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing report
        #[arg(short, long)]
        force: bool,

        /// Include glob, repeatable; replaces the defaults
        #[arg(long = "include", value_name = "GLOB")]
        include: Vec<String>,

        /// Exclude glob, repeatable; replaces the defaults
        #[arg(long = "exclude", value_name = "GLOB")]
        exclude: Vec<String>,

        /// Write the structures as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Skip files listed in .gitignore
        #[arg(long)]
        gitignore: bool,
    },
    /// Export code for an LLM prompt through code2prompt
    Export {
        /// general, mobile, community, enterprise, cli, cloud, docs, build, tests, all or a neira-* package
        #[arg(default_value = "general")]
        profile: String,

        /// Output file name inside the version directory
        #[arg(short, long)]
        output: Option<String>,

        /// Overwrite an existing export
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Map { root, output, force, include, exclude, json, gitignore } => {
            let flags = MapConfig {
                include: (!include.is_empty()).then_some(include),
                exclude: (!exclude.is_empty()).then_some(exclude),
                output,
                respect_gitignore: gitignore.then_some(true),
            };
            generate_map(root, flags, json, force)
        }
        Command::Export { profile, output, force } => export_code(&profile, output.as_deref(), force),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    // a second init (tests, embedding) is not an error
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

fn generate_map(root: PathBuf, flags: MapConfig, json: bool, force: bool) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current_dir")?;
    let root = if root.is_absolute() { root } else { cwd.join(root) };

    let cfg = MapConfig::load(&root)
        .with_context(|| format!("loading config under {}", root.display()))?
        .overlay(flags);

    match manifest::read_manifest(&root) {
        Ok(Some(m)) => {
            for key in m.missing_metadata() {
                warn!(key, "manifest is missing metadata");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "manifest ignored"),
    }

    println!("🗺️  Генерация карты репозитория...");
    let report = scan::scan_project(&root, &cfg.scan_config())
        .with_context(|| format!("scanning {}", root.display()))?;
    println!("Найдено файлов: {}", report.files.len());

    let mut out_path = cfg.output_path(&cwd);
    let text = if json {
        if cfg.output.is_none() {
            out_path.set_extension("json");
        }
        map_view::render_json(&report.files).context("serializing structures")?
    } else {
        map_view::render_map(&report.files, &util::now_timestamp())
    };

    let outcome = report::write_report(&out_path, &text, force)
        .with_context(|| format!("writing {}", out_path.display()))?;
    match outcome {
        WriteOutcome::AlreadyExists => {
            println!("Файл {} уже существует. Используйте --force для перезаписи.", out_path.display());
        }
        WriteOutcome::Written { bytes, lines } => {
            let totals = map_view::Totals::of(&report.files);
            println!("✅ Карта репозитория сгенерирована успешно!");
            println!("📊 Результат:");
            println!("   Файл: {}", out_path.display());
            #[allow(clippy::cast_precision_loss)]
            let kb = bytes as f64 / 1024.0;
            println!("   Размер: {kb:.1} KB");
            println!("   Строк: {lines}");
            println!("   Функций: {}", totals.functions.0);
            println!("   Классов: {}", totals.classes.0);
            println!("   Интерфейсов: {}", totals.interfaces.0);
            println!("   Типов: {}", totals.types.0);
            println!("   Констант: {}", totals.constants.0);
            if !report.warnings.is_empty() {
                println!("   Пропущено файлов: {}", report.warnings.len());
            }
        }
    }
    Ok(())
}

fn export_code(profile: &str, output: Option<&str>, force: bool) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current_dir")?;
    let plan = ExportPlan::resolve(&cwd, profile, output, &Local::now())
        .with_context(|| format!("preparing export profile `{profile}`"))?;

    println!("🚀 Запуск экспорта кода...");
    println!("📝 Параметры экспорта:");
    match &plan.target {
        Target::SuperProject { profile, .. } => {
            println!("   Профиль: {profile}");
            println!("   Описание: {}", profile.description());
        }
        Target::CurrentProject { name } => {
            println!("⚠️  NEIRA Super App не найден, экспортируем текущий проект");
            println!("   Проект: {name}");
        }
    }
    println!("   Выходной файл: {}", plan.output_file.display());
    if !plan.extra_excludes.is_empty() {
        println!(
            "   Дополнительные исключения: {} правил из {}",
            plan.extra_excludes.len(),
            export::EXPORT_IGNORE
        );
    }

    let outcome = match export::run_export(&plan, export::TOOL, force) {
        Err(ExportError::ToolMissing(tool)) => {
            println!("\n💡 Способы установки {tool}:");
            println!("   npm install -g {tool}");
            println!("   brew install {tool} (macOS)");
            return Err(ExportError::ToolMissing(tool)).context("export aborted");
        }
        other => other.context("export failed")?,
    };

    match outcome {
        ExportOutcome::AlreadyExists(path) => {
            println!("Файл {} уже существует. Используйте --force для перезаписи.", path.display());
        }
        ExportOutcome::Exported { path, tokens_k } => {
            info!(path = %path.display(), "export written");
            println!("✅ Экспорт завершен успешно!");
            println!("📊 Результат:");
            println!("   Размер: ~{tokens_k}k токенов");
            println!("   Файл: {}", path.display());
            if let Target::SuperProject { profile: Profile::General, packages } = &plan.target {
                println!("\n💡 Для экспорта отдельных компонентов используйте:");
                for pkg in packages {
                    println!("   repomap export {pkg}");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn map_flags_parse() {
        let cli = Cli::try_parse_from([
            "repomap", "-v", "map", "--root", "app", "-o", "out.txt", "--include", "**/*.ts", "--include", "**/*.py",
            "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Map { root, output, include, json, force, .. } => {
                assert_eq!(root, PathBuf::from("app"));
                assert_eq!(output, Some(PathBuf::from("out.txt")));
                assert_eq!(include, vec!["**/*.ts", "**/*.py"]);
                assert!(json);
                assert!(!force);
            }
            Command::Export { .. } => panic!("expected map"),
        }
    }

    #[test]
    fn export_profile_defaults_to_general() {
        let cli = Cli::try_parse_from(["repomap", "export"]).unwrap();
        assert!(matches!(cli.command, Command::Export { ref profile, .. } if profile == "general"));
    }
}
