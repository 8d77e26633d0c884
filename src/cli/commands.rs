//! Command implementations behind the argument definitions

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;

use super::args::{Cli, Commands, LanguageCli, LanguageCommand};
use super::{latest, plugin, style};
use crate::config::Settings;
use crate::core::http::Fetcher;
use crate::core::paths::{resolve_root, shared_bin_dir};
use crate::core::platform::Platform;
use crate::core::{Language, TinyenvError};
use crate::runtimes::{LanguageManager, Session};
use crate::shims::RehashReport;

/// Resolved root plus the settings loaded from it
pub struct App {
    root: PathBuf,
    settings: Settings,
}

impl App {
    pub fn new(root: PathBuf) -> Result<Self> {
        let settings = Settings::load(&root)?;
        let bin = shared_bin_dir(&root);
        std::fs::create_dir_all(&bin).with_context(|| format!("Failed to create {}", bin.display()))?;
        Ok(Self { root, settings })
    }

    fn manager(&self, language: Language) -> LanguageManager {
        LanguageManager::new(&self.root, language, &self.settings)
    }

    /// Network and platform state, only built by commands that need it
    fn session(&self) -> Result<Session> {
        Ok(Session::new(
            Fetcher::new(&self.settings.http)?,
            Platform::current()?,
        ))
    }
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let app = || App::new(resolve_root()?);
    match cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tinyenv", &mut io::stdout());
        }
        Commands::Root => println!("{}", app()?.root.display()),
        Commands::Version => show_active(&app()?)?,
        Commands::Versions => show_installed(&app()?)?,
        Commands::Rehash => rehash_all(&app()?)?,
        Commands::Latest => {
            let app = app()?;
            latest::report(&app.root, &app.settings, &app.session()?).await?;
        }
        Commands::Files => show_files(&app()?)?,
        Commands::Language(args) => run_language(&app()?, &args).await?,
    }
    Ok(())
}

fn show_active(app: &App) -> Result<()> {
    for &language in Language::ALL {
        if let Some(version) = app.manager(language).current_version()? {
            println!("{language} {version}");
        }
    }
    Ok(())
}

fn marker(version: &str, current: Option<&str>) -> &'static str {
    if current == Some(version) {
        "* "
    } else {
        "  "
    }
}

fn show_installed(app: &App) -> Result<()> {
    for &language in Language::ALL {
        let manager = app.manager(language);
        let current = manager.current_version()?;
        for version in manager.versions()? {
            println!("{}{language} {version}", marker(&version, current.as_deref()));
        }
    }
    Ok(())
}

/// Rehash every language with an active version, continuing past failures
fn rehash_all(app: &App) -> Result<()> {
    let mut failed = Vec::new();
    for &language in Language::ALL {
        let manager = app.manager(language);
        if manager.current_version()?.is_none() {
            continue;
        }
        match manager.rehash() {
            Ok(report) => print_rehashed(language, &report),
            Err(err) => {
                eprintln!("{} {language}: {err:#}", "✗".red());
                failed.push(language.name());
            }
        }
    }
    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("rehash failed for {}", failed.join(", "))
    }
}

fn print_rehashed(language: Language, report: &RehashReport) {
    println!(
        "{} {language}: {} shims ({} removed)",
        "✓".green(),
        report.written.len(),
        report.removed
    );
}

fn show_files(app: &App) -> Result<()> {
    for &language in Language::ALL {
        let manager = app.manager(language);
        let paths = manager.paths();

        let version_file = paths.version_file();
        if let Some(version) = manager.current_version()? {
            println!("{} {}", version_file.display(), version.dimmed());
        }

        let cache_dir = paths.cache_dir();
        let entries = match std::fs::read_dir(&cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", cache_dir.display())),
        };
        let mut files: Vec<(PathBuf, u64)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let meta = entry.metadata()?;
            if meta.is_file() {
                files.push((entry.path(), meta.len()));
            }
        }
        files.sort();
        for (path, size) in files {
            println!("{} {}", path.display(), style::format_size(size).dimmed());
        }
    }
    Ok(())
}

async fn run_language(app: &App, args: &[String]) -> Result<()> {
    let Some((name, rest)) = args.split_first() else {
        return Err(TinyenvError::InvalidCommand(String::new()).into());
    };
    let language: Language = name.parse()?;
    let manager = app.manager(language);
    manager.init()?;

    let cli = LanguageCli::try_parse_from(rest)?;
    match cli.command {
        LanguageCommand::Versions { bare } => {
            let current = manager.current_version()?;
            for version in manager.versions()? {
                if bare {
                    println!("{version}");
                } else {
                    println!("{}{version}", marker(&version, current.as_deref()));
                }
            }
        }
        LanguageCommand::Version => println!("{}", manager.version()?),
        LanguageCommand::Global { version } => {
            manager.global(&version)?;
            println!("{} Now using {language} {version}", "✓".green());
        }
        LanguageCommand::Rehash => {
            let report = manager.rehash()?;
            print_rehashed(language, &report);
        }
        LanguageCommand::Install {
            list,
            list_all,
            global,
            version,
        } => {
            let session = app.session()?;
            if list || list_all {
                for version in manager.list(&session, list_all).await? {
                    println!("{version}");
                }
                return Ok(());
            }
            let Some(version) = version else {
                return Err(TinyenvError::InvalidCommand("install".to_string()).into());
            };
            install(&manager, &session, &version, global).await?;
        }
        LanguageCommand::Reset { version } => {
            let version = manager.reset(Platform::current()?, &version).await?;
            println!("{} {language} {version} reset", "✓".green());
        }
        LanguageCommand::Plugin(args) => plugin::run(&app.root, language, &args).await?,
    }
    Ok(())
}

/// Install, and with `--global` activate the resolved version.
///
/// An already-installed version is still activated before the error is
/// reported, so `install -g latest` switches to it either way.
async fn install(manager: &LanguageManager, session: &Session, version: &str, global: bool) -> Result<()> {
    let language = manager.language();
    match manager.install(session, version).await {
        Ok(installed) => {
            println!("{} {language} {installed} installed", "✓".green());
            if global {
                manager.set_version(&installed)?;
                manager.rehash()?;
                println!("{} Now using {language} {installed}", "✓".green());
            }
            Ok(())
        }
        Err(err) => {
            if global
                && let Some(TinyenvError::AlreadyExists { version, .. }) = err.downcast_ref::<TinyenvError>()
            {
                manager.set_version(version)?;
                manager.rehash()?;
                println!("{} Now using {language} {version}", "✓".green());
            }
            Err(err)
        }
    }
}
