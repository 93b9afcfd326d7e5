//! Subcommand handlers for the `imsg` binary.

pub mod analyze;
pub mod completions;
pub mod config;
pub mod consent;
pub mod preview;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use imsg::cli::SourceArgs;
use imsg::theme::Theme;
use imsg::{ChatDb, Config};

/// Load the config from `explicit` or the default location.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load_from(path)?,
        None => match Config::config_path() {
            Ok(path) => Config::load_from(&path)?,
            Err(e) => {
                tracing::debug!(error = %e, "using default config");
                Config::default()
            }
        },
    };
    Ok(config)
}

/// Database path from flags, then config, then the platform default.
pub fn database_path(args: &SourceArgs, config: &Config) -> Result<PathBuf> {
    match &args.db {
        Some(path) => Ok(path.clone()),
        None => config
            .database_path()
            .context("Could not determine your home directory; pass --db <PATH>"),
    }
}

/// Open the Messages database, reporting success on the console.
pub fn open_database(console: &Console, args: &SourceArgs, config: &Config) -> Result<ChatDb> {
    let path = database_path(args, config)?;
    let db = ChatDb::open(&path)?;
    console.success(&format!(
        "Successfully connected to Messages database at {}",
        db.path().display()
    ));
    Ok(db)
}

/// Decorative output that moves to stderr when stdout carries data.
pub struct Console {
    pub theme: Theme,
    to_stderr: bool,
}

impl Console {
    pub fn new(theme: Theme, to_stderr: bool) -> Self {
        Self { theme, to_stderr }
    }

    pub fn line(&self, text: &str) {
        if self.to_stderr {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    pub fn primary(&self, text: &str) {
        self.line(&self.theme.primary_text(text));
    }

    pub fn secondary(&self, text: &str) {
        self.line(&self.theme.secondary_text(text));
    }

    pub fn heading(&self, text: &str) {
        self.line(&self.theme.accent_text(text));
    }

    pub fn success(&self, text: &str) {
        self.line(&self.theme.success_text(text));
    }

    pub fn warning(&self, text: &str) {
        self.line(&self.theme.warning_text(text));
    }

    pub fn error(&self, text: &str) {
        self.line(&self.theme.error_text(text));
    }
}
