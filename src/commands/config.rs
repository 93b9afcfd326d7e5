//! Config subcommands handler

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use imsg::cli::ConfigCommands;
use imsg::theme::current_theme;
use imsg::Config;

#[cfg(not(tarpaulin_include))]
pub fn handle(action: ConfigCommands, explicit: Option<&Path>, config: &Config) -> Result<()> {
    match action {
        ConfigCommands::Show => handle_show(config),
        ConfigCommands::Path => handle_path(explicit),
        ConfigCommands::Init { force } => handle_init(explicit, force),
    }
}

fn target_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::config_path()?),
    }
}

/// Show the effective configuration as TOML.
#[cfg(not(tarpaulin_include))]
fn handle_show(config: &Config) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    let theme = current_theme();
    println!("{}", theme.primary_text(&toml_str));
    Ok(())
}

#[cfg(not(tarpaulin_include))]
fn handle_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", target_path(explicit)?.display());
    Ok(())
}

/// Write the default configuration, refusing to clobber an existing file.
#[cfg(not(tarpaulin_include))]
fn handle_init(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = target_path(explicit)?;
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    Config::default().save_to(&path)?;
    let theme = current_theme();
    println!(
        "{}",
        theme.success_text(&format!("Wrote default config to {}", path.display()))
    );
    Ok(())
}
