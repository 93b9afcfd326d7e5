//! Development tasks: `cargo run -p xtask -- <task>`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "Development tasks for imsg")]
struct Xtask {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Generate man pages for imsg and its subcommands
    Man {
        /// Output directory
        #[arg(long, default_value = "target/man")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    match Xtask::parse().task {
        Task::Man { out } => generate_man_pages(&out),
    }
}

fn generate_man_pages(out: &Path) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;

    let cmd = imsg::cli::Cli::command();
    write_page(&cmd, "imsg", out)?;
    for sub in cmd.get_subcommands() {
        let name = format!("imsg-{}", sub.get_name());
        write_page(sub, &name, out)?;
    }

    println!("Man pages written to {}", out.display());
    Ok(())
}

fn write_page(cmd: &clap::Command, name: &str, out: &Path) -> Result<()> {
    let cmd = cmd.clone().name(name.to_string());
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).render(&mut buffer)?;
    let path = out.join(format!("{}.1", name));
    fs::write(&path, buffer).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
