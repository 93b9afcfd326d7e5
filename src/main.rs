mod commands;

use anyhow::Result;
use clap::Parser;

use imsg::cli::{Cli, Commands};
use imsg::theme::current_theme;

/// Exit code used when the run is interrupted with Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[cfg(not(tarpaulin_include))]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    install_interrupt_handler();

    if let Err(e) = run(cli) {
        let theme = current_theme();
        eprintln!("{}", theme.error_text(&format!("Error: {:#}", e)));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => commands::analyze::handle(&args, &config),
        Commands::Preview(args) => commands::preview::handle(&args, &config),
        Commands::Config(action) => {
            commands::config::handle(action, cli.config.as_deref(), &config)
        }
        Commands::Completions { shell } => commands::completions::handle(shell),
    }
}

/// Log to stderr; `IMSG_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("IMSG_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Ctrl-C aborts the whole run. Nothing is persisted, so there is nothing to clean up.
fn install_interrupt_handler() {
    let result = ctrlc::set_handler(|| {
        eprintln!("\nInterrupted. No data was saved.");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    });
    if let Err(e) = result {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
}
