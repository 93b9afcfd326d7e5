//! Analyze command handler

use anyhow::{Context, Result};

use imsg::cli::AnalyzeArgs;
use imsg::provider::{AnalysisResult, ProviderError};
use imsg::theme::{current_theme, Theme};
use imsg::{Config, Pipeline, PipelineState, ProviderRegistry};

use super::consent::{self, ConsentScope};
use super::{open_database, Console};

const RULE_WIDTH: usize = 60;

/// Run one analysis and print the result.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &AnalyzeArgs, config: &Config) -> Result<()> {
    let theme = current_theme();
    // With --json, stdout carries only the result
    let console = Console::new(theme.clone(), args.json);

    let days_back = args.source.days.unwrap_or(config.analysis.days_back);
    let provider_name = args
        .provider
        .clone()
        .unwrap_or_else(|| config.analysis.provider.clone());

    if !consent::obtain(&console, args.source.consent, ConsentScope::Analysis)? {
        return Ok(());
    }

    let db = open_database(&console, &args.source, config)?;

    let settings = config.provider_settings(&provider_name);
    let registry = ProviderRegistry::builtin();
    let provider = registry.resolve(&provider_name, &settings);
    if let Err(e) = &provider {
        if let Some(hint) = provider_hint(&registry, e) {
            console.warning(&hint);
        }
    }

    let mut pipeline = Pipeline::new(db, provider)
        .days_back(days_back)
        .window_size(config.analysis.window_size);

    console.secondary(&format!(
        "Extracting messages from the last {} days and analyzing with {}...",
        days_back, provider_name
    ));
    let report = pipeline.run().context("Failed to read messages")?;

    if report.state == PipelineState::Aborted {
        if args.json {
            print_json(&report.result)?;
        } else {
            console.error(&report.result.narrative);
        }
        return Ok(());
    }

    console.success(&format!(
        "Retrieved {} messages from {} contacts",
        report.messages_fetched, report.conversations
    ));

    if args.show_request {
        console.blank();
        console.heading("REQUEST SENT TO PROVIDER:");
        console.heading(&"-".repeat(30));
        console.line(&report.request_text);
    }

    if args.json {
        print_json(&report.result)
    } else {
        print!("{}", render_result(&report.result, &theme));
        Ok(())
    }
}

/// Which names would have worked, for name and build faults.
fn provider_hint(registry: &ProviderRegistry, error: &ProviderError) -> Option<String> {
    match error {
        ProviderError::Unsupported(_) => {
            Some(format!("Known providers: {}", registry.names().join(", ")))
        }
        ProviderError::Unavailable { .. } => Some(format!(
            "Providers in this build: {}",
            registry.available().join(", ")
        )),
        _ => None,
    }
}

fn print_json(result: &AnalysisResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Human-readable rendering of a result.
pub fn render_result(result: &AnalysisResult, theme: &Theme) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let sub_rule = "-".repeat(30);
    let mut out = String::new();

    out.push('\n');
    out.push_str(&theme.accent_text(&rule));
    out.push('\n');
    out.push_str(&theme.accent_text("ANALYSIS RESULTS"));
    out.push('\n');
    out.push_str(&theme.accent_text(&rule));
    out.push_str("\n\n");

    out.push_str(&theme.primary_text("NARRATIVE SUMMARY:"));
    out.push('\n');
    out.push_str(&theme.secondary_text(&sub_rule));
    out.push('\n');
    out.push_str(&theme.primary_text(&result.narrative));
    out.push_str("\n\n");

    out.push_str(&theme.primary_text("KEY EVENTS:"));
    out.push('\n');
    out.push_str(&theme.secondary_text(&sub_rule));
    out.push('\n');
    if result.key_events.is_empty() {
        out.push_str(&theme.secondary_text("No key events reported."));
        out.push('\n');
    }
    for (i, event) in result.key_events.iter().enumerate() {
        out.push_str(&theme.primary_text(&format!("{}. {}", i + 1, event)));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&theme.accent_text(&rule));
    out.push('\n');
    out.push_str(&theme.success_text("Analysis complete!"));
    out.push('\n');
    out
}
