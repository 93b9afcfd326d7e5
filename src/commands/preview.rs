//! Preview command handler

use anyhow::{Context, Result};
use chrono::Utc;

use imsg::cli::PreviewArgs;
use imsg::extract::{normalize, ActivityPreview};
use imsg::theme::current_theme;
use imsg::{Config, MessageSource, TimestampCodec};

use super::consent::{self, ConsentScope};
use super::{open_database, Console};

/// Print anonymized per-contact message counts. No provider is contacted.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &PreviewArgs, config: &Config) -> Result<()> {
    let console = Console::new(current_theme(), false);
    let days_back = args.source.days.unwrap_or(config.analysis.days_back);

    if !consent::obtain(&console, args.source.consent, ConsentScope::Preview)? {
        return Ok(());
    }

    let db = open_database(&console, &args.source, config)?;
    let codec = TimestampCodec::default();
    let cutoff = codec.cutoff_for(days_back, Utc::now());
    let raw = db.fetch_since(cutoff).context("Failed to read messages")?;

    if raw.is_empty() {
        console.warning(&format!("No messages found in the last {} days.", days_back));
        return Ok(());
    }

    let preview = ActivityPreview::from_messages(&normalize(raw, &codec));
    console.blank();
    console.heading(&format!("Activity over the last {} days:", days_back));
    for line in preview.lines() {
        console.primary(&line);
    }
    console.blank();
    console.success(&preview.summary());
    Ok(())
}
