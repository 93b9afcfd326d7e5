//! Privacy notice and consent prompt.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use super::Console;

/// What the user is being asked to allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentScope {
    /// Read messages and send an anonymized excerpt to an LLM API
    Analysis,
    /// Read messages locally only
    Preview,
}

/// Show the privacy notice and obtain consent.
///
/// `auto_consent` skips the prompt. Without it, a non-interactive stdin
/// counts as "no".
#[cfg(not(tarpaulin_include))]
pub fn obtain(console: &Console, auto_consent: bool, scope: ConsentScope) -> Result<bool> {
    print_notice(console, scope);

    if auto_consent {
        console.success("Auto-consent enabled. Proceeding...");
        return Ok(true);
    }

    if !atty::is(atty::Stream::Stdin) {
        console.secondary("Non-interactive mode: pass --consent to proceed.");
        console.error("User consent not provided. Exiting.");
        return Ok(false);
    }

    let question = match scope {
        ConsentScope::Analysis => "Do you consent to analyzing your messages? (yes/no): ",
        ConsentScope::Preview => "Do you consent to reading your messages? (yes/no): ",
    };
    eprint!("{}", console.theme.primary_text(question));
    io::stderr().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;

    // EOF (Ctrl-D) is a refusal
    if read == 0 || !is_affirmative(&input) {
        console.error("User consent not provided. Exiting.");
        return Ok(false);
    }

    console.success("Consent verified. Proceeding...");
    Ok(true)
}

fn print_notice(console: &Console, scope: ConsentScope) {
    console.heading("Messages Privacy Notice");
    console.heading(&"=".repeat(50));
    console.primary("This tool will:");
    console.primary("- Access your local Messages database (read-only)");
    console.primary("- Replace every contact with an anonymous label (Contact_1, Contact_2, ...)");
    match scope {
        ConsentScope::Analysis => {
            console.primary("- Send the latest messages per contact to an external LLM API");
            console.primary("- Generate a summary of your messaging patterns");
        }
        ConsentScope::Preview => {
            console.primary("- Count messages per contact without contacting any external service");
        }
    }
    console.primary("- NOT store or transmit your data anywhere else");
    console.blank();
}

/// `y` or `yes`, case-insensitive.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
