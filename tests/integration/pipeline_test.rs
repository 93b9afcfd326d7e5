//! End-to-end runs of the pipeline over a real database file

use std::cell::Cell;
use std::rc::Rc;

use imsg::provider::{
    AnalysisProvider, ProviderError, ProviderRegistry, ProviderResult, ProviderSettings,
};
use imsg::{ChatDb, Pipeline, PipelineState};
use tempfile::TempDir;

use super::helpers::{chat_db, row, small_chat_db, Row};

/// Replies with a fixed body and counts calls.
struct Scripted {
    reply: String,
    calls: Rc<Cell<usize>>,
}

impl AnalysisProvider for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    fn complete(&self, _prompt: &str) -> ProviderResult<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.reply.clone())
    }

    fn unwrap_reply(&self, body: &str) -> ProviderResult<String> {
        Ok(body.to_string())
    }
}

fn scripted(reply: &str) -> (ProviderResult<Box<dyn AnalysisProvider>>, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let provider = Scripted {
        reply: reply.to_string(),
        calls: Rc::clone(&calls),
    };
    (Ok(Box::new(provider)), calls)
}

const GOOD_REPLY: &str = r#"{"narrative": "Lots of weekend planning.", "key_events": ["Friday dinner", "A birthday"]}"#;

#[test]
fn run_produces_analysis_for_fixture() {
    let dir = TempDir::new().unwrap();
    let db = ChatDb::open(small_chat_db(&dir)).unwrap();
    let (provider, calls) = scripted(GOOD_REPLY);

    let report = Pipeline::new(db, provider).days_back(1).run().unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.messages_fetched, 5);
    assert_eq!(report.conversations, 2);
    assert_eq!(report.result.key_events, vec!["Friday dinner", "A birthday"]);
    assert_eq!(calls.get(), 1);

    assert!(report.request_text.starts_with("Message conversations from the last 1 days:\n\n"));
    assert!(report.request_text.contains("--- Conversation with Contact_1 ---"));
    assert!(report.request_text.contains("--- Conversation with Contact_2 ---"));
    assert!(report.request_text.contains("User: yes, 7pm"));
    assert!(report.request_text.contains("Contact_2: happy birthday!!"));
    assert!(!report.request_text.contains("+15550001111"));
    assert!(!report.request_text.contains("friend@example.com"));
}

#[test]
fn run_keeps_latest_twenty_per_contact() {
    let dir = TempDir::new().unwrap();
    let texts: Vec<String> = (0..25).map(|i| format!("message {}", i)).collect();
    let rows: Vec<Row<'_>> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| row(text, 100 - i as i64, i % 2 == 0, Some("+15550009999")))
        .collect();
    let db = ChatDb::open(chat_db(&dir, &rows)).unwrap();
    let (provider, _) = scripted(GOOD_REPLY);

    let report = Pipeline::new(db, provider).days_back(1).run().unwrap();

    let lines: Vec<&str> = report
        .request_text
        .lines()
        .filter(|l| !l.is_empty())
        .collect();
    // header, section heading, 20 entries
    assert_eq!(lines.len(), 22);
    let entries: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|l| l.starts_with("User: ") || l.starts_with("Contact_1: "))
        .collect();
    assert_eq!(entries.len(), 20);
    assert_eq!(entries.iter().filter(|l| l.starts_with("User: ")).count(), 10);
    assert_eq!(lines[2], "Contact_1: message 5");
    assert_eq!(lines[3], "User: message 6");
    assert_eq!(lines[21], "User: message 24");
}

#[test]
fn run_without_recent_messages_aborts_before_provider() {
    let dir = TempDir::new().unwrap();
    let path = chat_db(&dir, &[row("long ago", 90 * 24 * 60, false, Some("a"))]);
    let db = ChatDb::open(path).unwrap();
    let (provider, calls) = scripted(GOOD_REPLY);

    let mut pipeline = Pipeline::new(db, provider).days_back(30);
    let report = pipeline.run().unwrap();

    assert_eq!(report.state, PipelineState::Aborted);
    assert_eq!(pipeline.state(), PipelineState::Aborted);
    assert_eq!(report.result.narrative, "No messages found to analyze.");
    assert!(report.result.key_events.is_empty());
    assert_eq!(calls.get(), 0);
}

#[test]
fn unsupported_provider_degrades_to_failed_result() {
    let dir = TempDir::new().unwrap();
    let db = ChatDb::open(small_chat_db(&dir)).unwrap();
    let provider =
        ProviderRegistry::builtin().resolve_with("bogus", &ProviderSettings::default(), |_| None);

    let report = Pipeline::new(db, provider).days_back(1).run().unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert!(report.result.narrative.starts_with("Analysis failed:"));
    assert!(report.result.narrative.contains("bogus"));
    assert!(report.result.key_events.is_empty());
}

#[test]
fn missing_credential_degrades_to_failed_result() {
    let dir = TempDir::new().unwrap();
    let db = ChatDb::open(small_chat_db(&dir)).unwrap();
    let provider =
        ProviderRegistry::builtin().resolve_with("openai", &ProviderSettings::default(), |_| None);
    assert!(matches!(provider, Err(ProviderError::MissingCredential { .. })));

    let report = Pipeline::new(db, provider).days_back(1).run().unwrap();

    assert_eq!(
        report.result.narrative,
        "Analysis failed: OPENAI_API_KEY environment variable not set"
    );
}

#[test]
fn unparseable_reply_degrades_to_failed_result() {
    let dir = TempDir::new().unwrap();
    let db = ChatDb::open(small_chat_db(&dir)).unwrap();
    let (provider, calls) = scripted("Sorry, I can't help with that.");

    let report = Pipeline::new(db, provider).days_back(1).run().unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert!(report.result.narrative.starts_with("Analysis failed:"));
    assert!(report.result.key_events.is_empty());
    assert_eq!(calls.get(), 1);
}
