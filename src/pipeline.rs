//! One extraction-and-analysis run.
//!
//! The run is linear: `Idle -> Fetching -> Windowing -> Formatting ->
//! Analyzing -> Done`. When the source returns nothing the run stops in
//! `Aborted` without touching the provider. Provider faults never escape:
//! they become a degraded [`AnalysisResult`] so callers always have
//! something to display. Only data-source failures are returned as errors.

use chrono::{DateTime, Utc};

use crate::extract::{format_request, normalize, ConversationWindower, WINDOW_SIZE};
use crate::provider::{AnalysisProvider, AnalysisResult, ProviderError, ProviderResult};
use crate::source::{MessageSource, SourceError, TimestampCodec};

/// Default recency window, in days.
pub const DEFAULT_DAYS_BACK: u32 = 30;

/// Where a run currently is, or where it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Windowing,
    Formatting,
    Analyzing,
    Done,
    Aborted,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    /// `Done` or `Aborted`
    pub state: PipelineState,
    pub result: AnalysisResult,
    pub messages_fetched: usize,
    pub conversations: usize,
    /// The anonymized text that was (or would have been) sent.
    pub request_text: String,
}

/// Composes fetch, window, format and analyze.
pub struct Pipeline<S> {
    source: S,
    provider: ProviderResult<Box<dyn AnalysisProvider>>,
    codec: TimestampCodec,
    days_back: u32,
    windower: ConversationWindower,
    state: PipelineState,
}

impl<S: MessageSource> Pipeline<S> {
    /// Create a pipeline over `source`.
    ///
    /// `provider` is the already-resolved backend. A resolution fault is kept
    /// and reported as a degraded result when the run reaches analysis.
    pub fn new(source: S, provider: ProviderResult<Box<dyn AnalysisProvider>>) -> Self {
        Self {
            source,
            provider,
            codec: TimestampCodec::default(),
            days_back: DEFAULT_DAYS_BACK,
            windower: ConversationWindower::new(WINDOW_SIZE),
            state: PipelineState::Idle,
        }
    }

    pub fn days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }

    pub fn window_size(mut self, size: usize) -> Self {
        self.windower = ConversationWindower::new(size);
        self
    }

    pub fn codec(mut self, codec: TimestampCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run once against the current time.
    pub fn run(&mut self) -> Result<PipelineReport, SourceError> {
        self.run_at(Utc::now())
    }

    /// Run once as if the current time were `now`.
    pub fn run_at(&mut self, now: DateTime<Utc>) -> Result<PipelineReport, SourceError> {
        self.transition(PipelineState::Fetching);
        let cutoff = self.codec.cutoff_for(self.days_back, now);
        let raw = self.source.fetch_since(cutoff)?;
        let messages_fetched = raw.len();
        tracing::info!(messages = messages_fetched, days_back = self.days_back, "fetched messages");

        if raw.is_empty() {
            self.transition(PipelineState::Aborted);
            return Ok(PipelineReport {
                state: PipelineState::Aborted,
                result: AnalysisResult::no_messages(),
                messages_fetched,
                conversations: 0,
                request_text: String::new(),
            });
        }

        self.transition(PipelineState::Windowing);
        let windows = self.windower.window(normalize(raw, &self.codec));
        let conversations = windows.len();

        self.transition(PipelineState::Formatting);
        let request_text = format_request(&windows, self.days_back);

        self.transition(PipelineState::Analyzing);
        let result = if request_text.trim().is_empty() {
            AnalysisResult::no_messages()
        } else {
            self.analyze(&request_text)
        };

        self.transition(PipelineState::Done);
        Ok(PipelineReport {
            state: PipelineState::Done,
            result,
            messages_fetched,
            conversations,
            request_text,
        })
    }

    fn analyze(&self, request_text: &str) -> AnalysisResult {
        let outcome = match &self.provider {
            Ok(provider) => {
                tracing::info!(
                    provider = provider.name(),
                    model = provider.model(),
                    "analyzing messages"
                );
                provider.analyze(request_text)
            }
            Err(e) => return degrade(e),
        };

        match outcome {
            Ok(result) => {
                tracing::info!(key_events = result.key_events.len(), "analysis complete");
                result
            }
            Err(e) => degrade(&e),
        }
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = ?self.state, to = ?next, "pipeline transition");
        self.state = next;
    }
}

/// Turn a provider fault into the result shown to the user.
fn degrade(error: &ProviderError) -> AnalysisResult {
    if error.is_configuration() {
        tracing::warn!(error = %error, "analysis provider is not configured");
    } else {
        tracing::warn!(error = %error, "analysis request failed");
    }
    AnalysisResult::failed(error)
}
