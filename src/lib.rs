//! imsg - anonymized summaries of local Messages conversations.
//!
//! A run reads recent rows from the Messages store, swaps every participant
//! for a `Contact_<k>` label, keeps the newest messages per contact and asks
//! a pluggable LLM backend for a narrative plus notable events. Everything
//! stays in memory for the duration of the run.
//!
//! # Module Structure
//!
//! - [`source`] - the Messages store and its timestamp encoding
//! - [`extract`] - normalization, anonymization, windowing and formatting
//! - [`provider`] - analysis backends and their registry
//! - [`pipeline`] - one end-to-end run
//! - [`config`] - the TOML configuration file
//! - [`cli`] - command-line definitions

pub mod cli;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod provider;
pub mod source;
pub mod theme;

pub use config::Config;
pub use pipeline::{Pipeline, PipelineReport, PipelineState};
pub use provider::{AnalysisProvider, AnalysisResult, ProviderError, ProviderRegistry};
pub use source::{ChatDb, MessageSource, RawMessage, SourceError, TimestampCodec};
