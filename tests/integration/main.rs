//! Integration tests for imsg
//!
//! Organized into modules by feature area.

mod helpers;

mod cli_test;
mod pipeline_test;
mod provider_test;
