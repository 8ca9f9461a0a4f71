//! `quality_report` - release quality reports from an issue tracker
//!
//! This crate provides the core functionality for the `qreport` CLI tool.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Issue, custom fields, release windows)
//! - [`tracker`] - Query composition and the REST issue source
//! - [`stats`] - Aggregation, cross-release alignment, created/fixed pairing
//! - [`summarize`] - Prompt assembly and the chat-completions summarizer
//! - [`format`] - Markdown document, SVG charts, console output
//! - [`report`] - The report sections tying it all together
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod report;
pub mod stats;
pub mod summarize;
pub mod tracker;

pub use error::{ErrorCode, ErrorEnvelope, ReportError, Result};
