//! `safefeed`: poll the Opoint Safefeed from the command line.
//!
//! The binary wires logging and argument parsing together; the polling loop
//! lives in [`runner`] so it can be driven by a scripted backend in tests.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dependencies used only by main.rs
use anyhow as _;
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod error;
pub mod parser;
pub mod runner;

pub use error::CliError;
pub use parser::Cli;
