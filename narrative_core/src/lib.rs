//! # Narrative Core
//!
//! The narrative graph of an interlocking storybook set. This crate loads the
//! records described by `story_rules`, links them into a read-only graph,
//! checks the graph's structural rules, and reassembles each character's
//! story.
//!
//! ## Core Components
//!
//! - **content_store**: Raw records keyed by kind and name (in memory or from a directory)
//! - **graph**: The `World` - characters, aliased page records and node definitions
//! - **validator**: Structural checks producing a sorted report of findings
//! - **assembler**: Ordered story reconstruction with node analysis and Markdown output
//!
//! ## Design Philosophy
//!
//! - **Build Once**: All references are resolved before any reader runs; nothing mutates the world afterwards
//! - **Report Everything**: Structural problems are collected, never stop the run early
//! - **Shared, Not Copied**: A meeting page is one record reached from several stories

pub mod assembler;
pub mod content_store;
pub mod error;
pub mod graph;
pub mod validator;

#[cfg(test)]
mod testing;

pub use assembler::*;
pub use content_store::*;
pub use error::*;
pub use graph::*;
pub use validator::*;

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr.
///
/// Use the `RUST_LOG` environment variable to override the default `info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
