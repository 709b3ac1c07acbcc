//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Status messages, warnings and response display
//! - [`markdown`] - Markdown rendering for terminal output
//!
//! # Design
//!
//! All user-facing output goes through this module. Diagnostics for
//! developers go through the `log` facade instead.

pub mod markdown;
pub mod output;
