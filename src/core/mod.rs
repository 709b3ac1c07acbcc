//! core
//!
//! Configuration and invocation plumbing for llmx.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Locations of the user directory, templates, and keys
//! - [`piped`] - Formatting of piped standard input
//! - [`invocation`] - Assembly of a model request from its parts

pub mod config;
pub mod invocation;
pub mod paths;
pub mod piped;
