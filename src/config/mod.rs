//! Configuration module for Listing-Grep
//!
//! This module handles loading, parsing, and validating the run configuration.
//! A configuration is assembled once (defaults, optional TOML file, command
//! line overrides), validated, and never mutated afterwards.
//!
//! # Example
//!
//! ```no_run
//! use listing_grep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("listing-grep.toml")).unwrap();
//! println!("Crawling {} page(s) of {}", config.pages, config.host);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BackendChoice, Config, OutputFormat, STDOUT_SINK};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, read_config};
pub use validation::validate;
