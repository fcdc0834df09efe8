//! Configuration module for the scanner
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; a missing file means `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use ux_scanner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scanner.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_quota_patterns, Config, CrawlerConfig, ModelConfig, RendererConfig, ServerConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
