//! pydist - Python requirement to Debian dependency translator library
//!
//! This library provides the core functionality for turning upstream Python
//! distribution requirements into Debian package relations:
//! - Interpreter version ranges (domain)
//! - Curated override files (pydist)
//! - Version translation rules (rules)
//! - Requirement resolution with file-index fallback (resolver)
//! - Per-package dependency aggregation (depends)

pub mod cli;
pub mod config;
pub mod depends;
pub mod domain;
pub mod error;
pub mod memo;
pub mod orchestrator;
pub mod output;
pub mod pydist;
pub mod resolver;
pub mod rules;
