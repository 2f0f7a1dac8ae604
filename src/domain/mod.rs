//! Core domain models for pydist
//!
//! This module contains the fundamental types used throughout the crate:
//! - Interpreter versions, half-open ranges and the supported version set
//! - Upstream requirements and name normalization
//! - Per-package dependency sets and the sink they are emitted to
//! - Detected package facts and aggregation options

mod dependency_set;
mod requirement;
mod stats;
mod version;

pub use dependency_set::{Category, DependencySet, MemorySink, RuntimeUpdate, SubstvarSink};
pub use requirement::{safe_name, Operator, Requirement};
pub use stats::{DependencyOptions, PrivateDirStats, Shebang, Stats};
pub use version::{SupportedVersions, Version, VersionRange};
