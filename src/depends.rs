//! Dependency aggregation for one binary package
//!
//! Combines the scanner's [`Stats`] with the command-line
//! [`DependencyOptions`] into a [`DependencySet`]:
//! - the requested interpreter range
//! - extension module ABI versions
//! - byte-compilation support
//! - shebangs, top-level and per private directory
//! - requirement files, through the [`Resolver`]
//! - explicit Depends/Recommends/Suggests/Enhances/Breaks strings

use crate::config::Ecosystem;
use crate::domain::{
    DependencyOptions, DependencySet, PrivateDirStats, RuntimeUpdate, Stats, SupportedVersions,
    Version, VersionRange,
};
use crate::error::{AppError, ShebangError};
use crate::resolver::Resolver;
use std::collections::BTreeSet;

/// Builds dependency sets against one resolver and one distribution setup
pub struct Aggregator<'a> {
    resolver: &'a Resolver<'a>,
    ecosystem: &'a Ecosystem,
    supported: &'a SupportedVersions,
}

impl<'a> Aggregator<'a> {
    pub fn new(
        resolver: &'a Resolver<'a>,
        ecosystem: &'a Ecosystem,
        supported: &'a SupportedVersions,
    ) -> Self {
        Self {
            resolver,
            ecosystem,
            supported,
        }
    }

    /// Collects every relation of `package`
    pub fn aggregate(
        &self,
        package: &str,
        stats: &Stats,
        options: &DependencyOptions,
    ) -> Result<DependencySet, AppError> {
        tracing::debug!("generating dependencies for package {}", package);
        let debug = package.ends_with("-dbg");
        let mut set = DependencySet::new(package);
        let vrange = options.vrange.filter(|r| !r.is_unbounded());

        if let Some(range) = vrange {
            if range.members(self.supported).is_empty() {
                tracing::warn!("no supported Python version in requested range {}", range);
            }
            self.range_depends(&mut set, range, debug);
        }

        if let (Some(min), Some(max)) = (stats.ext.first(), stats.ext.last()) {
            let default = self.supported.default_version();
            let runtime = self.ecosystem.runtime(debug);
            if *min <= default {
                set.depend(format!("{} (>= {})", runtime, min));
            }
            if *max >= default {
                set.depend(format!("{} (<< {})", runtime, max.next_minor()?));
            }
        }

        if stats.compile {
            set.depend(self.ecosystem.compile_dependency.as_str());
        }

        for shebang in &stats.shebangs {
            set.depend(shebang.interpreter.as_str());
        }

        for (dir, details) in &stats.private_dirs {
            self.private_dir(&mut set, dir, details, vrange, options, debug)?;
        }

        if options.guess_deps {
            for path in &stats.requires {
                for dependency in self.resolver.parse_requirement_file(path)? {
                    set.depend(dependency);
                }
            }
        }

        for item in &options.depends {
            if let Some(dependency) = self.resolver.resolve(item, None)? {
                set.depend(dependency);
            }
        }
        for item in &options.recommends {
            if let Some(dependency) = self.resolver.resolve(item, None)? {
                set.recommend(dependency);
            }
        }
        for item in &options.suggests {
            if let Some(dependency) = self.resolver.resolve(item, None)? {
                set.suggest(dependency);
            }
        }
        for item in &options.enhances {
            set.enhance(item.as_str());
        }
        for item in &options.breaks {
            set.break_(item.as_str());
        }

        tracing::debug!("{}", set);
        Ok(set)
    }

    /// Bounded runtime dependency for a requested range
    fn range_depends(&self, set: &mut DependencySet, range: VersionRange, debug: bool) {
        if let Some(exact) = range.as_exact() {
            set.depend(self.ecosystem.versioned_runtime(exact, debug));
            return;
        }
        let runtime = self.ecosystem.runtime(debug);
        if let Some(min) = range.min() {
            set.depend(format!("{} (>= {})", runtime, min));
        }
        if let Some(max) = range.max() {
            set.depend(format!("{} (<< {})", runtime, max));
        }
    }

    /// Runtime dependency for a private directory compiled for a requested range
    ///
    /// The upper bound is inclusive here and the plain templates are used,
    /// even for `-dbg` packages.
    fn private_range_depends(
        &self,
        set: &mut DependencySet,
        range: VersionRange,
    ) -> Result<(), AppError> {
        if let Some(exact) = range.as_exact() {
            set.depend(self.ecosystem.versioned_runtime(exact, false));
            return Ok(());
        }
        let runtime = self.ecosystem.runtime(false);
        if let Some(min) = range.min() {
            set.depend(format!("{} (>= {})", runtime, min));
        }
        if let Some(max) = range.max() {
            set.depend(format!("{} (<< {})", runtime, max.next_minor()?));
        }
        Ok(())
    }

    fn private_dir(
        &self,
        set: &mut DependencySet,
        dir: &str,
        details: &PrivateDirStats,
        vrange: Option<VersionRange>,
        options: &DependencyOptions,
        debug: bool,
    ) -> Result<(), AppError> {
        let pinned: BTreeSet<Version> = details.shebangs.iter().filter_map(|s| s.version).collect();
        if pinned.len() > 1 {
            let versions: Vec<String> = pinned.iter().map(Version::to_string).collect();
            tracing::error!(
                "more than one Python dependency from shebangs ({} shebang versions: {})",
                dir,
                versions.join(", ")
            );
            return Err(ShebangError::ConflictingVersions {
                dir: dir.to_string(),
                versions: versions.join(", "),
            }
            .into());
        }
        for version in pinned {
            if self.supported.contains(version) {
                set.depend(self.ecosystem.versioned_runtime(version, debug));
            } else {
                tracing::info!(
                    "dependency on python{} (from shebang) ignored - it's not supported anymore",
                    version
                );
            }
        }
        if details.shebangs.iter().any(|s| s.version.is_none()) {
            set.depend(self.ecosystem.runtime(debug));
        }

        if !details.compile {
            return Ok(());
        }
        set.depend(self.ecosystem.compile_dependency.as_str());

        let mut args = String::new();
        if let (Some(min), Some(max)) = (details.ext.first(), details.ext.last()) {
            let range = VersionRange::new(Some(*min), Some(*max))?;
            args.push_str(&format!("-V {}", range));
            if min == max {
                set.depend(self.ecosystem.versioned_runtime(*min, debug));
            } else {
                let runtime = self.ecosystem.runtime(debug);
                set.depend(format!("{} (>= {})", runtime, min));
                set.depend(format!("{} (<< {})", runtime, max.next_minor()?));
            }
        } else if let Some(range) = vrange {
            args.push_str(&format!("-V {}", range));
            self.private_range_depends(set, range)?;
        }

        for pattern in &options.regexpr {
            args.push_str(&format!(" -X '{}'", pattern.replace('\'', r"'\''")));
        }
        set.rtupdate(RuntimeUpdate::new(dir, args));
        Ok(())
    }
}
