//! Command orchestration
//!
//! This module provides:
//! - Configuration loading with command-line overrides applied
//! - Wiring of override database, file index and resolver per run
//! - One entry point per subcommand, writing through an output formatter

use crate::cli::{CliArgs, Command, DependsArgs};
use crate::config::Config;
use crate::depends::Aggregator;
use crate::domain::{MemorySink, Stats, Version};
use crate::error::{AppError, ConfigError, IoError, EXIT_INVALID_OVERRIDE_FILE};
use crate::output::{create_formatter, OutputFormat, OutputFormatter, Resolved};
use crate::pydist::{validate, OverrideDatabase, OverrideLoader};
use crate::resolver::{DpkgFileIndex, FileIndex, Resolver, StaticFileIndex};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Runs one parsed command line
pub struct Orchestrator {
    args: CliArgs,
    config: Config,
    loader: OverrideLoader,
}

impl Orchestrator {
    /// Loads the configuration named on the command line, if any
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let mut config = match &args.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(user_file) = &args.overrides {
            config.overrides.user_file = Some(user_file.clone());
        }
        Ok(Self::with_config(args, config))
    }

    /// Create an orchestrator with an already built configuration
    pub fn with_config(args: CliArgs, config: Config) -> Self {
        Self {
            args,
            config,
            loader: OverrideLoader::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the command and returns the process exit status
    pub fn run(&self, writer: &mut dyn Write) -> Result<u8, AppError> {
        match &self.args.command {
            Command::Validate { files } => Ok(self.validate(files)),
            Command::Resolve {
                target_version,
                requirements,
            } => {
                self.resolve(requirements, *target_version, writer)?;
                Ok(0)
            }
            Command::Depends(depends) => {
                self.depends(depends, writer)?;
                Ok(0)
            }
        }
    }

    fn formatter(&self) -> Box<dyn OutputFormatter> {
        create_formatter(
            OutputFormat::from_cli(self.args.json),
            &self.config.ecosystem.package_prefix,
        )
    }

    fn overrides(&self) -> Result<Arc<OverrideDatabase>, AppError> {
        let db = self.loader.load(&self.config.overrides)?;
        tracing::debug!("{} distribution names in override database", db.len());
        Ok(db)
    }

    fn file_index(&self) -> Result<Box<dyn FileIndex>, AppError> {
        match &self.args.file_index {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| IoError::generic(path, e))?;
                Ok(Box::new(StaticFileIndex::parse(&content)))
            }
            None => Ok(Box::new(DpkgFileIndex::new())),
        }
    }

    fn override_hint(&self) -> String {
        self.config
            .overrides
            .user_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "debian/py3dist-overrides".to_string())
    }

    /// Lints every file; broken files are reported, never fatal one by one
    fn validate(&self, files: &[std::path::PathBuf]) -> u8 {
        let mut broken = 0;
        for file in files {
            match validate(file) {
                Ok(()) => tracing::debug!("{} is valid", file.display()),
                Err(e) => {
                    tracing::error!("{}", e);
                    broken += 1;
                }
            }
        }
        if broken > 0 {
            EXIT_INVALID_OVERRIDE_FILE
        } else {
            0
        }
    }

    fn resolve(
        &self,
        requirements: &[String],
        target: Option<Version>,
        writer: &mut dyn Write,
    ) -> Result<(), AppError> {
        let db = self.overrides()?;
        let index = self.file_index()?;
        let resolver = Resolver::new(&db, &*index, &self.config.ecosystem)
            .with_override_hint(self.override_hint());

        let mut resolved = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            let dependency = resolver.resolve(requirement, target)?;
            resolved.push(Resolved::new(requirement.as_str(), dependency));
        }
        self.formatter()
            .format_resolved(&resolved, writer)
            .map_err(|e| IoError::generic("<stdout>", e))?;
        Ok(())
    }

    fn depends(&self, args: &DependsArgs, writer: &mut dyn Write) -> Result<(), AppError> {
        let stats = read_stats(&args.stats)?;
        let supported = self.config.supported_versions()?;
        let db = self.overrides()?;
        let index = self.file_index()?;
        let resolver = Resolver::new(&db, &*index, &self.config.ecosystem)
            .with_override_hint(self.override_hint());

        let aggregator = Aggregator::new(&resolver, &self.config.ecosystem, &supported);
        let set = aggregator.aggregate(&args.package, &stats, &args.options())?;

        let mut sink = MemorySink::new();
        set.emit(&mut sink);
        self.formatter()
            .format_substvars(&args.package, &sink, writer)
            .map_err(|e| IoError::generic("<stdout>", e))?;
        Ok(())
    }
}

/// Reads scanner findings from a JSON file
pub fn read_stats(path: &Path) -> Result<Stats, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| IoError::generic(path, e))?;
    let stats = serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(stats)
}
