//! Resolved, immutable scan settings.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use crate::cli::Cli;
use crate::detect::DetectionMode;

/// Everything a scan needs, resolved once from the command line.
///
/// Compared by value so two configurations built from equivalent inputs
/// are equal, exclude list included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Absolute root folder
    pub folder: PathBuf,
    /// File name glob for candidates
    pub pattern: String,
    pub excludes: Vec<String>,
    pub mode: DetectionMode,
    pub raw: bool,
    pub single_thread: bool,
}

impl ScanConfig {
    /// Config with defaults for `folder`, taken as given.
    pub fn new(folder: impl Into<PathBuf>, mode: DetectionMode) -> Self {
        Self {
            folder: folder.into(),
            pattern: mode.default_pattern().to_string(),
            excludes: Vec::new(),
            mode,
            raw: false,
            single_thread: false,
        }
    }

    /// Resolve the command line.
    ///
    /// # Errors
    ///
    /// Fails when the folder does not exist or is not a directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mode = if cli.content {
            DetectionMode::Content
        } else {
            DetectionMode::Extension
        };

        let folder = std::fs::canonicalize(&cli.folder)
            .with_context(|| format!("folder not found: {}", cli.folder))?;
        if !folder.is_dir() {
            bail!("not a folder: {}", folder.display());
        }

        Ok(Self {
            folder,
            pattern: cli
                .pattern
                .clone()
                .unwrap_or_else(|| mode.default_pattern().to_string()),
            excludes: cli.exclude.clone(),
            mode,
            raw: cli.raw,
            single_thread: cli.single_thread,
        })
    }

    /// Number of archives processed concurrently
    pub fn workers(&self) -> usize {
        if self.single_thread {
            1
        } else {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        }
    }
}
