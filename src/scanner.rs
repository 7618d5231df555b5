//! Folder scan: enumerate candidates, filter them, walk each one.
//!
//! Top-level files are spread over blocking-pool tasks bounded by a
//! semaphore, one archive per task. Every file succeeds or fails on its own; a broken
//! archive is reported and the batch carries on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::detect::{ArchiveDetector, ByContent, ByExtension, DetectionMode};
use crate::filter::{ExcludeFilter, FilePattern};
use crate::sink::ScanSink;
use crate::walker::{ArchiveWalker, WalkStatus};

/// Totals for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files that survived pattern and exclude filtering
    pub candidates: usize,
    /// Archives walked to the end
    pub walked: usize,
    /// Candidates whose content did not look like a ZIP
    pub rejected: usize,
    /// Candidates that could not be opened as archives
    pub failed: usize,
    pub cancelled: bool,
}

/// What happened to one top-level file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Walked,
    Rejected,
    Failed,
    Cancelled,
}

impl ScanSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Walked => self.walked += 1,
            Outcome::Rejected => self.rejected += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Cancelled => self.cancelled = true,
        }
    }
}

pub struct Scanner {
    config: ScanConfig,
    sink: Arc<dyn ScanSink>,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(config: ScanConfig, sink: Arc<dyn ScanSink>) -> Self {
        Self {
            config,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop dispatching and walking once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// All files under the root folder that match the pattern and no exclude.
    ///
    /// Unreadable directories and entries are skipped. Siblings are visited
    /// in file-name order.
    ///
    /// # Errors
    ///
    /// Fails only on an invalid pattern or exclude glob.
    pub fn collect_candidates(&self) -> Result<Vec<PathBuf>> {
        enumerate_candidates(&self.config)
    }

    /// Run the whole scan, writing results and notifications to the sink.
    pub async fn scan(&self) -> Result<ScanSummary> {
        match self.config.mode {
            DetectionMode::Extension => self.run(ByExtension).await,
            DetectionMode::Content => self.run(ByContent).await,
        }
    }

    async fn run<D: ArchiveDetector>(&self, detector: D) -> Result<ScanSummary> {
        let config = &self.config;
        self.sink
            .info(&format!("Folder: {}", config.folder.display()));
        self.sink.info(&format!("Pattern: {}", config.pattern));
        self.sink.info(&format!("Detection: {}", config.mode));
        if !config.excludes.is_empty() {
            self.sink
                .info(&format!("Excluding: {}", config.excludes.join(", ")));
        }

        // Directory traversal blocks, keep it off the runtime workers
        let enumerate_config = config.clone();
        let candidates =
            task::spawn_blocking(move || enumerate_candidates(&enumerate_config)).await??;
        let noun = match config.mode {
            DetectionMode::Extension => "zip",
            DetectionMode::Content => "potential",
        };
        self.sink
            .info(&format!("Found {} {} file(s)", candidates.len(), noun));

        let workers = config.workers();
        if workers == 1 {
            self.sink.info("Running single-threaded");
        } else {
            self.sink.info(&format!("Running with {workers} workers"));
        }

        let mut summary = ScanSummary {
            candidates: candidates.len(),
            ..ScanSummary::default()
        };

        let walker = Arc::new(
            ArchiveWalker::new(detector, self.sink.clone()).with_cancellation(self.cancel.clone()),
        );
        let semaphore = Arc::new(Semaphore::new(workers));
        let runtime = Handle::current();
        let mut handles = Vec::with_capacity(candidates.len());

        for path in candidates {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => permit?,
            };
            let walker = walker.clone();
            let sink = self.sink.clone();
            let task_path = path.clone();
            let runtime = runtime.clone();

            // Reads and inflation block, so each walk runs on the blocking
            // pool and the runtime stays free to deliver cancellation.
            handles.push((
                path,
                task::spawn_blocking(move || {
                    let _permit = permit;
                    runtime.block_on(process_candidate(&walker, sink.as_ref(), &task_path))
                }),
            ));
        }

        for (path, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.sink
                        .error(&format!("error in zip: {} - {}", path.display(), e));
                    Outcome::Failed
                }
            };
            summary.record(outcome);
        }
        if self.cancel.is_cancelled() {
            summary.cancelled = true;
        }

        let mut line = format!(
            "Scanned {} file(s): {} walked, {} rejected, {} failed",
            summary.candidates, summary.walked, summary.rejected, summary.failed
        );
        if summary.cancelled {
            line.push_str(" (cancelled)");
        }
        self.sink.info(&line);

        Ok(summary)
    }
}

fn enumerate_candidates(config: &ScanConfig) -> Result<Vec<PathBuf>> {
    let pattern = FilePattern::new(&config.pattern)?;
    let excludes = ExcludeFilter::new(&config.excludes)?;

    let candidates = WalkDir::new(&config.folder)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping inaccessible path");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| pattern.matches(path))
        .filter(|path| {
            let excluded = excludes.is_excluded(path);
            if excluded {
                debug!(path = %path.display(), "excluded");
            }
            !excluded
        })
        .collect();

    Ok(candidates)
}

/// Walk one top-level file, turning any failure into a notification.
async fn process_candidate<D: ArchiveDetector>(
    walker: &ArchiveWalker<D>,
    sink: &dyn ScanSink,
    path: &Path,
) -> Outcome {
    if !walker.detector().qualifies(path).await {
        debug!(path = %path.display(), "no ZIP signature, skipped");
        return Outcome::Rejected;
    }

    match walker.check_archive(path).await {
        Ok(WalkStatus::Completed) => Outcome::Walked,
        Ok(WalkStatus::Cancelled) => Outcome::Cancelled,
        Err(e) => {
            sink.error(&format!("error in zip: {} - {:#}", path.display(), e));
            Outcome::Failed
        }
    }
}
