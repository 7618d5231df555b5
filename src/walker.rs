//! Recursive listing of archives inside archives.
//!
//! A root archive is opened from disk. Every entry is classified by the
//! injected [`ArchiveDetector`]: nested archives are decoded into memory and
//! walked depth-first, plain files are emitted, directory markers are
//! skipped. A broken nested archive is reported once and its siblings are
//! still listed.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::detect::ArchiveDetector;
use crate::io::{LocalFileReader, MemoryReader, ReadAt};
use crate::path::{build_display_path, join_container};
use crate::sink::ScanSink;
use crate::zip::{ZipArchive, ZipFileEntry};

/// How a walk ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStatus {
    Completed,
    Cancelled,
}

type WalkFuture<'a> = Pin<Box<dyn Future<Output = WalkStatus> + Send + 'a>>;

/// Lists the files of one archive tree.
///
/// Holds no per-walk state, so one walker can serve many workers at once.
pub struct ArchiveWalker<D: ArchiveDetector> {
    detector: D,
    sink: Arc<dyn ScanSink>,
    cancel: CancellationToken,
}

impl<D: ArchiveDetector> ArchiveWalker<D> {
    pub fn new(detector: D, sink: Arc<dyn ScanSink>) -> Self {
        Self {
            detector,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop walking once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Emit every file inside the archive at `path`.
    ///
    /// # Errors
    ///
    /// Only failures to open the root archive itself are returned; problems
    /// below it are reported through the sink.
    pub async fn check_archive(&self, path: &Path) -> Result<WalkStatus> {
        let archive = ZipArchive::open(LocalFileReader::new(path)?).await?;
        debug!(
            path = %path.display(),
            entries = archive.entries().len(),
            "walking archive"
        );
        let container = path.to_string_lossy();
        Ok(self.walk(&container, &archive).await)
    }

    /// Walk one open archive, recursing into nested ones.
    ///
    /// Boxed so the recursion has a finite future type.
    fn walk<'a, R: ReadAt + 'static>(
        &'a self,
        container: &'a str,
        archive: &'a ZipArchive<R>,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            for entry in archive.entries() {
                if self.cancel.is_cancelled() {
                    debug!(container, "walk cancelled");
                    return WalkStatus::Cancelled;
                }

                if entry.file_name.is_empty() {
                    continue;
                }

                if self.detector.is_nested_archive(archive, entry).await {
                    let nested_container = join_container(container, &entry.file_name);
                    if self.walk_nested(&nested_container, archive, entry).await
                        == WalkStatus::Cancelled
                    {
                        return WalkStatus::Cancelled;
                    }
                } else if !entry.is_directory() {
                    self.sink
                        .file(&build_display_path(container, &entry.file_name));
                }
            }
            WalkStatus::Completed
        })
    }

    /// Decode a nested archive and walk it, reporting any failure.
    ///
    /// The in-memory archive is dropped before this returns, whatever the
    /// outcome, so only one branch of buffers is alive at a time.
    async fn walk_nested<R: ReadAt + 'static>(
        &self,
        nested_container: &str,
        parent: &ZipArchive<R>,
        entry: &ZipFileEntry,
    ) -> WalkStatus {
        match open_nested(parent, entry).await {
            Ok(nested) => {
                debug!(container = nested_container, "entering nested archive");
                self.walk(nested_container, &nested).await
            }
            Err(e) => {
                self.sink
                    .error(&format!("error in nested zip: {nested_container} - {e:#}"));
                WalkStatus::Completed
            }
        }
    }
}

async fn open_nested<R: ReadAt>(
    parent: &ZipArchive<R>,
    entry: &ZipFileEntry,
) -> Result<ZipArchive<MemoryReader>> {
    let data = parent.read_entry(entry).await?;
    ZipArchive::open(MemoryReader::new(data)).await
}
