//! Deciding whether something is a ZIP archive.
//!
//! Two strategies exist: trusting the `.zip` extension, or reading the
//! local-file-header magic from the first four bytes. Sniffing is advisory:
//! any failure to read simply means "not an archive".

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::trace;

use crate::io::ReadAt;
use crate::zip::{LFH_SIGNATURE, ZipArchive, ZipFileEntry};

/// Number of leading bytes inspected by content detection
pub const SIGNATURE_LEN: usize = 4;

/// How archives are recognised, both on disk and inside other archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionMode {
    #[default]
    Extension,
    Content,
}

impl DetectionMode {
    /// Glob used to enumerate candidates when the user gives none
    pub fn default_pattern(self) -> &'static str {
        match self {
            DetectionMode::Extension => "*.zip",
            DetectionMode::Content => "*",
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionMode::Extension => f.write_str("by extension"),
            DetectionMode::Content => f.write_str("by content"),
        }
    }
}

/// True iff the last path segment ends in `.zip`, ignoring ASCII case.
///
/// Both `/` and `\` count as separators, so a directory marker such as
/// `old.zip/` has no extension.
pub fn is_zip_name(path: &str) -> bool {
    let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case("zip"),
        None => false,
    }
}

/// True iff `bytes` starts with the ZIP local-file-header magic `50 4B 03 04`.
pub fn is_zip_signature(bytes: &[u8]) -> bool {
    bytes.len() >= SIGNATURE_LEN && &bytes[..SIGNATURE_LEN] == LFH_SIGNATURE
}

/// Read up to four bytes of a physical file and compare them to the magic.
///
/// Missing files, permission errors and short files all yield `false`.
pub async fn sniff_file(path: &Path) -> bool {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            trace!(path = %path.display(), error = %e, "sniff: open failed");
            return false;
        }
    };

    let mut buf = [0u8; SIGNATURE_LEN];
    let mut filled = 0;
    while filled < SIGNATURE_LEN {
        match file.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "sniff: read failed");
                return false;
            }
        }
    }

    is_zip_signature(&buf[..filled])
}

/// Read the first four decoded bytes of an entry and compare them to the magic.
pub async fn sniff_entry<R: ReadAt>(archive: &ZipArchive<R>, entry: &ZipFileEntry) -> bool {
    match archive.read_entry_prefix(entry, SIGNATURE_LEN).await {
        Ok(prefix) => is_zip_signature(&prefix),
        Err(e) => {
            trace!(entry = %entry.file_name, error = %e, "sniff: entry unreadable");
            false
        }
    }
}

/// Classification strategy injected into the walker and the scanner.
#[async_trait]
pub trait ArchiveDetector: Send + Sync + 'static {
    fn mode(&self) -> DetectionMode;

    /// Whether a top-level candidate should be handed to the walker at all
    async fn qualifies(&self, path: &Path) -> bool;

    /// Whether an entry inside an open archive is itself an archive
    async fn is_nested_archive<R: ReadAt>(
        &self,
        archive: &ZipArchive<R>,
        entry: &ZipFileEntry,
    ) -> bool;
}

/// Trusts the file name. Every enumerated candidate qualifies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByExtension;

#[async_trait]
impl ArchiveDetector for ByExtension {
    fn mode(&self) -> DetectionMode {
        DetectionMode::Extension
    }

    async fn qualifies(&self, _path: &Path) -> bool {
        true
    }

    async fn is_nested_archive<R: ReadAt>(
        &self,
        _archive: &ZipArchive<R>,
        entry: &ZipFileEntry,
    ) -> bool {
        is_zip_name(&entry.file_name)
    }
}

/// Ignores names and looks at the leading bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByContent;

#[async_trait]
impl ArchiveDetector for ByContent {
    fn mode(&self) -> DetectionMode {
        DetectionMode::Content
    }

    async fn qualifies(&self, path: &Path) -> bool {
        sniff_file(path).await
    }

    async fn is_nested_archive<R: ReadAt>(
        &self,
        archive: &ZipArchive<R>,
        entry: &ZipFileEntry,
    ) -> bool {
        // Directory markers carry no data worth reading
        if entry.is_directory() {
            return false;
        }
        sniff_entry(archive, entry).await
    }
}
