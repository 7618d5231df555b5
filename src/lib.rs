//! # zipwalk
//!
//! Scan a folder tree for ZIP archives and list every file inside them,
//! including files stored in archives nested inside other archives, to any
//! depth.
//!
//! Each discovered file is reported as one line made of the physical
//! archive path followed by one `/`-joined segment per nesting level, for
//! example `/data/Archive2.zip/Archive1.zip/Program.cs`.
//!
//! ## Features
//!
//! - Archive detection by `.zip` extension or by the `PK\x03\x04` signature
//! - Nested archives decoded in memory, no temporary files
//! - ZIP64 and commented archives, STORED and DEFLATE entries
//! - Per-archive error isolation: one corrupted archive never stops a scan
//! - Concurrent processing of top-level archives
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use zipwalk::{DetectionMode, MemorySink, ScanConfig, Scanner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sink = Arc::new(MemorySink::new());
//!     let config = ScanConfig::new("/data", DetectionMode::Extension);
//!
//!     let summary = Scanner::new(config, sink.clone()).scan().await?;
//!     for file in sink.files() {
//!         println!("{file}");
//!     }
//!     println!("{} archive(s) failed", summary.failed);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod filter;
pub mod io;
pub mod logging;
pub mod path;
pub mod scanner;
pub mod sink;
pub mod walker;
pub mod zip;

pub use cli::Cli;
pub use config::ScanConfig;
pub use detect::{ArchiveDetector, ByContent, ByExtension, DetectionMode};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use scanner::{ScanSummary, Scanner};
pub use sink::{ConsoleSink, MemorySink, ScanEvent, ScanSink};
pub use walker::{ArchiveWalker, WalkStatus};
pub use zip::{ZipArchive, ZipFileEntry};
