//! Where discovered paths and notifications go.
//!
//! Every call produces exactly one line, so concurrent workers may share a
//! sink without their lines tearing into each other.

use std::io::Write;
use std::sync::Mutex;

/// Line-oriented output channel shared by all workers.
pub trait ScanSink: Send + Sync {
    /// A file discovered inside an archive
    fn file(&self, path: &str);

    /// Summary and banner lines; dropped in raw mode
    fn info(&self, message: &str);

    /// A per-archive or per-nested-archive failure
    fn error(&self, message: &str);
}

/// Prints to the terminal.
///
/// Files and info lines go to stdout, errors to stderr. In raw mode only
/// file and error lines are written, so stdout can be piped elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink {
    raw: bool,
}

impl ConsoleSink {
    pub fn new(raw: bool) -> Self {
        Self { raw }
    }
}

impl ScanSink for ConsoleSink {
    fn file(&self, path: &str) {
        // A closed pipe is not worth failing the scan over
        let _ = writeln!(std::io::stdout().lock(), "{path}");
    }

    fn info(&self, message: &str) {
        if !self.raw {
            let _ = writeln!(std::io::stdout().lock(), "{message}");
        }
    }

    fn error(&self, message: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{message}");
    }
}

/// One line captured by [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    File(String),
    Info(String),
    Error(String),
}

/// Collects every line in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ScanEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.lock().clone()
    }

    pub fn files(&self) -> Vec<String> {
        self.collect(|e| match e {
            ScanEvent::File(s) => Some(s),
            _ => None,
        })
    }

    pub fn infos(&self) -> Vec<String> {
        self.collect(|e| match e {
            ScanEvent::Info(s) => Some(s),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(|e| match e {
            ScanEvent::Error(s) => Some(s),
            _ => None,
        })
    }

    fn collect(&self, pick: impl Fn(&ScanEvent) -> Option<&String>) -> Vec<String> {
        self.lock().iter().filter_map(pick).cloned().collect()
    }

    fn push(&self, event: ScanEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ScanEvent>> {
        // A panicking writer cannot leave a Vec half-pushed
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ScanSink for MemorySink {
    fn file(&self, path: &str) {
        self.push(ScanEvent::File(path.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(ScanEvent::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(ScanEvent::Error(message.to_string()));
    }
}
