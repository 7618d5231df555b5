mod common;

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use common::{ZipBuilder, two_level_fixture};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use zipwalk::{DetectionMode, MemorySink, ScanConfig, ScanSink, ScanSummary, Scanner};

fn config(folder: &Path, mode: DetectionMode) -> ScanConfig {
    ScanConfig::new(folder.canonicalize().unwrap(), mode)
}

async fn scan(config: ScanConfig) -> (ScanSummary, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let summary = Scanner::new(config, sink.clone()).scan().await.unwrap();
    (summary, sink)
}

/// Archive1.zip and Archive2.zip side by side, Archive2 also holding a copy of Archive1
fn fixture_folder() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    ZipBuilder::new()
        .file("Program.cs", b"class Program {}")
        .write_to(dir.path(), "Archive1.zip");
    two_level_fixture().write_to(dir.path(), "Archive2.zip");
    ZipBuilder::new()
        .dir("deep/")
        .file("deep/file.txt", b"d")
        .write_to(dir.path(), "sub/Nested.ZIP");
    std::fs::write(dir.path().join("notes.txt"), b"not an archive").unwrap();
    dir
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lists_every_archive_under_the_folder() {
    let dir = fixture_folder();
    let root = dir.path().canonicalize().unwrap();
    let (summary, sink) = scan(config(dir.path(), DetectionMode::Extension)).await;

    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.walked, 3);
    assert_eq!(summary.failed, 0);
    assert!(sink.infos().contains(&"Found 3 zip file(s)".to_string()));

    let files: BTreeSet<String> = sink.files().into_iter().collect();
    let expected: BTreeSet<String> = [
        "Archive1.zip/Program.cs",
        "Archive2.zip/readme.txt",
        "Archive2.zip/Archive1.zip/Program.cs",
        "Archive2.zip/Archive1.zip/Properties/AssemblyInfo.cs",
    ]
    .iter()
    .map(|rel| format!("{}/{}", root.display(), rel))
    .chain(std::iter::once(format!(
        "{}/deep/file.txt",
        root.join("sub").join("Nested.ZIP").display()
    )))
    .collect();
    assert_eq!(files, expected);
}

#[tokio::test]
async fn exclude_drops_only_the_top_level_archive() {
    let dir = tempfile::tempdir().unwrap();
    ZipBuilder::new()
        .file("Program.cs", b"x")
        .write_to(dir.path(), "Archive1.zip");
    two_level_fixture().write_to(dir.path(), "Archive2.zip");
    let root = dir.path().canonicalize().unwrap();

    let mut config = config(dir.path(), DetectionMode::Extension);
    config.excludes = vec!["Archive1.zip".to_string()];
    let (summary, sink) = scan(config).await;

    assert_eq!(summary.candidates, 1);
    assert!(sink.infos().contains(&"Found 1 zip file(s)".to_string()));
    let top_level_archive1 = format!("{}/Archive1.zip/", root.display());
    assert!(sink.files().iter().all(|f| !f.starts_with(&top_level_archive1)));
    assert!(
        sink.files()
            .iter()
            .any(|f| f.ends_with("Archive2.zip/Archive1.zip/Program.cs"))
    );
}

#[tokio::test]
async fn glob_excludes_match_the_whole_path() {
    let dir = fixture_folder();
    let mut config = config(dir.path(), DetectionMode::Extension);
    config.excludes = vec!["*/SUB/*".to_string(), "archive2".to_string()];
    let (summary, sink) = scan(config).await;

    assert_eq!(summary.candidates, 1);
    assert_eq!(sink.files().len(), 1);
    assert!(sink.files()[0].ends_with("Archive1.zip/Program.cs"));
}

#[tokio::test]
async fn empty_folder_finds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (summary, sink) = scan(config(dir.path(), DetectionMode::Extension)).await;

    assert_eq!(summary, ScanSummary::default());
    assert!(sink.files().is_empty());
    assert!(sink.errors().is_empty());
    assert!(sink.infos().contains(&"Found 0 zip file(s)".to_string()));
}

#[tokio::test]
async fn broken_top_level_archive_is_reported_and_skipped() {
    let dir = fixture_folder();
    let broken = dir.path().join("Broken.zip");
    std::fs::write(&broken, b"PK\x03\x04 but nothing else").unwrap();

    let (summary, sink) = scan(config(dir.path(), DetectionMode::Extension)).await;

    assert_eq!(summary.candidates, 4);
    assert_eq!(summary.walked, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(sink.files().len(), 5);

    let errors = sink.errors();
    assert_eq!(errors.len(), 1);
    let broken = broken.canonicalize().unwrap();
    assert!(errors[0].starts_with(&format!("error in zip: {} - ", broken.display())));
}

#[tokio::test]
async fn content_mode_sniffs_every_file() {
    let dir = tempfile::tempdir().unwrap();
    ZipBuilder::new()
        .file("inside.txt", b"i")
        .write_to(dir.path(), "renamed.dat");
    std::fs::write(dir.path().join("fake.zip"), b"plain text").unwrap();
    std::fs::write(dir.path().join("empty"), b"").unwrap();
    let root = dir.path().canonicalize().unwrap();

    let (summary, sink) = scan(config(dir.path(), DetectionMode::Content)).await;

    assert_eq!(summary.candidates, 3);
    assert_eq!(summary.walked, 1);
    assert_eq!(summary.rejected, 2);
    assert!(sink.infos().contains(&"Found 3 potential file(s)".to_string()));
    assert_eq!(
        sink.files(),
        vec![format!("{}/renamed.dat/inside.txt", root.display())]
    );
    assert!(sink.errors().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn thread_mode_does_not_change_the_result_set() {
    let dir = fixture_folder();
    for i in 0..8 {
        ZipBuilder::new()
            .file(&format!("file{i}.txt"), b"x")
            .write_to(dir.path(), &format!("batch/archive{i}.zip"));
    }

    let mut single = config(dir.path(), DetectionMode::Extension);
    single.single_thread = true;
    let (single_summary, single_sink) = scan(single.clone()).await;

    let mut multi = single;
    multi.single_thread = false;
    let (multi_summary, multi_sink) = scan(multi).await;

    assert_eq!(single_summary, multi_summary);
    assert!(single_sink.infos().contains(&"Running single-threaded".to_string()));

    let single_files: BTreeSet<_> = single_sink.files().into_iter().collect();
    let multi_files: BTreeSet<_> = multi_sink.files().into_iter().collect();
    assert_eq!(single_files.len(), 13);
    assert_eq!(single_files, multi_files);
}

#[tokio::test]
async fn single_thread_output_follows_archive_order() {
    let dir = fixture_folder();
    let mut config = config(dir.path(), DetectionMode::Extension);
    config.single_thread = true;
    let (_, sink) = scan(config).await;

    let files = sink.files();
    let program = files
        .iter()
        .position(|f| f.ends_with("Archive2.zip/Archive1.zip/Program.cs"))
        .unwrap();
    let info = files
        .iter()
        .position(|f| f.ends_with("Archive2.zip/Archive1.zip/Properties/AssemblyInfo.cs"))
        .unwrap();
    assert_eq!(info, program + 1);
}

#[tokio::test]
async fn cancelled_scan_processes_nothing() {
    let dir = fixture_folder();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let sink = Arc::new(MemorySink::new());
    let summary = Scanner::new(config(dir.path(), DetectionMode::Extension), sink.clone())
        .with_cancellation(cancel)
        .scan()
        .await
        .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.walked, 0);
    assert!(sink.files().is_empty());
}

/// Records like `MemorySink` and signals every listed file
struct SignallingSink {
    inner: MemorySink,
    listed: Arc<Notify>,
}

impl ScanSink for SignallingSink {
    fn file(&self, path: &str) {
        self.inner.file(path);
        self.listed.notify_one();
    }

    fn info(&self, message: &str) {
        self.inner.info(message);
    }

    fn error(&self, message: &str) {
        self.inner.error(message);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn cancellation_reaches_a_running_walk() {
    const ENTRIES: usize = 60_000;

    let dir = tempfile::tempdir().unwrap();
    let mut builder = ZipBuilder::new();
    for i in 0..ENTRIES {
        builder = builder.file(&format!("entry{i}.txt"), b"x");
    }
    builder.write_to(dir.path(), "big.zip");

    let listed = Arc::new(Notify::new());
    let sink = Arc::new(SignallingSink {
        inner: MemorySink::new(),
        listed: listed.clone(),
    });
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    let canceller = tokio::spawn(async move {
        listed.notified().await;
        trigger.cancel();
    });

    let summary = Scanner::new(config(dir.path(), DetectionMode::Content), sink.clone())
        .with_cancellation(cancel)
        .scan()
        .await
        .unwrap();
    canceller.await.unwrap();

    assert!(summary.cancelled);
    assert!(!sink.inner.files().is_empty());
    assert!(sink.inner.files().len() < ENTRIES);
}

#[tokio::test]
async fn invalid_pattern_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), DetectionMode::Extension);
    config.pattern = "[".to_string();

    let sink = Arc::new(MemorySink::new());
    assert!(Scanner::new(config, sink).scan().await.is_err());
}
