//! Display paths for entries found inside (possibly nested) archives.

/// Join a container path and an entry name into the line shown to the user.
///
/// Some producers store entry names with `\` even though ZIP mandates `/`;
/// those are rewritten so every emitted segment after the container uses `/`.
/// The container itself is left untouched, it may be a native OS path.
pub fn build_display_path(container: &str, entry_name: &str) -> String {
    if entry_name.contains('\\') {
        format!("{}/{}", container, entry_name.replace('\\', "/"))
    } else {
        join_container(container, entry_name)
    }
}

/// Container name for an archive nested in `container`, using the raw entry name.
pub fn join_container(container: &str, entry_name: &str) -> String {
    format!("{container}/{entry_name}")
}
