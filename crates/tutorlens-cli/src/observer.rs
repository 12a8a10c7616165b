//! File-system observer feeding change notifications to the gate driver.

use core::time::Duration;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::fs as async_fs;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use tutorlens_watch::HostSignal;

/// Waits until `path` exists, checking every `retry_interval`.
///
/// There is no give-up state: a transcript that never appears keeps this
/// waiting until the caller drops the future.
pub async fn wait_for_target(path: &Path, retry_interval: Duration) {
    let mut attempts: u64 = 0;
    loop {
        if async_fs::try_exists(path).await.unwrap_or(false) {
            if attempts > 0 {
                info!(path = %path.display(), attempts, "transcript found");
            }
            return;
        }
        if attempts == 0 {
            info!(path = %path.display(), "waiting for transcript to appear");
        }
        attempts += 1;
        sleep(retry_interval).await;
    }
}

/// Directory to watch for `path` and the file name to filter events by.
fn watch_target(path: &Path) -> (PathBuf, Option<OsString>) {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (directory, path.file_name().map(ToOwned::to_owned))
}

/// Whether a file-system event concerns the watched transcript.
fn is_relevant(event: &Event, file_name: Option<&OsString>) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    ) {
        return false;
    }
    file_name.is_none_or(|name| {
        event
            .paths
            .iter()
            .any(|changed| changed.file_name() == Some(name.as_os_str()))
    })
}

/// Watches the transcript's directory and sends
/// [`HostSignal::ContentChanged`] for every event touching the transcript.
///
/// The parent directory is watched so that editors replacing the file are
/// still observed. The watcher stops when the returned value is dropped.
///
/// # Errors
/// Returns an error if the platform watcher cannot be created or attached
pub fn watch_transcript(
    path: &Path,
    signals: UnboundedSender<HostSignal>,
) -> notify::Result<RecommendedWatcher> {
    let (directory, file_name) = watch_target(path);

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if is_relevant(&event, file_name.as_ref())
                && signals.send(HostSignal::ContentChanged).is_err()
            {
                debug!("gate driver stopped; change notification dropped");
            }
        }
        Err(error) => warn!("file watcher error: {error}"),
    })?;
    watcher.watch(&directory, RecursiveMode::NonRecursive)?;
    debug!(directory = %directory.display(), "watching transcript directory");

    Ok(watcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;
    use tokio::time::timeout;

    #[test]
    fn test_watch_target_for_bare_file_name() {
        let (directory, name) = watch_target(Path::new("chat.jsonl"));
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(name, Some(OsString::from("chat.jsonl")));
    }

    #[test]
    fn test_event_filtering() {
        let name = Some(OsString::from("chat.jsonl"));
        let modify = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/session/chat.jsonl"));
        assert!(is_relevant(&modify, name.as_ref()));

        let other_file = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/session/other.jsonl"));
        assert!(!is_relevant(&other_file, name.as_ref()));

        let removal = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/tmp/session/chat.jsonl"));
        assert!(!is_relevant(&removal, name.as_ref()));
    }

    #[tokio::test]
    async fn test_existing_target_returns_immediately() {
        let temp = match TempDir::new() {
            Ok(temp) => temp,
            Err(error) => panic!("temp dir: {error}"),
        };
        let path = temp.path().join("chat.jsonl");
        if let Err(error) = fs::write(&path, "") {
            panic!("write failed: {error}");
        }
        let waited = timeout(
            Duration::from_secs(5),
            wait_for_target(&path, Duration::from_millis(10)),
        )
        .await;
        assert!(waited.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_target_keeps_waiting() {
        let temp = match TempDir::new() {
            Ok(temp) => temp,
            Err(error) => panic!("temp dir: {error}"),
        };
        let path = temp.path().join("never.jsonl");
        let waited = timeout(
            Duration::from_secs(30),
            wait_for_target(&path, Duration::from_secs(1)),
        )
        .await;
        assert!(waited.is_err());
    }
}
