use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Watch the database file's directory. The watcher must be kept alive for
/// events to arrive.
pub fn watch_db(db_path: &str) -> Result<(RecommendedWatcher, Receiver<()>)> {
    let (tx, rx) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if res.is_ok_and(|event| touches_db(&event)) {
            let _ = tx.send(());
        }
    })
    .context("failed to create file watcher")?;

    // SQLite writes through -wal and -journal siblings, so watch the directory.
    let path = Path::new(db_path);
    let watch_path = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    watcher
        .watch(watch_path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", watch_path.display()))?;

    Ok((watcher, rx))
}

/// Whether the event is about files we care about, i.e. not our own log.
fn touches_db(event: &Event) -> bool {
    event.paths.is_empty()
        || event
            .paths
            .iter()
            .any(|p| p.extension().map_or(true, |ext| ext != "log"))
}

/// True if a change arrived within `timeout`.
pub fn wait_for_change(rx: &Receiver<()>, timeout: Duration) -> bool {
    rx.recv_timeout(timeout).is_ok()
}

pub fn drain_events(rx: &Receiver<()>) {
    while rx.try_recv().is_ok() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn log_file_events_are_ignored() {
        let mut event = Event::new(notify::EventKind::Any);
        event.paths.push(PathBuf::from("/data/tui.log"));
        assert!(!touches_db(&event));
        event.paths.push(PathBuf::from("/data/taskboard.db-wal"));
        assert!(touches_db(&event));
    }

    #[test]
    fn write_to_db_directory_is_seen() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("taskboard.db");
        let (_watcher, rx) = watch_db(db.to_str().unwrap()).unwrap();
        std::fs::write(&db, b"x").unwrap();
        assert!(wait_for_change(&rx, Duration::from_secs(5)));
        drain_events(&rx);
    }
}
