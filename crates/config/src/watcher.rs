use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Watches the settings file and sends a notification whenever it is written,
/// created or replaced.
///
/// The parent directory is watched rather than the file itself: settings
/// dialogs usually save by writing a temp file and renaming it over the
/// original, and the file may not exist yet when the overlay starts.
///
/// # Example
/// ```no_run
/// # async fn demo() {
/// let (_watcher, mut rx) = taskmon_config::ConfigWatcher::spawn(taskmon_config::default_path());
/// while rx.recv().await.is_some() {
///     println!("settings changed, reloading");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path` on the current Tokio runtime.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;

    let Some(dir) = path.parent().map(Path::to_path_buf) else {
        error!("Settings path '{}' has no parent directory", path.display());
        return;
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("Cannot create '{}': {e}", dir.display());
    }

    let (sync_tx, mut sync_rx) = mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            // Runs on notify's own thread; only forwards the event.
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch '{}': {e}", dir.display());
        return;
    }

    info!("Watching settings file: {}", path.display());

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) if is_settings_write(&e, &path) => {
                debug!("Settings change detected: {:?}", e.kind);
                // A full channel already holds a pending reload; drop the extra.
                if let Err(mpsc::error::TrySendError::Closed(())) = tx.try_send(()) {
                    break; // receiver dropped
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}

/// `true` for modify/create events that touch `path`.
fn is_settings_write(event: &notify::Event, path: &Path) -> bool {
    use notify::EventKind::{Create, Modify};

    matches!(event.kind, Modify(_) | Create(_))
        && event.paths.iter().any(|p| p.file_name() == path.file_name())
}
