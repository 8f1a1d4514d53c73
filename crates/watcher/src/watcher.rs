use crate::{Result, WatchError};
use log::{debug, info, warn};
use notify::event::ModifyKind;
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Message delivered to the caller's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The file was written and activity has settled.
    Changed,
    /// The watch backend reported an error; the watch stays armed.
    Error(String),
}

#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Quiet period after the most recent event before `Changed` fires.
    pub debounce: Duration,
    pub notify_poll_interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            notify_poll_interval: Duration::from_secs(2),
        }
    }
}

enum WatcherCommand {
    Shutdown,
}

/// Handle to the background watch task.
///
/// Dropping the handle (or calling [`FileWatcher::stop`]) shuts the task down
/// and releases the OS watch.
pub struct FileWatcher {
    target: PathBuf,
    command_tx: mpsc::Sender<WatcherCommand>,
    stopped: bool,
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Start watching `path`. Must be called from within a tokio runtime.
    ///
    /// Every settled change is wrapped with `wrap` and sent to `inbox`.
    pub fn start<T, F>(
        path: &Path,
        config: WatcherConfig,
        inbox: mpsc::UnboundedSender<T>,
        wrap: F,
    ) -> Result<Self>
    where
        T: Send + 'static,
        F: Fn(WatchEvent) -> T + Send + 'static,
    {
        let target = resolve_target(path)?;
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| WatchError::InvalidPath(target.display().to_string()))?;

        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(4);
        let watcher = create_fs_watcher(&dir, event_tx, config.notify_poll_interval)?;

        spawn_watch_loop(target.clone(), config.debounce, event_rx, command_rx, inbox, wrap);
        info!(
            "watching {} (debounce {}ms)",
            target.display(),
            config.debounce.as_millis()
        );

        Ok(Self {
            target,
            command_tx,
            stopped: false,
            _watcher: watcher,
        })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Cancel the watch task.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        let _ = self.command_tx.try_send(WatcherCommand::Shutdown);
        debug!("watch on {} cancelled", self.target.display());
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Absolute, symlink-free path of the target, so it compares equal to the
/// paths notify reports for the watched directory.
fn resolve_target(path: &Path) -> Result<PathBuf> {
    let canonical = path.canonicalize()?;
    if canonical.file_name().is_none() {
        return Err(WatchError::InvalidPath(path.display().to_string()));
    }
    Ok(canonical)
}

fn create_fs_watcher(
    dir: &Path,
    sender: mpsc::Sender<notify::Result<Event>>,
    poll_interval: Duration,
) -> Result<RecommendedWatcher> {
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = sender.blocking_send(res);
        },
        NotifyConfig::default().with_poll_interval(poll_interval),
    )?;
    // The directory, not the file: rename-over saves replace the inode.
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn spawn_watch_loop<T, F>(
    target: PathBuf,
    debounce: Duration,
    mut event_rx: mpsc::Receiver<notify::Result<Event>>,
    mut command_rx: mpsc::Receiver<WatcherCommand>,
    inbox: mpsc::UnboundedSender<T>,
    wrap: F,
) where
    T: Send + 'static,
    F: Fn(WatchEvent) -> T + Send + 'static,
{
    tokio::spawn(async move {
        let mut state = DebounceState::new(debounce);

        loop {
            let next_deadline = state.next_deadline();

            tokio::select! {
                event = event_rx.recv() => {
                    match event {
                        Some(Ok(evt)) => {
                            if is_relevant_event(&target, &evt) {
                                state.record_event(Instant::now());
                            }
                        }
                        Some(Err(err)) => {
                            warn!("Watcher error: {err}");
                            if inbox.send(wrap(WatchEvent::Error(err.to_string()))).is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(WatcherCommand::Shutdown) | None => break,
                    }
                }
                () = async {
                    if let Some(deadline) = next_deadline {
                        time::sleep_until(deadline).await;
                    }
                }, if state.should_fire() && next_deadline.is_some() => {
                    debug!(
                        "{} settled after {} event(s)",
                        target.display(),
                        state.pending()
                    );
                    state.reset();
                    if inbox.send(wrap(WatchEvent::Changed)).is_err() {
                        break;
                    }
                }
            }
        }
        debug!("watch loop for {} stopped", target.display());
    });
}

fn is_relevant_event(target: &Path, event: &Event) -> bool {
    let kind_matches = match event.kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    };
    kind_matches && event.paths.iter().any(|p| is_target_path(target, p))
}

fn is_target_path(target: &Path, path: &Path) -> bool {
    if path == target {
        return true;
    }
    if path.file_name() != target.file_name() {
        return false;
    }
    path.parent()
        .and_then(|dir| dir.canonicalize().ok())
        .is_some_and(|dir| Some(dir.as_path()) == target.parent())
}

/// Trailing-edge debounce: the deadline moves with every new event.
struct DebounceState {
    debounce: Duration,
    pending: usize,
    last_event: Option<Instant>,
}

impl DebounceState {
    const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: 0,
            last_event: None,
        }
    }

    fn record_event(&mut self, now: Instant) {
        self.pending += 1;
        self.last_event = Some(now);
    }

    const fn pending(&self) -> usize {
        self.pending
    }

    const fn should_fire(&self) -> bool {
        self.last_event.is_some()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.last_event.map(|last| last + self.debounce)
    }

    fn reset(&mut self) {
        self.pending = 0;
        self.last_event = None;
    }
}
