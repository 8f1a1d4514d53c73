use crate::config::SessionConfig;
use crate::frontend::{self, Screen, Viewport};
use crate::session::{Effect, Message, Session};
use anyhow::{Context as AnyhowContext, Result};
use dotenv_document::Parsed;
use dotenv_watcher::{FileWatcher, WatchEvent};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Run the interactive session until the user quits.
pub async fn run(config: SessionConfig, parsed: Parsed) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut session = Session::new(config.path.clone(), parsed, config.status_ttl);

    let watcher = if config.watch {
        match FileWatcher::start(&config.path, config.watcher, tx.clone(), into_message) {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                session.watch_unavailable(&err.to_string());
                None
            }
        }
    } else {
        session.disable_watch();
        None
    };

    let screen = Screen::open().context("failed to prepare the terminal")?;
    let resume_tx = spawn_input_reader(&screen, tx.clone());
    let mut executor = Executor {
        path: config.path.clone(),
        inbox: tx,
        saves: Vec::new(),
    };
    let mut viewport = Viewport::default();
    let mut reader_parked = false;

    info!("session started for {}", config.path.display());
    loop {
        let (rows, cols) = screen.size();
        session.set_page(Viewport::list_height(rows));
        screen
            .draw(&frontend::frame(&session, &mut viewport, rows, cols))
            .context("failed to draw")?;

        let Some(message) = rx.recv().await else {
            break;
        };
        if matches!(message, Message::Key(_)) {
            reader_parked = true;
        }

        let mut quit = false;
        for effect in session.update(message) {
            quit |= executor.run(effect);
        }
        if quit {
            break;
        }

        // Keep the reader parked while nothing may read the terminal, so
        // exit never happens with a raw-mode read outstanding.
        if reader_parked && !session.is_saving_for_exit() {
            reader_parked = false;
            if resume_tx.send(()).is_err() {
                debug!("input reader already gone");
            }
        }
    }

    if let Some(watcher) = watcher {
        watcher.stop();
    }
    executor.finish().await;
    drop(screen);
    info!("session ended");
    Ok(())
}

fn into_message(event: WatchEvent) -> Message {
    match event {
        WatchEvent::Changed => Message::ExternalChange,
        WatchEvent::Error(reason) => Message::WatchFailed(reason),
    }
}

/// Read keys on a dedicated thread: `read_key` blocks and must not hold a
/// runtime worker. After each key the thread waits for a resume signal.
fn spawn_input_reader(
    screen: &Screen,
    inbox: mpsc::UnboundedSender<Message>,
) -> std_mpsc::Sender<()> {
    let term = screen.term().clone();
    let (resume_tx, resume_rx) = std_mpsc::channel::<()>();
    thread::spawn(move || loop {
        let Some(key) = frontend::read_key(&term) else {
            let _ = inbox.send(Message::InputClosed);
            break;
        };
        if inbox.send(Message::Key(key)).is_err() || resume_rx.recv().is_err() {
            break;
        }
    });
    resume_tx
}

/// Carries out effects as tasks that report back through the inbox.
struct Executor {
    path: PathBuf,
    inbox: mpsc::UnboundedSender<Message>,
    saves: Vec<JoinHandle<()>>,
}

impl Executor {
    /// Returns `true` when the session asked to quit.
    fn run(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::Save { revision, text } => {
                self.saves.retain(|handle| !handle.is_finished());
                let path = self.path.clone();
                let inbox = self.inbox.clone();
                self.saves.push(tokio::spawn(async move {
                    let result = dotenv_document::save(&path, &text).await;
                    let _ = inbox.send(Message::Saved {
                        revision,
                        text,
                        result,
                    });
                }));
            }
            Effect::Reload => {
                let path = self.path.clone();
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let result = dotenv_document::load(&path).await;
                    let _ = inbox.send(Message::Reloaded(result));
                });
            }
            Effect::InspectExternal => {
                let path = self.path.clone();
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    let result = dotenv_document::read_text(&path).await;
                    let _ = inbox.send(Message::ExternalText(result));
                });
            }
            Effect::Copy(text) => {
                let inbox = self.inbox.clone();
                tokio::task::spawn_blocking(move || {
                    let _ = inbox.send(Message::Copied(frontend::copy_text(&text)));
                });
            }
            Effect::ClearStatusLater { id, after } => {
                let inbox = self.inbox.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = inbox.send(Message::ClearStatus(id));
                });
            }
            Effect::Quit => return true,
        }
        false
    }

    /// Let in-flight writes land before the process exits.
    async fn finish(self) {
        for handle in self.saves {
            if let Err(err) = handle.await {
                warn!("save task failed: {err}");
            }
        }
    }
}
