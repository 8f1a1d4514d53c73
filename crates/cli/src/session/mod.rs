//! Change-reconciliation state machine.
//!
//! ```text
//! input thread ─┐
//! watch task  ──┼──> inbox ──> Session::update ──> Vec<Effect> ──> runtime
//! I/O tasks   ──┤                   │                                │
//! timers      ──┘                   └── state read by the view       │
//!        ^                                                           │
//!        └────────────────── results as Message ─────────────────────┘
//! ```
//!
//! `update` never performs I/O, so every transition is testable by feeding
//! messages and inspecting the returned effects.

mod keymap;
mod message;

pub use keymap::{bind, Answer, Input, KeyPress, Mode};
pub use message::{Effect, Message};

use dotenv_document::{
    parse, render, rows, BackupOutcome, Document, DocumentError, Parsed, Row, SaveReport,
};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: u64,
    pub kind: StatusKind,
    pub text: String,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    document: Document,
    rows: Vec<Row>,
    cursor: usize,
    page: usize,
    revision: u64,
    saved_revision: u64,
    saving: Option<u64>,
    quit_after_save: bool,
    mode: Mode,
    /// External text that arrived while a save was in flight.
    deferred_external: Option<String>,
    last_written: Option<String>,
    status: Option<Status>,
    status_seq: u64,
    status_ttl: Duration,
    watching: bool,
    quitting: bool,
}

impl Session {
    pub fn new(path: PathBuf, parsed: Parsed, status_ttl: Duration) -> Self {
        let mut session = Self {
            path,
            rows: rows(&parsed.document),
            document: parsed.document,
            cursor: 0,
            page: DEFAULT_PAGE,
            revision: 0,
            saved_revision: 0,
            saving: None,
            quit_after_save: false,
            mode: Mode::Browse,
            deferred_external: None,
            last_written: None,
            status: None,
            status_seq: 0,
            status_ttl,
            watching: true,
            quitting: false,
        };
        if let Some(text) = summarize_warnings(&parsed.warnings) {
            // Stays until the first keypress.
            session.set_status(StatusKind::Warning, text);
        }
        session
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// A save-then-quit is in progress; keys are ignored until it reports.
    pub fn is_saving_for_exit(&self) -> bool {
        self.quit_after_save
    }

    pub fn disable_watch(&mut self) {
        self.watching = false;
    }

    /// Rows moved by PageUp/PageDown; the view sets it from the screen height.
    pub fn set_page(&mut self, rows: usize) {
        self.page = rows.max(1);
    }

    /// Hot reload could not be armed; the session keeps working without it.
    pub fn watch_unavailable(&mut self, reason: &str) {
        warn!("file watching unavailable: {reason}");
        self.watching = false;
        self.set_status(
            StatusKind::Warning,
            format!("File watching unavailable ({reason}); external edits will not be noticed"),
        );
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        if self.quitting {
            return Vec::new();
        }
        match message {
            Message::Key(key) => self.on_key(key),
            Message::InputClosed => {
                if self.is_dirty() {
                    warn!("input closed with unsaved changes; discarding them");
                }
                self.quit()
            }
            Message::ExternalChange => {
                debug!("external change reported for {}", self.path.display());
                vec![Effect::InspectExternal]
            }
            Message::ExternalText(Ok(text)) => self.on_external_text(text),
            Message::ExternalText(Err(err)) => {
                self.set_status(StatusKind::Error, format!("Error reading changed file: {err}"))
            }
            Message::WatchFailed(reason) => {
                self.set_status(StatusKind::Error, format!("Watcher error: {reason}"))
            }
            Message::Saved {
                revision,
                text,
                result,
            } => self.on_saved(revision, text, result),
            Message::Reloaded(Ok(parsed)) => self.apply_parsed(parsed, "File reloaded successfully."),
            Message::Reloaded(Err(err)) => {
                warn!("reload of {} failed: {err}", self.path.display());
                self.set_status(StatusKind::Error, format!("Error: reload failed: {err}"))
            }
            Message::Copied(Ok(chars)) => {
                debug!("copied {chars} chars to clipboard");
                self.set_status(StatusKind::Info, "Copied to clipboard!")
            }
            Message::Copied(Err(err)) => {
                self.set_status(StatusKind::Error, format!("Error copying: {err}"))
            }
            Message::ClearStatus(id) => {
                if self.status.as_ref().is_some_and(|s| s.id == id) {
                    self.status = None;
                }
                Vec::new()
            }
        }
    }

    fn on_key(&mut self, key: KeyPress) -> Vec<Effect> {
        if self.quit_after_save {
            // Saving before exit; nothing may change the document now.
            return Vec::new();
        }
        self.status = None;
        match bind(key, self.mode) {
            Some(input) => self.on_input(input),
            None => Vec::new(),
        }
    }

    fn on_input(&mut self, input: Input) -> Vec<Effect> {
        let last = self.rows.len().saturating_sub(1);
        match input {
            Input::MoveUp => self.cursor = self.cursor.saturating_sub(1),
            Input::MoveDown => self.cursor = (self.cursor + 1).min(last),
            Input::Top => self.cursor = 0,
            Input::Bottom => self.cursor = last,
            Input::PageUp => self.cursor = self.cursor.saturating_sub(self.page),
            Input::PageDown => self.cursor = (self.cursor + self.page).min(last),
            Input::Activate => self.activate(),
            Input::Save => return self.request_save(),
            Input::Reload => return self.request_reload(),
            Input::Copy => return self.copy_current(),
            Input::Quit => return self.request_quit(),
            Input::Answer(answer) => return self.on_answer(answer),
        }
        Vec::new()
    }

    fn on_answer(&mut self, answer: Answer) -> Vec<Effect> {
        self.mode = Mode::Browse;
        match answer {
            Answer::SaveAndQuit => {
                self.quit_after_save = true;
                if self.saving.is_some() {
                    // The in-flight save finishes first; on_saved picks up from there.
                    return self.set_status(StatusKind::Info, "Saving...");
                }
                self.start_save()
            }
            Answer::DiscardAndQuit => self.quit(),
            Answer::CancelQuit => Vec::new(),
            Answer::ReloadFromDisk => {
                self.deferred_external = None;
                let mut effects = self.set_status(StatusKind::Info, "Reloading...");
                effects.push(Effect::Reload);
                effects
            }
            Answer::KeepEdits => {
                self.set_status(StatusKind::Info, "Kept local changes. File change ignored.")
            }
        }
    }

    fn activate(&mut self) {
        let Some(row) = self.rows.get(self.cursor) else {
            return;
        };
        let kind = row.kind;
        if self.document.activate(&kind) {
            self.revision += 1;
            self.rows = rows(&self.document);
        }
    }

    fn request_save(&mut self) -> Vec<Effect> {
        if self.saving.is_some() {
            return self.set_status(StatusKind::Warning, "Save already in progress.");
        }
        if !self.is_dirty() {
            return self.set_status(StatusKind::Info, "No changes to save.");
        }
        self.start_save()
    }

    fn start_save(&mut self) -> Vec<Effect> {
        self.saving = Some(self.revision);
        let text = render(&self.document);
        let mut effects = self.set_status(StatusKind::Info, "Saving...");
        effects.push(Effect::Save {
            revision: self.revision,
            text,
        });
        effects
    }

    fn request_reload(&mut self) -> Vec<Effect> {
        if self.is_dirty() {
            self.mode = Mode::ReloadPrompt;
            return Vec::new();
        }
        let mut effects = self.set_status(StatusKind::Info, "Reloading...");
        effects.push(Effect::Reload);
        effects
    }

    fn copy_current(&mut self) -> Vec<Effect> {
        let text = self
            .rows
            .get(self.cursor)
            .and_then(|row| self.document.row_text(&row.kind))
            .unwrap_or_default();
        if text.is_empty() {
            return self.set_status(StatusKind::Warning, "The selected line is empty.");
        }
        vec![Effect::Copy(text)]
    }

    fn request_quit(&mut self) -> Vec<Effect> {
        if self.is_dirty() {
            self.mode = Mode::QuitPrompt;
            return Vec::new();
        }
        self.quit()
    }

    fn quit(&mut self) -> Vec<Effect> {
        self.quitting = true;
        vec![Effect::Quit]
    }

    fn on_saved(
        &mut self,
        revision: u64,
        text: String,
        result: Result<SaveReport, DocumentError>,
    ) -> Vec<Effect> {
        self.saving = None;
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                warn!("save of {} failed: {err}", self.path.display());
                self.quit_after_save = false;
                let mut effects = self.set_status(StatusKind::Error, format!("Error: {err}"));
                // Nothing was written, so held-back text cannot be our own echo.
                if let Some(text) = self.deferred_external.take() {
                    effects.extend(self.on_external_text(text));
                }
                return effects;
            }
        };

        self.last_written = Some(text);
        if revision == self.revision {
            let rewritten = self.document.commit_render();
            self.saved_revision = revision;
            debug!("save committed {rewritten} line(s) at revision {revision}");
        }

        if self.quit_after_save {
            if self.is_dirty() {
                return self.start_save();
            }
            self.quit_after_save = false;
            return self.quit();
        }

        let mut effects = match &report.backup {
            BackupOutcome::Failed(reason) => self.set_status(
                StatusKind::Warning,
                format!("Saved, but backup failed: {reason}"),
            ),
            _ if self.is_dirty() => {
                self.set_status(StatusKind::Info, "Saved; newer edits are not saved yet.")
            }
            _ => self.set_status(StatusKind::Info, "Saved successfully!"),
        };
        if let Some(text) = self.deferred_external.take() {
            effects.extend(self.on_external_text(text));
        }
        effects
    }

    fn on_external_text(&mut self, text: String) -> Vec<Effect> {
        if self.saving.is_some() {
            // Can't tell our own write from a foreign one until the save reports.
            self.deferred_external = Some(text);
            return Vec::new();
        }
        if self.last_written.as_deref() == Some(text.as_str()) {
            debug!("ignoring echo of our own write to {}", self.path.display());
            return Vec::new();
        }

        match self.mode {
            Mode::QuitPrompt => {
                self.set_status(StatusKind::Warning, "File changed on disk.")
            }
            Mode::ReloadPrompt => Vec::new(),
            Mode::Browse if self.is_dirty() => {
                self.mode = Mode::ReloadPrompt;
                Vec::new()
            }
            Mode::Browse => match parse(&text) {
                Ok(parsed) => self.apply_parsed(parsed, "File changed on disk, reloaded."),
                Err(err) => {
                    warn!("external edit to {} does not parse: {err}", self.path.display());
                    self.set_status(
                        StatusKind::Error,
                        format!("Error: file changed on disk but cannot be parsed: {err}"),
                    )
                }
            },
        }
    }

    fn apply_parsed(&mut self, parsed: Parsed, note: &str) -> Vec<Effect> {
        self.document = parsed.document;
        self.rows = rows(&self.document);
        self.revision += 1;
        self.saved_revision = self.revision;
        self.last_written = None;
        self.mode = Mode::Browse;
        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
        info!("reloaded {}", self.path.display());

        match summarize_warnings(&parsed.warnings) {
            Some(text) => self.set_status(StatusKind::Warning, text),
            None => self.set_status(StatusKind::Info, note),
        }
    }

    /// Replace the status line. Info messages schedule their own removal.
    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) -> Vec<Effect> {
        self.status_seq += 1;
        let id = self.status_seq;
        self.status = Some(Status {
            id,
            kind,
            text: text.into(),
        });
        if kind == StatusKind::Info {
            vec![Effect::ClearStatusLater {
                id,
                after: self.status_ttl,
            }]
        } else {
            Vec::new()
        }
    }
}

fn summarize_warnings(warnings: &[dotenv_document::ParseWarning]) -> Option<String> {
    for warning in warnings {
        warn!("{warning}");
    }
    match warnings {
        [] => None,
        [only] => Some(format!("Warning: {only}")),
        [first, rest @ ..] => Some(format!("Warning: {first} (+{} more)", rest.len())),
    }
}
