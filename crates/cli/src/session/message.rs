use super::keymap::KeyPress;
use dotenv_document::{DocumentError, Parsed, SaveReport};
use std::time::Duration;

/// Everything the control loop reacts to. Producers (input thread, watch
/// task, I/O tasks, timers) only ever send these; they never touch state.
#[derive(Debug)]
pub enum Message {
    Key(KeyPress),
    /// The terminal stopped delivering keys.
    InputClosed,
    /// The watch task saw the file settle after a write.
    ExternalChange,
    /// Contents read after an external change.
    ExternalText(Result<String, DocumentError>),
    WatchFailed(String),
    Saved {
        revision: u64,
        text: String,
        result: Result<SaveReport, DocumentError>,
    },
    Reloaded(Result<Parsed, DocumentError>),
    Copied(Result<usize, String>),
    ClearStatus(u64),
}

/// Work the runtime performs on behalf of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Save { revision: u64, text: String },
    Reload,
    InspectExternal,
    Copy(String),
    ClearStatusLater { id: u64, after: Duration },
    Quit,
}
