//! # Dotenv Watcher
//!
//! Background watch task for a single file.
//!
//! ```text
//! OS events (notify, parent directory)
//!     │
//!     ├──> filter: target file name, create/modify kinds
//!     │
//!     ├──> trailing-edge debounce (reset on every event)
//!     │
//!     └──> WatchEvent::Changed ──> caller's inbox
//! ```
//!
//! The task never touches caller state: it only pushes messages into the
//! channel handed to [`FileWatcher::start`].

mod error;
mod watcher;

pub use error::{Result, WatchError};
pub use watcher::{FileWatcher, WatchEvent, WatcherConfig};
