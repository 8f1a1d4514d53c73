//! # Dotenv Document
//!
//! Format-preserving document model for `.env` files.
//!
//! ## Pipeline
//!
//! ```text
//! File text
//!     │
//!     ├──> Parser
//!     │      └─> Lines (Blank | Comment | Variable) + Groups by key
//!     │
//!     ├──> Selection (toggle group / choose member)
//!     │      └─> Group { selected, selected_index }
//!     │
//!     └──> Renderer
//!            └─> Original text with `#` added/removed only on flipped lines
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dotenv_document::{parse, render};
//!
//! let parsed = parse("FOO=1\n#FOO=2\nBAR=x\n").unwrap();
//! let mut doc = parsed.document;
//!
//! let foo = doc.group_position("FOO").unwrap();
//! assert!(doc.choose_member(foo, 1));
//!
//! assert_eq!(render(&doc), "#FOO=1\nFOO=2\nBAR=x\n");
//! ```

mod document;
mod error;
mod line;
mod parser;
mod render;
mod rows;
mod selection;
mod store;

pub use document::{Document, Group};
pub use error::{DocumentError, Result};
pub use line::{Assignment, Line, LineKind, QuoteStyle};
pub use parser::{is_valid_key, parse, ParseWarning, Parsed};
pub use render::render;
pub use rows::{rows, Row, RowKind, EMPTY_VALUE_PLACEHOLDER};
pub use selection::GroupState;
pub use store::{backup_path, load, read_text, save, BackupOutcome, SaveReport};
