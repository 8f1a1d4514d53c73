//! Terminal presentation: key decoding, screen drawing and the clipboard.
//! Nothing here decides anything; the session does.

mod clipboard;
mod keys;
mod terminal;
mod view;

pub use clipboard::copy_text;
pub use keys::read_key;
pub use terminal::Screen;
pub use view::{frame, Viewport};
