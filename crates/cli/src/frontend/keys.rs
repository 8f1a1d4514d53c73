use crate::session::KeyPress;
use console::{Key, Term};
use std::io;

const CTRL_C: char = '\u{3}';
const CTRL_S: char = '\u{13}';

/// Block until the next key the session understands, or `None` once the
/// terminal is gone.
pub fn read_key(term: &Term) -> Option<KeyPress> {
    loop {
        match term.read_key() {
            Ok(key) => {
                if let Some(press) = translate(key) {
                    return Some(press);
                }
            }
            // Some platforms surface ctrl+c as an interrupted read.
            Err(err) if err.kind() == io::ErrorKind::Interrupted => return Some(KeyPress::CtrlC),
            Err(_) => return None,
        }
    }
}

pub fn translate(key: Key) -> Option<KeyPress> {
    let press = match key {
        Key::ArrowUp => KeyPress::Up,
        Key::ArrowDown => KeyPress::Down,
        Key::Home => KeyPress::Home,
        Key::End => KeyPress::End,
        Key::PageUp => KeyPress::PageUp,
        Key::PageDown => KeyPress::PageDown,
        Key::Enter => KeyPress::Enter,
        Key::Escape => KeyPress::Escape,
        Key::Char(CTRL_C) => KeyPress::CtrlC,
        Key::Char(CTRL_S) => KeyPress::CtrlS,
        Key::Char(c) if !c.is_control() => KeyPress::Char(c),
        _ => return None,
    };
    Some(press)
}
