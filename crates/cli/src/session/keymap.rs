/// Terminal-independent key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Escape,
    CtrlC,
    CtrlS,
    Char(char),
}

/// What the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    QuitPrompt,
    ReloadPrompt,
}

/// User intent after key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    MoveUp,
    MoveDown,
    Top,
    Bottom,
    PageUp,
    PageDown,
    Activate,
    Save,
    Reload,
    Copy,
    Quit,
    Answer(Answer),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    SaveAndQuit,
    DiscardAndQuit,
    CancelQuit,
    ReloadFromDisk,
    KeepEdits,
}

pub fn bind(key: KeyPress, mode: Mode) -> Option<Input> {
    match mode {
        Mode::Browse => bind_browse(key),
        Mode::QuitPrompt => match key {
            KeyPress::Char('y' | 'Y') => Some(Input::Answer(Answer::SaveAndQuit)),
            KeyPress::Char('n' | 'N') => Some(Input::Answer(Answer::DiscardAndQuit)),
            KeyPress::Char('c' | 'C') | KeyPress::Escape => {
                Some(Input::Answer(Answer::CancelQuit))
            }
            _ => None,
        },
        Mode::ReloadPrompt => match key {
            KeyPress::Char('r' | 'R') => Some(Input::Answer(Answer::ReloadFromDisk)),
            KeyPress::Char('k' | 'K') | KeyPress::Escape => Some(Input::Answer(Answer::KeepEdits)),
            _ => None,
        },
    }
}

fn bind_browse(key: KeyPress) -> Option<Input> {
    let input = match key {
        KeyPress::Up | KeyPress::Char('k') => Input::MoveUp,
        KeyPress::Down | KeyPress::Char('j') => Input::MoveDown,
        KeyPress::Home | KeyPress::Char('g') => Input::Top,
        KeyPress::End | KeyPress::Char('G') => Input::Bottom,
        KeyPress::PageUp => Input::PageUp,
        KeyPress::PageDown => Input::PageDown,
        KeyPress::Enter | KeyPress::Char(' ') => Input::Activate,
        KeyPress::CtrlS | KeyPress::Char('s') => Input::Save,
        KeyPress::Char('r') => Input::Reload,
        KeyPress::Char('y') => Input::Copy,
        KeyPress::CtrlC | KeyPress::Escape | KeyPress::Char('q') => Input::Quit,
        _ => return None,
    };
    Some(input)
}
