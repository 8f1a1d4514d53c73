use crate::session::{Mode, Session, StatusKind};
use console::{style, truncate_str};
use dotenv_document::{Row, RowKind};

const HEADER_LINES: usize = 2;
const FOOTER_LINES: usize = 2;
/// Rows kept visible above and below the cursor while scrolling.
const SCROLL_OFF: usize = 2;

const HELP: &str =
    "↑/k ↓/j move · space toggle/select · ctrl+s save · r reload · y copy · q quit";

/// Scroll position of the row list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
}

impl Viewport {
    /// Number of list rows that fit on a screen `screen_rows` tall.
    /// One line is left spare so the last `write_line` never scrolls.
    pub fn list_height(screen_rows: usize) -> usize {
        screen_rows
            .saturating_sub(HEADER_LINES + FOOTER_LINES + 1)
            .max(1)
    }

    /// Move the window so `cursor` stays inside it with some margin.
    pub fn follow(&mut self, cursor: usize, total: usize, height: usize) {
        let margin = SCROLL_OFF.min(height.saturating_sub(1) / 2);
        if cursor < self.offset + margin {
            self.offset = cursor.saturating_sub(margin);
        } else if cursor + margin >= self.offset + height {
            self.offset = cursor + margin + 1 - height;
        }
        let max_offset = total.saturating_sub(height);
        self.offset = self.offset.min(max_offset);
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Build the full screen for the current session state.
pub fn frame(session: &Session, viewport: &mut Viewport, rows: usize, cols: usize) -> Vec<String> {
    let height = Viewport::list_height(rows);
    let list = session.rows();
    viewport.follow(session.cursor(), list.len(), height);

    let mut out = Vec::with_capacity(rows);
    out.push(fit(&header_line(session), cols));
    out.push(String::new());

    if list.is_empty() {
        out.push(style("  No variables found.").dim().to_string());
    }
    for (index, row) in list.iter().enumerate().skip(viewport.offset).take(height) {
        let line = row_line(row, index == session.cursor());
        out.push(fit(&line, cols));
    }
    while out.len() < HEADER_LINES + height {
        out.push(String::new());
    }

    out.push(String::new());
    out.push(fit(&footer_line(session), cols));
    out
}

fn fit(line: &str, cols: usize) -> String {
    truncate_str(line, cols, "…").into_owned()
}

fn header_line(session: &Session) -> String {
    let mut line = format!(
        "{}  File: {}",
        style("dotenv-manager").bold(),
        session.path().display()
    );
    if session.is_dirty() {
        line.push_str(&format!(" {}", style("[MODIFIED]").yellow().bold()));
    }
    if !session.is_watching() {
        line.push_str(&format!(" {}", style("[not watching]").dim()));
    }
    line
}

fn footer_line(session: &Session) -> String {
    match session.mode() {
        Mode::QuitPrompt => style("Unsaved changes. Save before quitting? (y)es / (n)o / (c)ancel")
            .yellow()
            .bold()
            .to_string(),
        Mode::ReloadPrompt => {
            style("File changed on disk. (r)eload and lose your changes / (k)eep your changes")
                .yellow()
                .bold()
                .to_string()
        }
        Mode::Browse => match session.status() {
            Some(status) => match status.kind {
                StatusKind::Info => style(&status.text).green().to_string(),
                StatusKind::Warning => style(&status.text).yellow().to_string(),
                StatusKind::Error => style(&status.text).red().bold().to_string(),
            },
            None => style(HELP).dim().to_string(),
        },
    }
}

fn row_line(row: &Row, under_cursor: bool) -> String {
    let pointer = if under_cursor { "> " } else { "  " };
    let body = match row.kind {
        RowKind::Header { .. } => {
            let icon = if row.active { "[✓]" } else { "[ ]" };
            let text = format!("{icon} {}", row.text);
            if row.active {
                style(text).green().bold().to_string()
            } else {
                style(text).bold().to_string()
            }
        }
        RowKind::Member { .. } => {
            let mark = if row.checked { "*" } else { " " };
            let text = format!("    {mark} {}", row.text);
            if row.dimmed {
                style(text).dim().to_string()
            } else if row.active {
                style(text).green().to_string()
            } else {
                text
            }
        }
    };
    if under_cursor {
        format!("{}{}", style(pointer).cyan().bold(), body)
    } else {
        format!("{pointer}{body}")
    }
}
