use console::Term;
use std::io;

/// Full-screen drawing surface on stdout. The cursor is hidden while the
/// screen is alive and restored on drop, including on error paths.
pub struct Screen {
    term: Term,
}

impl Screen {
    pub fn open() -> io::Result<Self> {
        let term = Term::stdout();
        term.hide_cursor()?;
        term.clear_screen()?;
        Ok(Self { term })
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    /// Rows and columns, falling back to 24x80 when unknown.
    pub fn size(&self) -> (usize, usize) {
        let (rows, cols) = self.term.size_checked().unwrap_or((24, 80));
        (usize::from(rows), usize::from(cols))
    }

    /// Repaint every line of `frame` from the top-left corner.
    pub fn draw(&self, frame: &[String]) -> io::Result<()> {
        self.term.move_cursor_to(0, 0)?;
        for line in frame {
            self.term.clear_line()?;
            self.term.write_line(line)?;
        }
        self.term.clear_to_end_of_screen()?;
        self.term.flush()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.term.clear_screen();
        let _ = self.term.show_cursor();
    }
}
