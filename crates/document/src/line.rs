use serde::Serialize;

/// Quoting style of a variable's value as written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub(crate) fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Single => '\'',
            Self::Double => '"',
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

/// A `KEY=VALUE` definition, enabled or disabled by a leading `#`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Identifier matching `[A-Za-z_][A-Za-z0-9_]*`
    pub key: String,
    /// Value with quotes and any inline comment stripped
    pub value: String,
    /// True if the line currently starts with the disabling marker
    pub disabled: bool,
    pub quote: Option<QuoteStyle>,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Variable(Assignment),
}

/// One physical line of the source file.
///
/// `raw` never contains the line terminator; `crlf` records whether the
/// terminator was `\r\n` so the renderer can reproduce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub ordinal: usize,
    pub raw: String,
    pub crlf: bool,
    pub kind: LineKind,
}

impl Line {
    pub fn assignment(&self) -> Option<&Assignment> {
        match &self.kind {
            LineKind::Variable(assignment) => Some(assignment),
            _ => None,
        }
    }

    pub(crate) fn assignment_mut(&mut self) -> Option<&mut Assignment> {
        match &mut self.kind {
            LineKind::Variable(assignment) => Some(assignment),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, LineKind::Variable(_))
    }

    pub fn is_disabled(&self) -> bool {
        self.assignment().is_some_and(|a| a.disabled)
    }

    pub(crate) fn terminator(&self) -> &'static str {
        if self.crlf {
            "\r\n"
        } else {
            "\n"
        }
    }
}
