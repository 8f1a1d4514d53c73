use crate::document::Document;
use crate::line::Line;
use std::borrow::Cow;

/// Render the document back to file text.
///
/// Lines whose enabled state already matches the selection are emitted
/// verbatim. The output always ends with exactly one line terminator unless
/// the document has no lines at all.
pub fn render(document: &Document) -> String {
    let wanted = wanted_enabled(document);
    let mut out = String::with_capacity(document.lines.iter().map(|l| l.raw.len() + 2).sum());

    for (line, want) in document.lines.iter().zip(wanted) {
        out.push_str(&rewrite(line, want));
        out.push_str(line.terminator());
    }
    out
}

impl Document {
    /// Fold the current selection into the line arena, as if the rendered
    /// text had just been re-read from disk.
    ///
    /// Returns the number of lines rewritten.
    pub fn commit_render(&mut self) -> usize {
        let wanted = wanted_enabled(self);
        let mut changed = 0;
        for (line, want) in self.lines.iter_mut().zip(wanted) {
            let Some(want) = want else { continue };
            let raw = match rewrite(line, Some(want)) {
                Cow::Owned(raw) => raw,
                Cow::Borrowed(_) => continue,
            };
            line.raw = raw;
            if let Some(assignment) = line.assignment_mut() {
                assignment.disabled = !want.enable;
            }
            changed += 1;
        }
        changed
    }

    /// Ordinals of variable lines whose on-disk state differs from the
    /// current selection.
    pub fn pending_flips(&self) -> Vec<usize> {
        let wanted = wanted_enabled(self);
        self.lines
            .iter()
            .zip(wanted)
            .filter(|(line, want)| want.is_some_and(|w| w.enable == line.is_disabled()))
            .map(|(line, _)| line.ordinal)
            .collect()
    }
}

const SPACED_MARKER: &str = "# ";
const BARE_MARKER: &str = "#";

/// Desired state of one variable line.
#[derive(Debug, Clone, Copy)]
struct Want {
    enable: bool,
    /// Marker to insert when disabling, matching the group's existing style.
    marker: &'static str,
}

/// Desired state per line; `None` for non-variable lines.
fn wanted_enabled(document: &Document) -> Vec<Option<Want>> {
    let mut wanted = vec![None; document.lines.len()];
    for group in &document.groups {
        let marker = group_marker(document, &group.members);
        for (i, &ordinal) in group.members.iter().enumerate() {
            if let Some(slot) = wanted.get_mut(ordinal - 1) {
                *slot = Some(Want {
                    enable: group.is_live(i),
                    marker,
                });
            }
        }
    }
    wanted
}

/// `#` when the group's first disabled member is written `#KEY=...`,
/// otherwise `# `.
fn group_marker(document: &Document, members: &[usize]) -> &'static str {
    members
        .iter()
        .filter_map(|&ordinal| document.line(ordinal))
        .find(|line| line.is_disabled())
        .and_then(|line| {
            let idx = line.raw.find('#')?;
            Some(if line.raw[idx + 1..].starts_with(' ') {
                SPACED_MARKER
            } else {
                BARE_MARKER
            })
        })
        .unwrap_or(SPACED_MARKER)
}

fn rewrite(line: &Line, want: Option<Want>) -> Cow<'_, str> {
    let raw = line.raw.as_str();
    let (Some(want), Some(assignment)) = (want, line.assignment()) else {
        return Cow::Borrowed(raw);
    };

    match (want.enable, assignment.disabled) {
        (true, true) => Cow::Owned(remove_marker(raw)),
        (false, false) => Cow::Owned(insert_marker(raw, want.marker)),
        _ => Cow::Borrowed(raw),
    }
}

/// Drop the first `#` and at most one space right after it.
fn remove_marker(raw: &str) -> String {
    let Some(idx) = raw.find('#') else {
        return raw.to_string();
    };
    let rest = &raw[idx + 1..];
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    format!("{}{}", &raw[..idx], rest)
}

/// Insert `marker` after the existing indentation.
fn insert_marker(raw: &str, marker: &str) -> String {
    let body = raw.trim_start();
    let indent = &raw[..raw.len() - body.len()];
    format!("{indent}{marker}{body}")
}
