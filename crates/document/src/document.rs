use crate::line::Line;
use std::collections::HashMap;

/// All variable lines sharing one key, in file order.
///
/// `members` holds line ordinals into [`Document::lines`], never copies.
/// `selected_index` is meaningful even while the group is off: it remembers
/// the value to restore when the group is toggled back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: String,
    pub members: Vec<usize>,
    pub selected: bool,
    pub selected_index: usize,
}

impl Group {
    pub(crate) fn new(key: String) -> Self {
        Self {
            key,
            members: Vec::new(),
            selected: false,
            selected_index: 0,
        }
    }

    /// True if the member at `index` should be enabled on disk.
    pub fn is_live(&self, index: usize) -> bool {
        self.selected && self.selected_index == index
    }

    /// Position of `ordinal` within this group.
    pub fn member_index(&self, ordinal: usize) -> Option<usize> {
        self.members.iter().position(|&m| m == ordinal)
    }
}

/// Parsed `.env` file: the line arena plus the grouping index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub(crate) lines: Vec<Line>,
    pub(crate) groups: Vec<Group>,
    pub(crate) index: HashMap<String, usize>,
}

impl Document {
    /// All lines in file order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Line by 1-based ordinal.
    pub fn line(&self, ordinal: usize) -> Option<&Line> {
        ordinal.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    pub(crate) fn line_mut(&mut self, ordinal: usize) -> Option<&mut Line> {
        ordinal.checked_sub(1).and_then(|i| self.lines.get_mut(i))
    }

    /// Groups in first-occurrence order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, key: &str) -> Option<&Group> {
        self.group_position(key).map(|pos| &self.groups[pos])
    }

    pub fn group_at(&self, pos: usize) -> Option<&Group> {
        self.groups.get(pos)
    }

    pub fn group_position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn group_order(&self) -> impl Iterator<Item = &str> + '_ {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Lines belonging to the group at `pos`, in file order.
    pub fn members(&self, pos: usize) -> impl Iterator<Item = &Line> + '_ {
        self.groups
            .get(pos)
            .into_iter()
            .flat_map(|g| g.members.iter())
            .filter_map(|&ordinal| self.line(ordinal))
    }

    pub fn member_line(&self, pos: usize, member: usize) -> Option<&Line> {
        let ordinal = *self.groups.get(pos)?.members.get(member)?;
        self.line(ordinal)
    }

    /// Group position and member index for a variable line.
    pub fn locate(&self, ordinal: usize) -> Option<(usize, usize)> {
        let key = &self.line(ordinal)?.assignment()?.key;
        let pos = self.group_position(key)?;
        let member = self.groups[pos].member_index(ordinal)?;
        Some((pos, member))
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}
