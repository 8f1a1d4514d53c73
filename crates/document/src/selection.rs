use crate::document::Document;
use crate::rows::RowKind;

/// Per-group selection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Off,
    On(usize),
}

impl Document {
    pub fn group_state(&self, pos: usize) -> Option<GroupState> {
        let group = self.groups.get(pos)?;
        Some(if group.selected {
            GroupState::On(group.selected_index)
        } else {
            GroupState::Off
        })
    }

    /// Flip the group on or off. The remembered member is never changed.
    ///
    /// Returns `true` if the document changed.
    #[must_use]
    pub fn toggle_group(&mut self, pos: usize) -> bool {
        let Some(group) = self.groups.get_mut(pos) else {
            return false;
        };
        if group.members.is_empty() {
            return false;
        }
        group.selected = !group.selected;
        true
    }

    /// Make `member` the live value of the group, switching the group on if
    /// it was off.
    ///
    /// Returns `true` if the document changed.
    #[must_use]
    pub fn choose_member(&mut self, pos: usize, member: usize) -> bool {
        let Some(group) = self.groups.get_mut(pos) else {
            return false;
        };
        if member >= group.members.len() {
            return false;
        }
        if group.selected && group.selected_index == member {
            return false;
        }
        group.selected = true;
        group.selected_index = member;
        true
    }

    /// Apply the action bound to a row: headers toggle, members are chosen.
    #[must_use]
    pub fn activate(&mut self, row: &RowKind) -> bool {
        match *row {
            RowKind::Header { group } => self.toggle_group(group),
            RowKind::Member { group, member } => self.choose_member(group, member),
        }
    }
}
