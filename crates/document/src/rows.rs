use crate::document::Document;
use serde::Serialize;

/// Shown in place of an empty value.
pub const EMPTY_VALUE_PLACEHOLDER: &str = "<empty>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    Header { group: usize },
    Member { group: usize, member: usize },
}

impl RowKind {
    pub const fn group(&self) -> usize {
        match *self {
            Self::Header { group } | Self::Member { group, .. } => group,
        }
    }
}

/// One renderable row handed to the presentation layer.
///
/// `active` means "on": a header whose group is selected, or the live member.
/// `checked` marks the remembered member even while its group is off, and
/// `dimmed` marks members of an off group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    #[serde(flatten)]
    pub kind: RowKind,
    pub text: String,
    pub active: bool,
    pub checked: bool,
    pub dimmed: bool,
    pub ordinal: Option<usize>,
}

/// Flatten the document into header and member rows in group order.
pub fn rows(document: &Document) -> Vec<Row> {
    let mut out = Vec::new();
    for (pos, group) in document.groups().iter().enumerate() {
        out.push(Row {
            kind: RowKind::Header { group: pos },
            text: group.key.clone(),
            active: group.selected,
            checked: group.selected,
            dimmed: false,
            ordinal: None,
        });

        for (member, line) in document.members(pos).enumerate() {
            let value = line.assignment().map_or("", |a| a.value.as_str());
            let text = if value.is_empty() {
                EMPTY_VALUE_PLACEHOLDER.to_string()
            } else {
                value.to_string()
            };
            out.push(Row {
                kind: RowKind::Member { group: pos, member },
                text,
                active: group.is_live(member),
                checked: group.selected_index == member,
                dimmed: !group.selected,
                ordinal: Some(line.ordinal),
            });
        }
    }
    out
}

impl Document {
    /// Plain text for a row: the key for headers, the raw value for members.
    pub fn row_text(&self, row: &RowKind) -> Option<String> {
        match *row {
            RowKind::Header { group } => self.group_at(group).map(|g| g.key.clone()),
            RowKind::Member { group, member } => self
                .member_line(group, member)
                .and_then(|line| line.assignment())
                .map(|a| a.value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn rows_serialize_with_a_kind_tag() {
        let doc = parse("A=1\n#A=2\n").unwrap().document;
        let value = serde_json::to_value(rows(&doc)).unwrap();
        assert_eq!(value[0]["kind"], "header");
        assert_eq!(value[0]["group"], 0);
        assert!(value[0]["ordinal"].is_null());
        assert_eq!(value[2]["kind"], "member");
        assert_eq!(value[2]["member"], 1);
        assert_eq!(value[2]["ordinal"], 2);
        assert_eq!(value[2]["active"], false);
    }

    #[test]
    fn rows_list_header_then_members() {
        let doc = parse("A=1\n# hello\n#A=\nB=x\n").unwrap().document;
        let rows = rows(&doc);
        let kinds: Vec<RowKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Header { group: 0 },
                RowKind::Member { group: 0, member: 0 },
                RowKind::Member { group: 0, member: 1 },
                RowKind::Header { group: 1 },
                RowKind::Member { group: 1, member: 0 },
            ]
        );
        assert_eq!(rows[2].text, EMPTY_VALUE_PLACEHOLDER);
        assert_eq!(rows[2].ordinal, Some(3));
        assert!(rows[1].active);
        assert!(!rows[2].active);
    }

    #[test]
    fn off_group_keeps_checked_member_dimmed() {
        let mut doc = parse("A=1\n#A=2\n").unwrap().document;
        assert!(doc.choose_member(0, 1));
        assert!(doc.toggle_group(0));

        let rows = rows(&doc);
        assert!(!rows[0].active);
        assert!(rows[2].checked);
        assert!(!rows[2].active);
        assert!(rows[1].dimmed && rows[2].dimmed);
    }

    #[test]
    fn row_text_returns_key_or_raw_value() {
        let doc = parse("A=\"quoted value\"\n").unwrap().document;
        assert_eq!(
            doc.row_text(&RowKind::Header { group: 0 }).as_deref(),
            Some("A")
        );
        assert_eq!(
            doc.row_text(&RowKind::Member { group: 0, member: 0 }).as_deref(),
            Some("quoted value")
        );
        assert_eq!(doc.row_text(&RowKind::Header { group: 9 }), None);
    }
}
