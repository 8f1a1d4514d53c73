use crate::document::{Document, Group};
use crate::error::{DocumentError, Result};
use crate::line::{Assignment, Line, LineKind, QuoteStyle};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Captures an optional disabling marker, an optional `export` keyword,
/// the key token (validated separately) and everything after `=`.
fn variable_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(#)?\s*(export\s+)?(\S+?)\s*=(.*)$").expect("variable regex is valid")
    })
}

/// Non-fatal findings from a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// More than one enabled line for the same key; the first one wins.
    MultipleEnabled {
        key: String,
        enabled: usize,
        chosen_ordinal: usize,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleEnabled {
                key,
                enabled,
                chosen_ordinal,
            } => write!(
                f,
                "{enabled} enabled lines for '{key}'; using line {chosen_ordinal}"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parsed {
    pub document: Document,
    pub warnings: Vec<ParseWarning>,
}

/// True if `key` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse `.env` text into a [`Document`].
///
/// Malformed variable-looking lines degrade to comments. The only error is an
/// unterminated quoted value, since nothing after it can be segmented
/// reliably.
pub fn parse(text: &str) -> Result<Parsed> {
    let mut lines = Vec::new();
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (i, physical) in text.split_inclusive('\n').enumerate() {
        let ordinal = i + 1;
        let body = physical.strip_suffix('\n').unwrap_or(physical);
        let (raw, crlf) = match body.strip_suffix('\r') {
            Some(stripped) if physical.ends_with('\n') => (stripped, true),
            _ => (body, false),
        };

        let kind = classify(raw, ordinal)?;
        if let LineKind::Variable(assignment) = &kind {
            let pos = *index.entry(assignment.key.clone()).or_insert_with(|| {
                groups.push(Group::new(assignment.key.clone()));
                groups.len() - 1
            });
            groups[pos].members.push(ordinal);
        }

        lines.push(Line {
            ordinal,
            raw: raw.to_string(),
            crlf,
            kind,
        });
    }

    // An unterminated last line gets the file's line ending when rendered.
    if !text.ends_with('\n') {
        if let [.., prev, last] = lines.as_mut_slice() {
            last.crlf = prev.crlf;
        }
    }

    let mut document = Document {
        lines,
        groups,
        index,
    };
    let warnings = derive_initial_selection(&mut document);
    debug!(
        "parsed {} lines into {} groups",
        document.lines.len(),
        document.groups.len()
    );
    Ok(Parsed { document, warnings })
}

fn classify(raw: &str, ordinal: usize) -> Result<LineKind> {
    if raw.trim().is_empty() {
        return Ok(LineKind::Blank);
    }

    let Some(caps) = variable_regex().captures(raw) else {
        return Ok(LineKind::Comment);
    };

    let token = &caps[3];
    let key = match token.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        Some(unquoted) => unquoted,
        None => token,
    };
    if !is_valid_key(key) {
        return Ok(LineKind::Comment);
    }

    let (value, quote) = decode_value(&caps[4]).map_err(|quote| {
        DocumentError::UnterminatedQuote {
            line: ordinal,
            quote: quote.name(),
        }
    })?;

    Ok(LineKind::Variable(Assignment {
        key: key.to_string(),
        value,
        disabled: caps.get(1).is_some(),
        quote,
        exported: caps.get(2).is_some(),
    }))
}

/// Decode the text after `=`.
///
/// Quoted values run to the first unescaped matching quote and keep their
/// inner text verbatim. Unquoted values stop at a `#` preceded by whitespace.
fn decode_value(input: &str) -> std::result::Result<(String, Option<QuoteStyle>), QuoteStyle> {
    let input = input.trim_start_matches([' ', '\t']);

    let Some(quote) = input.chars().next().and_then(QuoteStyle::from_char) else {
        return Ok((unquoted_value(input).to_string(), None));
    };

    let body = &input[1..];
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if c == quote.as_char() && !escaped {
            return Ok((body[..i].to_string(), Some(quote)));
        }
        escaped = c == '\\' && !escaped;
    }
    Err(quote)
}

fn unquoted_value(input: &str) -> &str {
    let mut prev_is_space = false;
    let mut end = input.len();
    for (i, c) in input.char_indices() {
        if c == '#' && prev_is_space {
            end = i;
            break;
        }
        prev_is_space = c == ' ' || c == '\t';
    }
    input[..end].trim_end_matches([' ', '\t'])
}

/// Decide each group's initial state from what is enabled on disk.
fn derive_initial_selection(document: &mut Document) -> Vec<ParseWarning> {
    let mut warnings = Vec::new();
    let lines = &document.lines;

    for group in &mut document.groups {
        let enabled: Vec<usize> = group
            .members
            .iter()
            .enumerate()
            .filter(|(_, &ordinal)| !lines[ordinal - 1].is_disabled())
            .map(|(i, _)| i)
            .collect();

        match enabled.first() {
            None => {
                group.selected = false;
                group.selected_index = 0;
            }
            Some(&first) => {
                group.selected = true;
                group.selected_index = first;
                if enabled.len() > 1 {
                    let warning = ParseWarning::MultipleEnabled {
                        key: group.key.clone(),
                        enabled: enabled.len(),
                        chosen_ordinal: group.members[first],
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assignment(line: &str) -> Assignment {
        match classify(line, 1).expect("classify") {
            LineKind::Variable(a) => a,
            other => panic!("expected variable for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn classifies_blank_comment_and_variable() {
        assert_eq!(classify("   \t", 1).unwrap(), LineKind::Blank);
        assert_eq!(classify("# just a note", 1).unwrap(), LineKind::Comment);
        assert_eq!(classify("not a variable", 1).unwrap(), LineKind::Comment);
        assert!(matches!(classify("FOO=1", 1).unwrap(), LineKind::Variable(_)));
    }

    #[test]
    fn disabled_and_exported_markers() {
        let a = assignment("  # export DB_URL = postgres://x");
        assert_eq!(a.key, "DB_URL");
        assert_eq!(a.value, "postgres://x");
        assert!(a.disabled);
        assert!(a.exported);

        let b = assignment("export=1");
        assert_eq!(b.key, "export");
        assert!(!b.exported);
    }

    #[test]
    fn single_quoted_key_is_unquoted() {
        let a = assignment("'API_KEY'=abc");
        assert_eq!(a.key, "API_KEY");
        assert_eq!(a.value, "abc");
    }

    #[test]
    fn invalid_keys_degrade_to_comment() {
        assert_eq!(classify("1BAD=value", 1).unwrap(), LineKind::Comment);
        assert_eq!(classify("'HALF=value", 1).unwrap(), LineKind::Comment);
        assert_eq!(classify("##FOO=1", 1).unwrap(), LineKind::Comment);
        assert_eq!(classify("FOO-BAR=1", 1).unwrap(), LineKind::Comment);
        assert_eq!(classify("# see docs: x = y", 1).unwrap(), LineKind::Comment);
    }

    #[test]
    fn unquoted_value_stops_at_inline_comment() {
        assert_eq!(assignment("A=hello world # note").value, "hello world");
        assert_eq!(assignment("A=hello#not-a-comment").value, "hello#not-a-comment");
        assert_eq!(assignment("A=trailing   ").value, "trailing");
        assert_eq!(assignment("A=").value, "");
        assert_eq!(assignment("A=b=c").value, "b=c");
    }

    #[test]
    fn quoted_values_keep_inner_text() {
        let a = assignment(r#"A="hello # world" # trailing"#);
        assert_eq!(a.value, "hello # world");
        assert_eq!(a.quote, Some(QuoteStyle::Double));

        let b = assignment(r#"B="say \"hi\"""#);
        assert_eq!(b.value, r#"say \"hi\""#);

        let c = assignment("C='it''s'");
        assert_eq!(c.value, "it");
        assert_eq!(c.quote, Some(QuoteStyle::Single));
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = parse("OK=1\nBAD=\"open\n").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::UnterminatedQuote {
                line: 2,
                quote: "double"
            }
        ));

        assert!(parse("# BAD='open\n").is_err());
    }

    #[test]
    fn groups_follow_first_occurrence_order() {
        let parsed = parse("B=1\nA=1\n# note\n#B=2\nA=2\n").unwrap();
        let doc = parsed.document;
        let order: Vec<&str> = doc.group_order().collect();
        assert_eq!(order, vec!["B", "A"]);
        assert_eq!(doc.group("B").unwrap().members, vec![1, 4]);
        assert_eq!(doc.group("A").unwrap().members, vec![2, 5]);
    }

    #[test]
    fn initial_selection_from_enabled_members() {
        let parsed = parse("#X=1\nX=2\n#Y=1\n#Y=2\n").unwrap();
        let doc = parsed.document;

        let x = doc.group("X").unwrap();
        assert!(x.selected);
        assert_eq!(x.selected_index, 1);

        let y = doc.group("Y").unwrap();
        assert!(!y.selected);
        assert_eq!(y.selected_index, 0);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn multiple_enabled_members_pick_first_and_warn() {
        let parsed = parse("#Z=0\nZ=1\nZ=2\n").unwrap();
        let z = parsed.document.group("Z").unwrap().clone();
        assert!(z.selected);
        assert_eq!(z.selected_index, 1);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::MultipleEnabled {
                key: "Z".to_string(),
                enabled: 2,
                chosen_ordinal: 2,
            }]
        );
    }

    #[test]
    fn crlf_terminators_are_recorded() {
        let parsed = parse("A=1\r\nB=2").unwrap();
        let lines = parsed.document.lines();
        assert!(lines[0].crlf);
        assert_eq!(lines[0].raw, "A=1");
        assert_eq!(lines[1].raw, "B=2");
        // Unterminated last line inherits the previous terminator.
        assert!(lines[1].crlf);
        assert_eq!(lines[1].assignment().unwrap().value, "2");
    }

    #[test]
    fn key_validation() {
        assert!(is_valid_key("_PRIVATE"));
        assert!(is_valid_key("a1"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("9LIVES"));
        assert!(!is_valid_key("HAS SPACE"));
    }
}
