use crate::error::{Error, Result};
use crate::keycode::parse_keycode;
use crate::table::PairTable;
use crate::types::KeyCode;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};

pub fn load_table<P: AsRef<Path>>(path: P) -> Result<PairTable> {
    let raw = std::fs::read(path.as_ref())?;
    let text = decode_table_bytes(&raw);
    let table = parse_table_content(text.as_ref())?;
    info!(
        "Loaded cancellation table {:?} with {} pairs",
        table.name.as_deref().unwrap_or("<unnamed>"),
        table.len()
    );
    Ok(table)
}

fn decode_table_bytes(raw: &[u8]) -> Cow<'_, str> {
    if let Some((enc, bom_len)) = encoding_rs::Encoding::for_bom(raw) {
        debug!("Decoded using BOM: {}", enc.name());
        let (cow, _, had_errors) = enc.decode(&raw[bom_len..]);
        if had_errors {
            warn!("Decode had errors (replacement characters used)");
        }
        return cow;
    }

    match std::str::from_utf8(raw) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            warn!("Table file is not valid UTF-8, decoding lossily");
            let (cow, had_errors) = encoding_rs::UTF_8.decode_without_bom_handling(raw);
            if had_errors {
                warn!("UTF-8 decode had errors");
            }
            cow
        }
    }
}

/// Parses a cancellation table.
///
/// ```text
/// ; WASD movement        <- first comment names the table
/// A <-> D                 both directions
/// W <-> S
/// KC_LEFT -> KC_RIGHT     one direction only
/// ```
pub fn parse_table_content(content: &str) -> Result<PairTable> {
    let mut table = PairTable::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();

        if let Some(comment) = line.strip_prefix(';') {
            if table.name.is_none() && table.is_empty() {
                let name = comment.trim();
                if !name.is_empty() {
                    table.name = Some(name.to_string());
                }
            }
            continue;
        }

        let rule = match line.find(';') {
            Some(pos) => line[..pos].trim(),
            None => line,
        };
        if rule.is_empty() {
            continue;
        }

        if let Some((left, right)) = rule.split_once("<->") {
            let a = parse_side(left, line_no, rule)?;
            let b = parse_side(right, line_no, rule)?;
            table.push_symmetric(a, b);
        } else if let Some((left, right)) = rule.split_once("->") {
            let press = parse_side(left, line_no, rule)?;
            let unpress = parse_side(right, line_no, rule)?;
            table.push(press, unpress);
        } else {
            return Err(Error::MalformedPair {
                line: line_no,
                text: rule.to_string(),
            });
        }
    }

    Ok(table)
}

fn parse_side(raw: &str, line: usize, rule: &str) -> Result<KeyCode> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::MalformedPair {
            line,
            text: rule.to_string(),
        });
    }
    let key = parse_keycode(name).ok_or_else(|| Error::UnknownKeycode {
        line,
        name: name.to_string(),
    })?;
    if !key.is_basic() {
        // Accepted, but the engine never processes non-basic keycodes.
        warn!("line {}: {} is not a basic keycode and will never cancel", line, key);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CancellationPair, CancellationTable};

    #[test]
    fn test_parse_directional_and_symmetric() {
        let table = parse_table_content(
            "
; Arrow SOCD
LEFT <-> RIGHT
KC_UP -> KC_DOWN   ; up wins
",
        )
        .expect("parse");

        assert_eq!(table.name.as_deref(), Some("Arrow SOCD"));
        assert_eq!(
            table.pairs,
            vec![
                CancellationPair::new(KeyCode::LEFT, KeyCode::RIGHT),
                CancellationPair::new(KeyCode::RIGHT, KeyCode::LEFT),
                CancellationPair::new(KeyCode::UP, KeyCode::DOWN),
            ]
        );
        assert!(!table.is_press_key(KeyCode::DOWN));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let table = parse_table_content("a -> d\na -> d\n").expect("parse");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_hex_keycodes() {
        let table = parse_table_content("0x04 -> 0x07").expect("parse");
        assert_eq!(table.pairs, vec![CancellationPair::new(KeyCode::A, KeyCode::D)]);
    }

    #[test]
    fn test_unknown_keycode_reports_line() {
        let err = parse_table_content("; t\nA <-> D\nA -> KC_BOGUS\n").unwrap_err();
        match err {
            Error::UnknownKeycode { line, name } => {
                assert_eq!(line, 3);
                assert_eq!(name, "KC_BOGUS");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_rules() {
        assert!(matches!(
            parse_table_content("A D"),
            Err(Error::MalformedPair { line: 1, .. })
        ));
        assert!(matches!(
            parse_table_content("\nA ->"),
            Err(Error::MalformedPair { line: 2, .. })
        ));
    }

    #[test]
    fn test_decode_utf8_bom() {
        let mut raw = vec![0xEF, 0xBB, 0xBF];
        raw.extend_from_slice(b"A <-> D\n");
        let text = decode_table_bytes(&raw);
        assert_eq!(text, "A <-> D\n");
    }
}
