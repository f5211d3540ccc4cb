//! Cutting raw log text into one block per record.
//!
//! Many bots write a message's continuation lines (or paragraphs) as
//! separate physical pieces. A piece that does not open a new record is
//! glued back onto the record before it.

/// How a grammar wants its input cut up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reassembly {
    /// The grammar is applied to the whole text in one multi-line pass.
    WholeText,
    /// The text is split on `delimiter` and re-joined into records.
    Split { delimiter: &'static str },
}

/// Split `text` on `delimiter` and merge continuation pieces.
///
/// The first piece always opens a record. Every later piece either opens a
/// new record (when `is_record_start` accepts it) or is appended to the
/// current one with `delimiter` restored, so multi-line content survives.
pub fn reassemble(text: &str, delimiter: &str, is_record_start: impl Fn(&str) -> bool) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut blocks: Vec<String> = Vec::new();
    for piece in text.split(delimiter) {
        match blocks.last_mut() {
            Some(current) if !is_record_start(piece) => {
                current.push_str(delimiter);
                current.push_str(piece);
            }
            _ => blocks.push(piece.to_string()),
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts_with_bracket(piece: &str) -> bool {
        piece.starts_with('[')
    }

    #[test]
    fn test_continuation_lines_are_merged() {
        let blocks = reassemble("[a] x\ny\n[b] z", "\n", starts_with_bracket);
        assert_eq!(blocks, vec!["[a] x\ny", "[b] z"]);
    }

    #[test]
    fn test_first_piece_always_opens() {
        let blocks = reassemble("garbage\n[a] x", "\n", starts_with_bracket);
        assert_eq!(blocks, vec!["garbage", "[a] x"]);
    }

    #[test]
    fn test_paragraph_delimiter() {
        let blocks = reassemble("[a] one\n\ntwo\n\n[b] three", "\n\n", starts_with_bracket);
        assert_eq!(blocks, vec!["[a] one\n\ntwo", "[b] three"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(reassemble("", "\n", starts_with_bracket).is_empty());
    }
}
