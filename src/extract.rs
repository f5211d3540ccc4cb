//! Applying a grammar to reassembled text and collecting raw record fields.

use serde_json::Value;
use tracing::{debug, warn};

use crate::grammars::Grammar;
use crate::literal;
use crate::reassemble::{Reassembly, reassemble};
use crate::timestamp::TimeFormat;

/// Fields captured for one record, before normalization.
///
/// Every field is optional because formats differ in what they log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub message_id: Option<String>,
    pub channel_id: Option<String>,
    pub guild_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    /// Avatar hash or full avatar URL.
    pub avatar: Option<String>,
    pub content: String,
    pub timestamp: Option<RawTimestamp>,
    pub attachments: Vec<String>,
    pub embeds: Vec<Value>,
}

/// Timestamp text and the layout it was written in.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTimestamp {
    pub text: String,
    pub format: TimeFormat,
}

impl RawTimestamp {
    pub fn new(text: String, format: TimeFormat) -> Self {
        Self { text, format }
    }
}

/// Extract all records `G` recognizes in `text`.
pub(crate) fn extract<G: Grammar>(text: &str) -> Vec<RawFields> {
    let text = G::preprocess(text);
    let records: Vec<RawFields> = match G::REASSEMBLY {
        Reassembly::WholeText => G::record_pattern()
            .captures_iter(&text)
            .filter_map(|caps| G::record(&caps))
            .map(Into::into)
            .collect(),
        Reassembly::Split { delimiter } => {
            let blocks = reassemble(&text, delimiter, |piece| G::record_start().is_match(piece));
            let records: Vec<RawFields> = blocks
                .iter()
                .filter_map(|block| G::record_pattern().captures(block))
                .filter_map(|caps| G::record(&caps))
                .map(Into::into)
                .collect();
            debug!(
                blocks = blocks.len(),
                records = records.len(),
                "reassembled blocks"
            );
            records
        }
    };
    G::finish(&text, records)
}

/// Split a joined attachment list into trimmed, non-empty URLs.
pub(crate) fn split_attachments(joined: Option<&str>, delimiter: &str) -> Vec<String> {
    joined
        .map(|joined| {
            joined
                .split(delimiter)
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Decode an inline embed payload.
///
/// The payload is tried as JSON first, then as a Python-style literal (single
/// quotes, `True`/`None`). Accepted shapes are `{"embeds": [...]}`, a list of
/// embeds, or a single embed object. Anything else yields no embeds.
pub(crate) fn decode_embeds(payload: Option<&str>) -> Vec<Value> {
    let Some(payload) = payload.map(str::trim).filter(|p| !p.is_empty()) else {
        return Vec::new();
    };
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(json_err) => match literal::parse(payload) {
            Ok(value) => value,
            Err(literal_err) => {
                warn!(%json_err, %literal_err, "dropping undecodable embed payload");
                return Vec::new();
            }
        },
    };
    match value {
        Value::Object(mut map) => match map.remove("embeds") {
            Some(Value::Array(embeds)) => embeds,
            Some(_) => Vec::new(),
            None => vec![Value::Object(map)],
        },
        Value::Array(embeds) => embeds,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_attachments() {
        assert_eq!(
            split_attachments(Some("https://a/1.png, https://a/2.png"), ", "),
            vec!["https://a/1.png", "https://a/2.png"]
        );
        assert!(split_attachments(Some(""), ", ").is_empty());
        assert!(split_attachments(None, ", ").is_empty());
    }

    #[test]
    fn test_split_attachments_newline_joined() {
        assert_eq!(
            split_attachments(Some("\nhttps://a/1.png\nhttps://a/2.png"), "\n"),
            vec!["https://a/1.png", "https://a/2.png"]
        );
    }

    #[test]
    fn test_decode_embeds_wrapper() {
        let embeds = decode_embeds(Some(r#"{"embeds": [{"title": "a"}, {"title": "b"}]}"#));
        assert_eq!(embeds, vec![json!({"title": "a"}), json!({"title": "b"})]);
    }

    #[test]
    fn test_decode_single_embed_object() {
        let embeds = decode_embeds(Some(r#"{"title": "a"}"#));
        assert_eq!(embeds, vec![json!({"title": "a"})]);
    }

    #[test]
    fn test_decode_python_literal() {
        let embeds = decode_embeds(Some("{'embeds': [{'title': 'a', 'inline': True}]}"));
        assert_eq!(embeds, vec![json!({"title": "a", "inline": true})]);
    }

    #[test]
    fn test_decode_garbage_is_empty() {
        assert!(decode_embeds(Some("{not an embed")).is_empty());
        assert!(decode_embeds(Some("42")).is_empty());
        assert!(decode_embeds(None).is_empty());
    }
}
