//! Turning logged embed payloads into rendered [`Embed`]s.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::formatter::{FormatOptions, format};
use crate::model::{
    DEFAULT_EMBED_COLOR, Embed, EmbedAuthor, EmbedField, EmbedFooter, EmbedMedia, EmbedProvider, User,
};
use crate::timestamp::TimeFormat;

/// An embed as Discord serializes it. Every key may be missing, and a key
/// holding the wrong type is dropped on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEmbed {
    #[serde(deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    kind: Option<String>,
    #[serde(deserialize_with = "lenient")]
    timestamp: Option<String>,
    #[serde(deserialize_with = "lenient")]
    color: Option<Color>,
    #[serde(deserialize_with = "lenient")]
    author: Option<EmbedAuthor>,
    #[serde(deserialize_with = "lenient")]
    footer: Option<EmbedFooter>,
    #[serde(deserialize_with = "lenient")]
    image: Option<EmbedMedia>,
    #[serde(deserialize_with = "lenient")]
    thumbnail: Option<EmbedMedia>,
    #[serde(deserialize_with = "lenient")]
    video: Option<EmbedMedia>,
    #[serde(deserialize_with = "lenient")]
    provider: Option<EmbedProvider>,
    #[serde(deserialize_with = "lenient")]
    fields: Option<Vec<RawEmbedField>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEmbedField {
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    value: Option<String>,
    #[serde(deserialize_with = "lenient")]
    inline: Option<bool>,
}

/// Read one key, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            debug!(%err, "ignoring mistyped embed key");
            Ok(None)
        }
    }
}

/// Bots log colours as integers, floats, or `#RRGGBB` strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Color {
    Number(u64),
    Float(f64),
    Text(String),
}

impl Color {
    fn value(&self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok(),
            Self::Float(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                Some(*f as u32)
            }
            Self::Float(_) => None,
            Self::Text(s) => {
                let s = s.trim();
                match s.strip_prefix('#') {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => s.parse().ok(),
                }
            }
        }
    }
}

/// Render every decodable embed; undecodable ones are skipped.
pub(crate) fn render_embeds(payloads: Vec<Value>, users: &[User]) -> Vec<Embed> {
    payloads
        .into_iter()
        .filter_map(|payload| match serde_json::from_value::<RawEmbed>(payload) {
            Ok(raw) => Some(render(raw, users)),
            Err(err) => {
                warn!(%err, "skipping embed");
                None
            }
        })
        .collect()
}

fn render(raw: RawEmbed, users: &[User]) -> Embed {
    let lite = |text: &str| format(text, users, FormatOptions::EMBED_TITLE);
    let timestamp = raw.timestamp.as_deref().and_then(|text| match TimeFormat::Rfc3339.parse(text) {
        Ok(ts) => Some(ts),
        Err(err) => {
            debug!(%err, "ignoring embed timestamp");
            None
        }
    });
    let fields = raw
        .fields
        .unwrap_or_default()
        .into_iter()
        .map(|field| EmbedField {
            name: lite(field.name.as_deref().unwrap_or_default()),
            value: format(
                field.value.as_deref().unwrap_or_default(),
                users,
                FormatOptions::EMBED_FIELD_VALUE,
            ),
            inline: field.inline.unwrap_or(false),
        })
        .collect();

    Embed {
        title: raw.title.as_deref().map(lite),
        description: raw
            .description
            .as_deref()
            .map(|text| format(text, users, FormatOptions::EMBED_DESCRIPTION)),
        url: raw.url,
        kind: raw.kind.unwrap_or_else(|| "rich".to_string()),
        timestamp,
        color: raw.color.as_ref().and_then(Color::value).unwrap_or(DEFAULT_EMBED_COLOR),
        author: raw.author.map(|author| EmbedAuthor {
            name: author.name.as_deref().map(lite),
            ..author
        }),
        footer: raw.footer.map(|footer| EmbedFooter {
            text: lite(&footer.text),
            ..footer
        }),
        image: raw.image,
        thumbnail: raw.thumbnail,
        video: raw.video,
        provider: raw.provider,
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_full_embed() {
        let payload = json!({
            "title": "Release **notes**",
            "description": "See [the docs](https://docs.rs)\nnow",
            "color": 16711680,
            "timestamp": "2019-01-07T12:34:56.000Z",
            "footer": {"text": "v1 <beta>"},
            "fields": [
                {"name": "a", "value": "1\n2", "inline": true},
                {"name": "b", "value": "**2**"}
            ]
        });
        let embeds = render_embeds(vec![payload], &[]);
        assert_eq!(embeds.len(), 1);
        let embed = &embeds[0];
        assert_eq!(embed.title.as_deref(), Some("Release <b>notes</b>"));
        assert_eq!(
            embed.description.as_deref(),
            Some("See <a href=\"https://docs.rs\">the docs</a>\nnow")
        );
        assert_eq!(embed.color_hex(), "#FF0000");
        assert_eq!(embed.kind, "rich");
        assert!(embed.timestamp.is_some());
        assert_eq!(embed.footer.as_ref().map(|f| f.text.as_str()), Some("v1 &lt;beta&gt;"));
        assert_eq!(embed.fields[0].value, "1<br>2");
        assert!(embed.fields[0].inline);
        assert_eq!(embed.fields[1].value, "<b>2</b>");
        assert!(!embed.fields[1].inline);
    }

    #[test]
    fn test_defaults() {
        let embeds = render_embeds(vec![json!({})], &[]);
        assert_eq!(embeds[0].color, DEFAULT_EMBED_COLOR);
        assert!(embeds[0].fields.is_empty());
        assert!(embeds[0].title.is_none());
    }

    #[test]
    fn test_string_colors() {
        let embeds = render_embeds(vec![json!({"color": "#00FF00"}), json!({"color": "255"})], &[]);
        assert_eq!(embeds[0].color, 0x00FF00);
        assert_eq!(embeds[1].color, 255);
    }

    #[test]
    fn test_mistyped_keys_are_dropped_individually() {
        let payload = json!({
            "title": 42,
            "description": "still **here**",
            "color": 255.0,
            "footer": "not an object",
            "fields": [
                {"name": ["x"], "value": "kept", "inline": "yes"},
                {"name": "b", "value": "2"}
            ]
        });
        let embeds = render_embeds(vec![payload], &[]);
        assert_eq!(embeds.len(), 1);
        let embed = &embeds[0];
        assert!(embed.title.is_none());
        assert_eq!(embed.description.as_deref(), Some("still <b>here</b>"));
        assert_eq!(embed.color, 255);
        assert!(embed.footer.is_none());
        assert_eq!(embed.fields.len(), 2);
        assert_eq!(embed.fields[0].name, "");
        assert_eq!(embed.fields[0].value, "kept");
        assert!(!embed.fields[0].inline);
        assert_eq!(embed.fields[1].name, "b");
    }

    #[test]
    fn test_fractional_color_falls_back_to_default() {
        let embeds = render_embeds(vec![json!({"color": 1.5})], &[]);
        assert_eq!(embeds[0].color, DEFAULT_EMBED_COLOR);
    }

    #[test]
    fn test_undecodable_embed_is_skipped() {
        let embeds = render_embeds(vec![json!("not an embed"), json!({"title": "ok"})], &[]);
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].title.as_deref(), Some("ok"));
    }
}
