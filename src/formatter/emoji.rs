//! Custom, shortcode, and unicode emoji.
//!
//! Unicode emoji data comes from the [`emojis`] crate, compiled into the
//! binary; the alternation used to find emoji in text is built on first use.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex, RegexBuilder};

use super::document::TokenKind;

/// Bodies with this many emoji or more are never jumbo.
pub(crate) const JUMBO_LIMIT: usize = 28;

const EMOJI_CDN: &str = "https://cdn.discordapp.com/emojis";
const TWEMOJI_CDN: &str = "https://twemoji.maxcdn.com/2/svg";

const ZWJ: char = '\u{200D}';
const TEXT_SELECTOR: char = '\u{FE0E}';
const EMOJI_SELECTOR: char = '\u{FE0F}';

pub(crate) static CUSTOM_EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&lt;(?P<animated>a)?:(?P<name>\w+):(?P<id>\d+)&gt;").expect("custom emoji pattern is valid")
});

static SHORTCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(?P<name>[\w+-]+):").expect("shortcode pattern is valid"));

pub(crate) static UNICODE_EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    let mut sequences: Vec<String> = Vec::new();
    for emoji in emojis::iter() {
        let tones = emoji.skin_tones().into_iter().flatten();
        for variant in std::iter::once(emoji).chain(tones) {
            let sequence = variant.as_str();
            sequences.push(sequence.to_string());
            // Text often drops U+FE0F inside sequences. A lone character
            // only carries U+FE0F when its default presentation is text
            // (™, ‼, ©), so its bare form stays plain text.
            let bare: String = sequence.chars().filter(|&c| c != EMOJI_SELECTOR).collect();
            if bare.len() != sequence.len() && bare.chars().count() > 1 {
                sequences.push(bare);
            }
        }
    }
    sequences.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
    sequences.dedup();
    let pattern = sequences
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .size_limit(1 << 28)
        .dfa_size_limit(1 << 28)
        .build()
        .expect("emoji alternation is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Emoji {
    Custom { name: String, id: String, animated: bool },
    Unicode(String),
}

pub(crate) fn custom(caps: &Captures<'_>) -> Option<TokenKind> {
    Some(TokenKind::Emoji(Emoji::Custom {
        name: caps.name("name")?.as_str().to_string(),
        id: caps.name("id")?.as_str().to_string(),
        animated: caps.name("animated").is_some(),
    }))
}

pub(crate) fn unicode(caps: &Captures<'_>) -> Option<TokenKind> {
    Some(TokenKind::Emoji(Emoji::Unicode(caps[0].to_string())))
}

/// Replace known `:shortcode:`s with their unicode emoji.
pub(crate) fn replace_shortcodes(text: &str) -> String {
    SHORTCODE
        .replace_all(text, |caps: &Captures<'_>| {
            let name = &caps["name"];
            if let Some(emoji) = emojis::get_by_shortcode(name) {
                return emoji.as_str().to_string();
            }
            skin_tone_modifier(name).map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// `skin-tone-1` … `skin-tone-5` as Fitzpatrick modifiers.
fn skin_tone_modifier(name: &str) -> Option<char> {
    let level = name.strip_prefix("skin-tone-")?.parse::<u32>().ok()?;
    if !(1..=5).contains(&level) {
        return None;
    }
    char::from_u32(0x1F3FA + level)
}

/// The emoji with trailing variation selectors removed, unless it is a
/// joined sequence.
fn normalized(emoji: &str) -> &str {
    if emoji.contains(ZWJ) {
        emoji
    } else {
        emoji.trim_end_matches([TEXT_SELECTOR, EMOJI_SELECTOR])
    }
}

/// Hyphen-joined lowercase hex codepoints, as twemoji names its files.
pub(crate) fn codepoints(emoji: &str) -> String {
    normalized(emoji)
        .chars()
        .map(|c| format!("{:x}", u32::from(c)))
        .collect::<Vec<_>>()
        .join("-")
}

fn title(emoji: &str) -> String {
    let known = emojis::get(emoji)
        .or_else(|| emojis::get(normalized(emoji)))
        .or_else(|| emojis::get(&format!("{}{EMOJI_SELECTOR}", normalized(emoji))));
    match known {
        Some(e) => match e.shortcode() {
            Some(code) => format!(":{code}:"),
            None => format!(":{}:", e.name().replace(' ', "_")),
        },
        None => emoji.to_string(),
    }
}

pub(crate) fn render(emoji: &Emoji, jumbo: bool, out: &mut String) {
    let class = if jumbo { "emoji emoji--large" } else { "emoji" };
    let _ = match emoji {
        Emoji::Custom { name, id, animated } => {
            let ext = if *animated { "gif" } else { "png" };
            write!(
                out,
                r#"<img class="{class}" title=":{name}:" src="{EMOJI_CDN}/{id}.{ext}" alt=":{name}:">"#
            )
        }
        Emoji::Unicode(e) => write!(
            out,
            r#"<img class="{class}" title="{}" src="{TWEMOJI_CDN}/{}.svg" alt="{e}">"#,
            title(e),
            codepoints(e)
        ),
    };
}
