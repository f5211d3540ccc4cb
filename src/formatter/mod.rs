//! Discord-flavored markdown to HTML.
//!
//! Formatting is a fixed sequence of passes over a [`Document`]:
//!
//! 1. fenced code blocks, masked links and bare URLs are lifted out of the
//!    raw text as tokens;
//! 2. the remaining text is HTML-escaped, once;
//! 3. inline code, mentions and emoji are lifted out of the escaped text;
//! 4. block quotes, emphasis and spoilers are applied around the tokens;
//! 5. the document is rendered, each token as its own markup.
//!
//! Every pass is total: input that does not match a construct stays text.

mod document;
mod emoji;
mod mentions;

use std::sync::LazyLock;

use clap::ValueEnum;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::model::User;
use document::{Document, Renderer, TokenKind};

/// Which surface a piece of text is being formatted for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// A message body.
    #[default]
    None,
    /// Rich embed text: descriptions and field values.
    Full,
    /// Embed titles and field names.
    Lite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub masked_links: bool,
    pub newlines_to_br: bool,
    pub embed_mode: EmbedMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::MESSAGE
    }
}

impl FormatOptions {
    pub const MESSAGE: Self = Self {
        masked_links: false,
        newlines_to_br: true,
        embed_mode: EmbedMode::None,
    };

    pub const EMBED_TITLE: Self = Self {
        masked_links: false,
        newlines_to_br: false,
        embed_mode: EmbedMode::Lite,
    };

    pub const EMBED_DESCRIPTION: Self = Self {
        masked_links: true,
        newlines_to_br: false,
        embed_mode: EmbedMode::Full,
    };

    pub const EMBED_FIELD_VALUE: Self = Self {
        masked_links: true,
        newlines_to_br: true,
        embed_mode: EmbedMode::Full,
    };

    pub fn masked_links_enabled(&self) -> bool {
        match self.embed_mode {
            EmbedMode::Full => true,
            EmbedMode::Lite => false,
            EmbedMode::None => self.masked_links,
        }
    }

    fn lite(&self) -> bool {
        self.embed_mode == EmbedMode::Lite
    }
}

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```+((?:[^`]*?\n)?[\s\S]+?)\n?```+").expect("code block pattern is valid")
});

static MASKED_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\[\]\n]+)\]\(\s*<?((?:https?|ftp)://[^\s()<>]+)>?(?:\s+"([^"]*)")?\s*\)"#)
        .expect("masked link pattern is valid")
});

/// Bare URLs, optionally wrapped in `<...>` to suppress previews.
static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"<?(\b(?:(?:https?|ftp|file)://|www\.|ftp\.)",
        r"(?:\([-a-zA-Z0-9+&@#/%?=~_|!:,.\[\];]*\)|[-a-zA-Z0-9+&@#/%?=~_|!:,.\[\];])*",
        r"(?:\([-a-zA-Z0-9+&@#/%?=~_|!:,.\[\];]*\)|[-a-zA-Z0-9+&@#/%=~_$]))>?",
    ))
    .expect("url pattern is valid")
});

static URL_LITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:(?:https?|ftp|file)://|www\.|ftp\.)",
        r"(?:\([-a-zA-Z0-9+&@#/%?=~_|!:,.\[\];]*\)|[-a-zA-Z0-9+&@#/%?=~_|!:,.\[\];])*",
        r"(?:\([-a-zA-Z0-9+&@#/%?=~_|!:,.\[\];]*\)|[-a-zA-Z0-9+&@#/%=~_$])",
    ))
    .expect("url pattern is valid")
});

static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"``([^`]+)``|`([^`]+)`").expect("inline code pattern is valid"));

static MULTILINE_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^&gt;&gt;&gt; (.+)\z").expect("quote pattern is valid"));

static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^&gt; (.+)\n?").expect("quote pattern is valid"));

/// One emphasis rule; patterns with a trailing guard group re-emit it.
struct Emphasis {
    pattern: Regex,
    replacement: &'static str,
}

impl Emphasis {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("emphasis pattern is valid"),
            replacement,
        }
    }
}

/// Applied in order; bold must run before italics so `**` is never read as
/// two `*`.
static EMPHASIS: LazyLock<[Emphasis; 6]> = LazyLock::new(|| {
    [
        Emphasis::new(r"\*\*(\S(?:[\s\S]*?\S)?)\*\*([^*]|$)", "<b>${1}</b>${2}"),
        Emphasis::new(r"__(\S(?:[\s\S]*?\S)?)__([^_]|$)", "<u>${1}</u>${2}"),
        Emphasis::new(r"\*([^\s*](?:[^*]*?[^\s*])?)\*([^*]|$)", "<i>${1}</i>${2}"),
        Emphasis::new(r"\b_([^\s_](?:[^_]*?[^\s_])?)_\b", "<i>${1}</i>"),
        Emphasis::new(r"~~(\S(?:[\s\S]*?\S)?)~~", "<s>${1}</s>"),
        Emphasis::new(
            r"\|\|(\S(?:[\s\S]*?\S)?)\|\|",
            r#"<span class="spoiler-box"><span class="spoiler-text">${1}</span></span>"#,
        ),
    ]
});

/// Format `raw` as HTML, resolving mentions against `users`.
pub fn format(raw: &str, users: &[User], options: FormatOptions) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / 2);
    format_into(raw, users, options, &mut out);
    out
}

/// Like [`format`], appending to `out`.
pub fn format_into(raw: &str, users: &[User], options: FormatOptions, out: &mut String) {
    let lite = options.lite();
    let mut doc = Document::new(raw);

    doc.protect(&CODE_BLOCK, |caps| Some(TokenKind::CodeBlock(caps[1].to_string())));
    if options.masked_links_enabled() {
        doc.protect(&MASKED_LINK, masked_link);
    }
    if lite {
        doc.protect(&URL_LITE, |caps| Some(TokenKind::Url(caps[0].to_string())));
    } else {
        doc.protect(&URL, |caps| Some(TokenKind::Url(caps[1].to_string())));
    }

    doc.escape();

    doc.protect_spanning(&INLINE_CODE, TokenKind::InlineCode);
    doc.protect(&mentions::MENTION, mentions::classify);
    if !lite {
        doc.protect(&emoji::CUSTOM_EMOJI, emoji::custom);
    }
    doc.map_text(emoji::replace_shortcodes);
    doc.protect(&emoji::UNICODE_EMOJI, emoji::unicode);
    // Decided before quotes, emphasis and `<br>` add markup around the emoji.
    let jumbo = !lite && doc.is_jumbo();

    if !lite {
        doc.rewrite(|text| {
            let text = MULTILINE_QUOTE.replace(text, "<blockquote>${1}</blockquote>");
            QUOTE.replace_all(&text, "<blockquote>${1}</blockquote>").into_owned()
        });
    }
    doc.rewrite(|text| {
        EMPHASIS.iter().fold(text.to_string(), |acc, rule| {
            rule.pattern.replace_all(&acc, rule.replacement).into_owned()
        })
    });
    if options.newlines_to_br {
        doc.map_text(|text| text.replace('\n', "<br>"));
    }

    let renderer = Renderer {
        users,
        jumbo,
    };
    doc.render(&renderer, out);
}

fn masked_link(caps: &Captures<'_>) -> Option<TokenKind> {
    Some(TokenKind::MaskedLink {
        text: caps.get(1)?.as_str().to_string(),
        url: caps.get(2)?.as_str().to_string(),
        title: caps.get(3).map(|m| m.as_str().to_string()),
    })
}
