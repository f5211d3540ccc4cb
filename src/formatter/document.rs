//! The intermediate document the formatter rewrites.
//!
//! A message body is a sequence of text nodes and protected tokens. Tokens
//! hold spans that later passes must not touch (code, links, mentions,
//! emoji). Passes that need to see across tokens flatten the document with
//! one [`SLOT`] per token, rewrite the text, and rebuild it; real U+FFFC
//! characters in input are escaped to `&#65532;` first, so a slot in
//! flattened text is always a token.

use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::emoji::{self, Emoji};
use super::mentions::{self, Mention};
use crate::model::User;

/// Stand-in for a token in flattened text.
pub(crate) const SLOT: char = '\u{FFFC}';

static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w+#.-]+$").expect("language pattern is valid"));

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Text(String),
    Token(Token),
}

/// A protected span and the escaped source text it replaced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub literal: String,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Fenced code; body is unescaped and may start with a language line.
    CodeBlock(String),
    /// `[text](url "title")`, unescaped.
    MaskedLink {
        text: String,
        url: String,
        title: Option<String>,
    },
    /// Bare URL, unescaped.
    Url(String),
    /// Inline code, already escaped.
    InlineCode(String),
    Mention(Mention),
    Emoji(Emoji),
}

/// Context needed to turn tokens into HTML.
pub(crate) struct Renderer<'a> {
    pub users: &'a [User],
    pub jumbo: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Document {
    nodes: Vec<Node>,
    escaped: bool,
}

impl Document {
    pub fn new(raw: &str) -> Self {
        let mut doc = Self::default();
        doc.push_text(raw);
        doc
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.nodes.last_mut() {
            Some(Node::Text(last)) => last.push_str(text),
            _ => self.nodes.push(Node::Text(text.to_string())),
        }
    }

    /// Replace matches of `pattern` inside text nodes with tokens.
    ///
    /// `make` may decline a match by returning `None`; it then stays text.
    pub fn protect(&mut self, pattern: &Regex, mut make: impl FnMut(&Captures<'_>) -> Option<TokenKind>) {
        let escaped = self.escaped;
        let nodes = std::mem::take(&mut self.nodes);
        for node in nodes {
            let text = match node {
                Node::Text(text) => text,
                token => {
                    self.nodes.push(token);
                    continue;
                }
            };
            let mut last = 0;
            for caps in pattern.captures_iter(&text) {
                let Some(whole) = caps.get(0) else { continue };
                let Some(kind) = make(&caps) else { continue };
                self.push_text(&text[last..whole.start()]);
                let literal = if escaped {
                    whole.as_str().to_string()
                } else {
                    escape_html(whole.as_str())
                };
                self.nodes.push(Node::Token(Token { kind, literal }));
                last = whole.end();
            }
            self.push_text(&text[last..]);
        }
    }

    /// HTML-escape every text node. Runs exactly once.
    pub fn escape(&mut self) {
        debug_assert!(!self.escaped, "document escaped twice");
        for node in &mut self.nodes {
            if let Node::Text(text) = node {
                *text = escape_html(text);
            }
        }
        self.escaped = true;
    }

    /// Transform each text node independently.
    pub fn map_text(&mut self, f: impl Fn(&str) -> String) {
        for node in &mut self.nodes {
            if let Node::Text(text) = node {
                *text = f(text);
            }
        }
    }

    /// Like [`protect`](Self::protect), but matches may span tokens.
    ///
    /// Tokens caught inside a match are folded back into its body as their
    /// escaped source text; `make` receives the first participating group.
    pub fn protect_spanning(&mut self, pattern: &Regex, make: impl Fn(String) -> TokenKind) {
        let (flat, tokens) = self.flatten();
        let mut pending: VecDeque<Token> = tokens.into();
        let mut last = 0;
        for caps in pattern.captures_iter(&flat) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(inner) = caps.iter().skip(1).flatten().next() else {
                continue;
            };
            self.push_with_slots(&flat[last..whole.start()], &mut pending);
            let mut body = String::with_capacity(inner.len());
            for c in inner.as_str().chars() {
                match c {
                    SLOT => {
                        if let Some(token) = pending.pop_front() {
                            body.push_str(&token.literal);
                        }
                    }
                    c => body.push(c),
                }
            }
            self.nodes.push(Node::Token(Token {
                kind: make(body),
                literal: whole.as_str().to_string(),
            }));
            last = whole.end();
        }
        self.push_with_slots(&flat[last..], &mut pending);
    }

    /// Rewrite the flattened document.
    ///
    /// `f` must keep every slot; if the slot count changes the rewrite is
    /// discarded.
    pub fn rewrite(&mut self, f: impl Fn(&str) -> String) {
        debug_assert!(self.escaped, "markdown rewrite before escaping");
        let (flat, tokens) = self.flatten();
        let rewritten = f(&flat);
        let mut pending: VecDeque<Token> = tokens.into();
        if rewritten.chars().filter(|&c| c == SLOT).count() == pending.len() {
            self.push_with_slots(&rewritten, &mut pending);
        } else {
            debug!("markdown rewrite moved a protected span; keeping the original");
            self.push_with_slots(&flat, &mut pending);
        }
    }

    fn flatten(&mut self) -> (String, Vec<Token>) {
        let mut flat = String::new();
        let mut tokens = Vec::new();
        for node in std::mem::take(&mut self.nodes) {
            match node {
                Node::Text(text) => flat.push_str(&text),
                Node::Token(token) => {
                    flat.push(SLOT);
                    tokens.push(token);
                }
            }
        }
        (flat, tokens)
    }

    fn push_with_slots(&mut self, text: &str, pending: &mut VecDeque<Token>) {
        for (i, piece) in text.split(SLOT).enumerate() {
            if i > 0
                && let Some(token) = pending.pop_front()
            {
                self.nodes.push(Node::Token(token));
            }
            self.push_text(piece);
        }
    }

    /// A body is jumbo when it holds only emoji and whitespace, and fewer
    /// than [`emoji::JUMBO_LIMIT`] emoji.
    pub fn is_jumbo(&self) -> bool {
        let mut count = 0;
        for node in &self.nodes {
            match node {
                Node::Text(text) if text.trim().is_empty() => {}
                Node::Token(Token {
                    kind: TokenKind::Emoji(_),
                    ..
                }) => count += 1,
                _ => return false,
            }
        }
        count > 0 && count < emoji::JUMBO_LIMIT
    }

    pub fn render(&self, renderer: &Renderer<'_>, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Token(token) => renderer.token(&token.kind, out),
            }
        }
    }

    #[cfg(test)]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Renderer<'_> {
    fn token(&self, kind: &TokenKind, out: &mut String) {
        match kind {
            TokenKind::CodeBlock(body) => {
                let (language, code) = split_language(body);
                let _ = write!(
                    out,
                    r#"<div class="pre pre--multiline {}">{}</div>"#,
                    escape_html(language),
                    escape_html(code)
                );
            }
            TokenKind::MaskedLink { text, url, title } => {
                let _ = write!(out, r#"<a href="{}""#, escape_html(url));
                if let Some(title) = title {
                    let _ = write!(out, r#" title="{}""#, escape_html(title));
                }
                let _ = write!(out, ">{}</a>", escape_html(text));
            }
            TokenKind::Url(url) => {
                let url = escape_html(url);
                let _ = write!(out, r#"<a href="{url}">{url}</a>"#);
            }
            TokenKind::InlineCode(code) => {
                let _ = write!(out, r#"<span class="pre pre--inline">{code}</span>"#);
            }
            TokenKind::Mention(mention) => mentions::render(mention, self.users, out),
            TokenKind::Emoji(e) => emoji::render(e, self.jumbo, out),
        }
    }
}

/// Split a code block body into its language tag and code.
///
/// The first line is a language only when it is a single word and more
/// code follows it.
fn split_language(body: &str) -> (&str, &str) {
    match body.split_once('\n') {
        Some((first, rest)) if first.trim().is_empty() => ("plaintext", rest),
        Some((first, rest)) if LANGUAGE.is_match(first) && !rest.trim().is_empty() => (first, rest),
        _ => ("plaintext", body),
    }
}

/// Escape text for HTML element content and attribute values.
pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            SLOT => out.push_str("&#65532;"),
            c => out.push(c),
        }
    }
    out
}
