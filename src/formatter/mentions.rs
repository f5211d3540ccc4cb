//! User, role, and channel mentions.
//!
//! Mentions are found in escaped text, so angle brackets appear as `&lt;`
//! and `&gt;` and every captured name is already HTML-safe.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::document::{TokenKind, escape_html};
use crate::model::User;

pub(crate) static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"@everyone|@here",
        r"|&lt;@(?P<nick>!)?(?P<uid>\d+)&gt;",
        r"|&lt;@(?P<nname>[^\n]{2,32}?)#(?P<ndisc>\d{4}) \((?P<nid>\d+)\)&gt;",
        r"|&lt;@&amp;(?P<rid>\d+)&gt;",
        r"|&lt;@&amp;(?P<rname>[^\n]{1,100}?)&gt;",
        r"|&lt;#(?P<cid>\d+)&gt;",
        r"|&lt;#(?P<cname>[^\n]{1,100}?)&gt;",
        r"|@(?P<lname>[^\s@#][^\n@#]{1,31}?)#(?P<ldisc>\d{4})",
    ))
    .expect("mention pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Mention {
    Everyone,
    Here,
    /// `<@id>`, or `<@!id>` when `nick` is set.
    UserId { id: String, nick: bool },
    /// `<@name#1234 (id)>`, written by logs that resolve mentions themselves.
    NamedUser { name: String, id: String },
    /// `@name#1234`
    Legacy { name: String, discriminator: String },
    RoleId(String),
    RoleName(String),
    ChannelId(String),
    ChannelName(String),
}

/// Turn a [`MENTION`] match into a token.
pub(crate) fn classify(caps: &Captures<'_>) -> Option<TokenKind> {
    let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
    let mention = if let Some(id) = group("uid") {
        Mention::UserId {
            id,
            nick: caps.name("nick").is_some(),
        }
    } else if let (Some(name), Some(id)) = (group("nname"), group("nid")) {
        Mention::NamedUser { name, id }
    } else if let Some(id) = group("rid") {
        Mention::RoleId(id)
    } else if let Some(name) = group("rname") {
        Mention::RoleName(name)
    } else if let Some(id) = group("cid") {
        Mention::ChannelId(id)
    } else if let Some(name) = group("cname") {
        Mention::ChannelName(name)
    } else if let (Some(name), Some(discriminator)) = (group("lname"), group("ldisc")) {
        Mention::Legacy {
            name,
            discriminator,
        }
    } else {
        match &caps[0] {
            "@everyone" => Mention::Everyone,
            "@here" => Mention::Here,
            _ => return None,
        }
    };
    Some(TokenKind::Mention(mention))
}

pub(crate) fn render(mention: &Mention, users: &[User], out: &mut String) {
    let _ = match mention {
        Mention::Everyone => out.write_str(r#"<span class="mentioned mention no-select">@everyone</span>"#),
        Mention::Here => out.write_str(r#"<span class="mentioned mention no-select">@here</span>"#),
        Mention::UserId { id, nick } => match users.iter().find(|u| u.id.as_deref() == Some(id.as_str())) {
            Some(user) => write!(
                out,
                r#"<span class="mention user" title="{id}">@{}</span>"#,
                escape_html(&user.username)
            ),
            None => {
                let bang = if *nick { "!" } else { "" };
                write!(out, r#"<span class="mention user" title="{id}">&lt;@{bang}{id}&gt;</span>"#)
            }
        },
        Mention::NamedUser { name, id } => {
            write!(out, r#"<span class="mention user" title="{id}">@{name}</span>"#)
        }
        Mention::Legacy {
            name,
            discriminator,
        } => {
            let user = users.iter().find(|u| {
                escape_html(&u.username) == *name && u.discriminator == *discriminator
            });
            match user.and_then(|u| u.id.as_deref()) {
                Some(id) => write!(out, r#"<span class="mention user" title="{id}">@{name}</span>"#),
                None => write!(
                    out,
                    r#"<span class="mention" title="{name}#{discriminator}">@{name}</span>"#
                ),
            }
        }
        Mention::RoleId(id) => write!(out, r#"<span class="mention">&lt;@&amp;{id}&gt;</span>"#),
        Mention::RoleName(name) => {
            write!(out, r#"<span class="mention" title="Role: {name}">@{name}</span>"#)
        }
        Mention::ChannelId(id) => write!(out, r#"<span class="mention">&lt;#{id}&gt;</span>"#),
        Mention::ChannelName(name) => write!(out, r#"<span class="mention">#{name}</span>"#),
    };
}
