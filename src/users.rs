//! Author identity resolution and avatar URLs.
//!
//! Each distinct author becomes exactly one [`User`]: records are keyed by
//! user id when one is logged, else by `username#discriminator`. The first
//! record seen for a key decides the user's fields.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::User;

/// Username given to authors a log does not name.
pub const UNKNOWN_USERNAME: &str = "Unknown User";

/// Discriminator given to authors a log does not number.
pub const DEFAULT_DISCRIMINATOR: &str = "0000";

const CDN: &str = "https://cdn.discordapp.com";

static AVATAR_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/avatars/(?P<uid>\d+)/(?P<hash>\w+)\.\w+").expect("avatar path pattern is valid")
});

/// Looks up avatar hashes for users a log gives no avatar for.
///
/// Implementations typically call the Discord API. They are consulted at
/// most once per user id per parse; failures fall back to the default avatar.
pub trait UserAvatarResolver {
    fn resolve(&self, user_id: &str) -> Result<Option<String>, ResolveError>;
}

/// A failed avatar lookup.
#[derive(Debug, Clone, Error)]
#[error("avatar lookup for user {user_id} failed: {reason}")]
pub struct ResolveError {
    pub user_id: String,
    pub reason: String,
}

impl<F> UserAvatarResolver for F
where
    F: Fn(&str) -> Result<Option<String>, ResolveError>,
{
    fn resolve(&self, user_id: &str) -> Result<Option<String>, ResolveError> {
        self(user_id)
    }
}

/// CDN URL for a custom avatar; `a_` hashes are animated.
pub fn avatar_url(user_id: &str, hash: &str) -> String {
    let ext = if hash.starts_with("a_") { "gif" } else { "png" };
    format!("{CDN}/avatars/{user_id}/{hash}.{ext}")
}

/// One of Discord's five default avatars, chosen by discriminator.
pub fn default_avatar_url(discriminator: &str) -> String {
    let index = discriminator.parse::<u32>().map_or(0, |d| d % 5);
    format!("{CDN}/embed/avatars/{index}.png")
}

/// What one record says about its author.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorRecord<'a> {
    pub id: Option<&'a str>,
    pub username: Option<&'a str>,
    pub discriminator: Option<&'a str>,
    /// Avatar hash or full avatar URL.
    pub avatar: Option<&'a str>,
    pub bot: bool,
}

/// Memoizing author resolver for one parse.
pub(crate) struct UserResolver<'r> {
    avatars: Option<&'r dyn UserAvatarResolver>,
    users: HashMap<String, User>,
}

impl<'r> UserResolver<'r> {
    pub fn new(avatars: Option<&'r dyn UserAvatarResolver>) -> Self {
        Self {
            avatars,
            users: HashMap::new(),
        }
    }

    /// The canonical user for `record`, created on first sight.
    pub fn resolve(&mut self, record: AuthorRecord<'_>) -> User {
        let id = record
            .id
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != "0");
        let username = record
            .username
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_USERNAME);
        let discriminator = record
            .discriminator
            .filter(|d| d.len() == 4 && d.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(DEFAULT_DISCRIMINATOR);
        let key = match id {
            Some(id) => id.to_string(),
            None => format!("{username}#{discriminator}"),
        };
        if let Some(user) = self.users.get(&key) {
            return user.clone();
        }

        let avatar_url = self.avatar_for(id, discriminator, record.avatar);
        let user = User {
            id: id.map(str::to_string),
            username: username.to_string(),
            discriminator: discriminator.to_string(),
            avatar_url,
            bot: record.bot,
        };
        debug!(user = %user, key = %key, "new author");
        self.users.insert(key, user.clone());
        user
    }

    fn avatar_for(&self, id: Option<&str>, discriminator: &str, avatar: Option<&str>) -> String {
        let avatar = avatar.map(str::trim).filter(|a| !a.is_empty());
        if let Some(avatar) = avatar {
            if avatar.starts_with("http") {
                return match AVATAR_PATH.captures(avatar) {
                    Some(caps) => avatar_url(&caps["uid"], &caps["hash"]),
                    None => avatar.to_string(),
                };
            }
            if let Some(id) = id {
                return avatar_url(id, avatar);
            }
        }
        if let (Some(id), Some(resolver)) = (id, self.avatars)
            && id.bytes().all(|b| b.is_ascii_digit())
        {
            match resolver.resolve(id) {
                Ok(Some(hash)) => return avatar_url(id, &hash),
                Ok(None) => {}
                Err(err) => warn!(%err, "using default avatar"),
            }
        }
        default_avatar_url(discriminator)
    }

    /// All resolved users, sorted by username then identity key.
    pub fn into_users(self) -> Vec<User> {
        let mut users: Vec<(String, User)> = self.users.into_iter().collect();
        users.sort_by(|(ka, a), (kb, b)| a.username.cmp(&b.username).then_with(|| ka.cmp(kb)));
        users.into_iter().map(|(_, user)| user).collect()
    }
}
