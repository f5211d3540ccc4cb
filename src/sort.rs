//! Chronological ordering of messages.

use crate::model::Message;
use crate::timestamp::snowflake_millis;

/// Sort position: milliseconds since the Unix epoch, then the id.
type SortKey = (i64, u64);

/// Order messages by time.
///
/// A message with an id sorts by the creation time encoded in it; one
/// without sorts by its timestamp; one with neither keeps the position of
/// the message before it. Ties keep extraction order.
pub(crate) fn sort_chronologically(messages: Vec<Message>) -> Vec<Message> {
    let mut previous: SortKey = (i64::MIN, 0);
    let mut keyed: Vec<(SortKey, Message)> = messages
        .into_iter()
        .map(|message| {
            let key = match (message.id, message.timestamp) {
                (Some(id), _) => (snowflake_millis(id), id),
                (None, Some(ts)) => (ts.as_millisecond(), 0),
                (None, None) => previous,
            };
            previous = key;
            (key, message)
        })
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    keyed.into_iter().map(|(_, message)| message).collect()
}
