//! Row preparation: turns the message slice into keyed, fingerprinted rows.
//!
//! Each row knows its display-order neighbors. Neighbor ids and content are
//! folded into the fingerprint so a row is redrawn when a message next to it
//! is inserted, removed or edited. Avatar and day-separator grouping depend
//! on the neighbors.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use md5::{Digest, Md5};

use crate::message::{Message, MessageId};

/// Key of a row in the collection. Messages without an id share the `None` key.
pub type RowKey = Option<MessageId>;

/// MD5 digest of a row and its neighbors. Only a change signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 16]);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// A message augmented with its neighbors and fingerprint.
///
/// Rows borrow nothing: they share the source list and index into it.
#[derive(Clone, Debug)]
pub struct Row {
    source: Arc<Vec<Message>>,
    index: usize,
    fingerprint: Fingerprint,
}

impl Row {
    pub fn message(&self) -> &Message {
        &self.source[self.index]
    }

    /// The older neighbor (index + 1), `None` at the oldest message.
    pub fn previous(&self) -> Option<&Message> {
        self.source.get(self.index + 1)
    }

    /// The newer neighbor (index - 1), `None` at the newest message.
    pub fn next(&self) -> Option<&Message> {
        self.index.checked_sub(1).and_then(|i| self.source.get(i))
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }
}

/// Ordered keys plus the key → row map.
#[derive(Clone, Debug, Default)]
pub struct PreparedRows {
    pub keys: Vec<RowKey>,
    pub rows: HashMap<RowKey, Row>,
}

impl PreparedRows {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rows in key order. Duplicate keys resolve to the same (last written) row.
    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &Row)> {
        self.keys
            .iter()
            .filter_map(|key| self.rows.get(key).map(|row| (key, row)))
    }
}

/// Build the row collection for a message list.
///
/// Never fails: missing or duplicate ids are tolerated here and reported when
/// the rows are drawn.
pub fn prepare_messages(messages: &Arc<Vec<Message>>) -> PreparedRows {
    let mut keys = Vec::with_capacity(messages.len());
    let mut rows = HashMap::with_capacity(messages.len());

    // Serialize each message once; rows reuse their neighbors' digests.
    let digests: Vec<[u8; 16]> = messages.iter().map(content_digest).collect();

    for (i, msg) in messages.iter().enumerate() {
        let previous = messages.get(i + 1).map(|m| (m, &digests[i + 1]));
        let next = i.checked_sub(1).map(|j| (&messages[j], &digests[j]));
        let fingerprint = combine(&digests[i], previous, next);

        keys.push(msg.id.clone());
        rows.insert(
            msg.id.clone(),
            Row {
                source: Arc::clone(messages),
                index: i,
                fingerprint,
            },
        );
    }

    PreparedRows { keys, rows }
}

/// Fingerprint of a single row given its neighbors.
///
/// Covers the message's serialized content plus each neighbor's id and
/// content, so a row changes when it or either neighbor changes.
pub fn fingerprint_row(msg: &Message, previous: Option<&Message>, next: Option<&Message>) -> Fingerprint {
    let prev_digest = previous.map(content_digest);
    let next_digest = next.map(content_digest);
    combine(
        &content_digest(msg),
        previous.zip(prev_digest.as_ref()),
        next.zip(next_digest.as_ref()),
    )
}

fn content_digest(msg: &Message) -> [u8; 16] {
    let mut hasher = Md5::new();
    if let Err(e) = serde_json::to_writer(&mut hasher, msg) {
        tracing::warn!(error = %e, id = ?msg.id, "failed to serialize message for fingerprint");
    }
    finish(hasher)
}

fn combine(
    own: &[u8; 16],
    previous: Option<(&Message, &[u8; 16])>,
    next: Option<(&Message, &[u8; 16])>,
) -> Fingerprint {
    let mut hasher = Md5::new();
    hasher.update(own);

    for neighbor in [previous, next] {
        hasher.update([0x1f]);
        match neighbor {
            Some((m, digest)) => {
                write_id(&mut hasher, m.id.as_ref());
                hasher.update(digest);
            }
            None => {
                hasher.update(b"undefined");
            }
        }
    }

    Fingerprint(finish(hasher))
}

fn write_id(hasher: &mut Md5, id: Option<&MessageId>) {
    // JSON keeps 1 and "1" apart.
    if let Err(e) = serde_json::to_writer(&mut *hasher, &id) {
        tracing::warn!(error = %e, "failed to serialize neighbor id");
    }
}

fn finish(hasher: Md5) -> [u8; 16] {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::User;

    fn msg(id: i64, text: &str) -> Message {
        Message {
            id: Some(MessageId::Int(id)),
            text: text.to_string(),
            user: Some(User::new(1, "alice")),
            ..Default::default()
        }
    }

    #[test]
    fn test_neighbors_follow_reverse_order() {
        let messages = Arc::new(vec![msg(1, "a"), msg(2, "b"), msg(3, "c")]);
        let prepared = prepare_messages(&messages);

        let middle = &prepared.rows[&Some(MessageId::Int(2))];
        assert_eq!(middle.previous().unwrap().id, Some(MessageId::Int(3)));
        assert_eq!(middle.next().unwrap().id, Some(MessageId::Int(1)));

        let newest = &prepared.rows[&Some(MessageId::Int(1))];
        assert!(newest.next().is_none());
        assert_eq!(newest.previous().unwrap().id, Some(MessageId::Int(2)));

        let oldest = &prepared.rows[&Some(MessageId::Int(3))];
        assert!(oldest.previous().is_none());
        assert_eq!(oldest.next().unwrap().id, Some(MessageId::Int(2)));
    }

    #[test]
    fn test_keys_preserve_order() {
        let messages = Arc::new(vec![msg(5, "x"), msg(9, "y"), msg(2, "z")]);
        let prepared = prepare_messages(&messages);
        let ids: Vec<_> = prepared.keys.iter().cloned().collect();
        assert_eq!(
            ids,
            vec![
                Some(MessageId::Int(5)),
                Some(MessageId::Int(9)),
                Some(MessageId::Int(2))
            ]
        );
    }

    #[test]
    fn test_empty_list() {
        let prepared = prepare_messages(&Arc::new(Vec::new()));
        assert!(prepared.is_empty());
        assert_eq!(prepared.iter().count(), 0);
    }

    #[test]
    fn test_edit_changes_self_and_neighbors_only() {
        let before = Arc::new(vec![msg(1, "a"), msg(2, "b"), msg(3, "c"), msg(4, "d"), msg(5, "e")]);
        let mut edited = (*before).clone();
        edited[2].text = "c (edited)".into();
        let after = Arc::new(edited);

        let a = prepare_messages(&before);
        let b = prepare_messages(&after);

        let touched = [2, 3, 4];
        for key in &a.keys {
            let changed = a.rows[key].fingerprint() != b.rows[key].fingerprint();
            let id = match key {
                Some(MessageId::Int(n)) => *n,
                _ => unreachable!(),
            };
            assert_eq!(changed, touched.contains(&id), "row {} changed = {}", id, changed);
        }
    }

    #[test]
    fn test_duplicate_ids_collide_last_wins() {
        let messages = Arc::new(vec![msg(1, "first"), msg(1, "second")]);
        let prepared = prepare_messages(&messages);
        assert_eq!(prepared.keys.len(), 2);
        assert_eq!(prepared.rows.len(), 1);
        let rows: Vec<_> = prepared.iter().map(|(_, r)| r.message().text.clone()).collect();
        assert_eq!(rows, vec!["second", "second"]);
    }

    #[test]
    fn test_fingerprint_hex() {
        let fp = fingerprint_row(&msg(1, "a"), None, None);
        let hex = fp.to_string();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_row_matches_prepared() {
        let messages = Arc::new(vec![msg(1, "a"), msg(2, "b"), msg(3, "c")]);
        let prepared = prepare_messages(&messages);
        let direct = fingerprint_row(&messages[1], Some(&messages[2]), Some(&messages[0]));
        assert_eq!(prepared.rows[&Some(MessageId::Int(2))].fingerprint(), direct);
    }

    #[test]
    fn test_edge_rows_hash_missing_neighbors() {
        let messages = Arc::new(vec![msg(1, "a"), msg(2, "b")]);
        let prepared = prepare_messages(&messages);
        let newest = fingerprint_row(&messages[0], Some(&messages[1]), None);
        let oldest = fingerprint_row(&messages[1], None, Some(&messages[0]));
        assert_eq!(prepared.rows[&Some(MessageId::Int(1))].fingerprint(), newest);
        assert_eq!(prepared.rows[&Some(MessageId::Int(2))].fingerprint(), oldest);

        let alone = fingerprint_row(&messages[0], None, None);
        assert_ne!(alone, newest);
        assert_eq!(prepare_messages(&Arc::new(vec![msg(1, "a")])).rows[&Some(MessageId::Int(1))].fingerprint(), alone);
    }

    #[test]
    fn test_neighbor_id_type_matters() {
        let mut string_id = msg(2, "b");
        string_id.id = Some(MessageId::Str("2".into()));
        let me = msg(1, "a");
        assert_ne!(
            fingerprint_row(&me, Some(&msg(2, "b")), None),
            fingerprint_row(&me, Some(&string_id), None)
        );
    }
}
