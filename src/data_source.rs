//! Diff-aware row handle.
//!
//! Every call to [`RowDataSource::clone_with_rows`] produces a new handle with
//! a fresh generation. The handle remembers which rows differ from the rows it
//! replaced, using the row fingerprint as the only change signal.

use std::collections::HashSet;
use std::sync::Arc;

use crate::rows::{PreparedRows, Row, RowKey};

#[derive(Clone, Debug, Default)]
pub struct RowDataSource {
    rows: Arc<PreparedRows>,
    changed: Arc<HashSet<RowKey>>,
    added: Arc<HashSet<RowKey>>,
    generation: u64,
}

impl RowDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the rows, recording which keys changed relative to `self`.
    pub fn clone_with_rows(&self, prepared: PreparedRows) -> Self {
        let mut changed = HashSet::new();
        let mut added = HashSet::new();

        for (key, row) in &prepared.rows {
            match self.rows.rows.get(key) {
                Some(old) if !row_has_changed(old, row) => {}
                Some(_) => {
                    changed.insert(key.clone());
                }
                None => {
                    changed.insert(key.clone());
                    added.insert(key.clone());
                }
            }
        }

        tracing::debug!(
            generation = self.generation + 1,
            rows = prepared.len(),
            changed = changed.len(),
            added = added.len(),
            "rows rebuilt"
        );

        Self {
            rows: Arc::new(prepared),
            changed: Arc::new(changed),
            added: Arc::new(added),
            generation: self.generation + 1,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&RowKey> {
        self.rows.keys.get(index)
    }

    pub fn row(&self, key: &RowKey) -> Option<&Row> {
        self.rows.rows.get(key)
    }

    /// Row at a display position (0 = newest).
    pub fn row_at(&self, index: usize) -> Option<(&RowKey, &Row)> {
        let key = self.key_at(index)?;
        self.row(key).map(|row| (key, row))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &Row)> {
        self.rows.iter()
    }

    /// Whether the row under `key` must be redrawn after the last rebuild.
    pub fn row_should_update(&self, key: &RowKey) -> bool {
        self.changed.contains(key)
    }

    pub fn changed_keys(&self) -> &HashSet<RowKey> {
        &self.changed
    }

    pub fn added_keys(&self) -> &HashSet<RowKey> {
        &self.added
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Identity comparison: two handles are the same only if one is a clone of the other.
    pub fn same_handle(&self, other: &RowDataSource) -> bool {
        self.generation == other.generation && Arc::ptr_eq(&self.rows, &other.rows)
    }
}

fn row_has_changed(old: &Row, new: &Row) -> bool {
    old.fingerprint() != new.fingerprint()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, MessageId, User};
    use crate::rows::prepare_messages;

    fn msgs(ids: &[i64]) -> Arc<Vec<Message>> {
        Arc::new(
            ids.iter()
                .map(|&id| Message {
                    id: Some(MessageId::Int(id)),
                    text: format!("message {}", id),
                    user: Some(User::new(1, "alice")),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn test_first_load_marks_everything_added() {
        let source = RowDataSource::new().clone_with_rows(prepare_messages(&msgs(&[3, 2, 1])));
        assert_eq!(source.row_count(), 3);
        assert_eq!(source.added_keys().len(), 3);
        assert_eq!(source.changed_keys().len(), 3);
        assert_eq!(source.generation(), 1);
    }

    #[test]
    fn test_prepend_touches_new_row_and_old_head() {
        let first = RowDataSource::new().clone_with_rows(prepare_messages(&msgs(&[3, 2, 1])));
        let second = first.clone_with_rows(prepare_messages(&msgs(&[4, 3, 2, 1])));

        let four = Some(MessageId::Int(4));
        let three = Some(MessageId::Int(3));
        assert!(second.added_keys().contains(&four));
        assert_eq!(second.added_keys().len(), 1);
        // 3 gained a newer neighbor.
        assert!(second.row_should_update(&three));
        assert!(!second.row_should_update(&Some(MessageId::Int(2))));
        assert!(!second.row_should_update(&Some(MessageId::Int(1))));
    }

    #[test]
    fn test_identical_content_produces_new_handle_without_changes() {
        let first = RowDataSource::new().clone_with_rows(prepare_messages(&msgs(&[2, 1])));
        let second = first.clone_with_rows(prepare_messages(&msgs(&[2, 1])));
        assert!(!first.same_handle(&second));
        assert!(first.same_handle(&first.clone()));
        assert!(second.changed_keys().is_empty());
    }

    #[test]
    fn test_row_at_walks_display_order() {
        let source = RowDataSource::new().clone_with_rows(prepare_messages(&msgs(&[9, 8])));
        let (key, row) = source.row_at(1).unwrap();
        assert_eq!(key, &Some(MessageId::Int(8)));
        assert_eq!(row.message().text, "message 8");
        assert!(source.row_at(2).is_none());
    }
}
