use chrono::Utc;
use indexmap::{map::Entry, IndexMap};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::notes::{Note, NoteDraft, NoteFields, NoteId};

use super::{Error, NoteStore, Result};

/// In-memory note table guarded by a single lock.
///
/// Reads share the lock. Every check-then-act sequence (insert-if-absent,
/// replace-if-present, remove) runs under the write lock, so operations are
/// serialized and timestamps are taken in that same order.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<IndexMap<NoteId, Note>>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for InMemoryNoteStore {
    fn list(&self) -> Vec<Note> {
        self.notes.read().values().cloned().collect()
    }

    fn get(&self, id: NoteId) -> Option<Note> {
        self.notes.read().get(&id).cloned()
    }

    fn create(&self, NoteDraft { id, title, content }: NoteDraft) -> Result<Note> {
        let id = id.filter(|id| !id.is_nil()).unwrap_or_else(Uuid::new_v4);

        let mut notes = self.notes.write();
        match notes.entry(id) {
            Entry::Occupied(_) => {
                tracing::warn!(%id, "note already exists");
                Err(Error::AlreadyExists(id))
            }
            Entry::Vacant(entry) => {
                let now = Utc::now();
                let note = entry
                    .insert(Note {
                        id,
                        title,
                        content,
                        created_at: now,
                        updated_at: now,
                    })
                    .clone();
                tracing::debug!(%id, "note created");
                Ok(note)
            }
        }
    }

    fn update(&self, id: NoteId, NoteFields { title, content }: NoteFields) -> Option<Note> {
        let mut notes = self.notes.write();
        let note = notes.get_mut(&id)?;

        // never earlier than the previous write, even if the wall clock steps back
        let updated_at = Utc::now().max(note.updated_at);

        *note = Note {
            id,
            title,
            content,
            created_at: note.created_at,
            updated_at,
        };
        tracing::debug!(%id, "note updated");
        Some(note.clone())
    }

    fn delete(&self, id: NoteId) -> bool {
        let removed = self.notes.write().shift_remove(&id).is_some();
        if removed {
            tracing::debug!(%id, "note deleted");
        }
        removed
    }

    fn len(&self) -> usize {
        self.notes.read().len()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Barrier};

    use chrono::Duration;

    use super::*;

    fn fields(title: &str, content: &str) -> NoteFields {
        NoteFields {
            title: title.into(),
            content: content.into(),
        }
    }

    #[test]
    fn create_assigns_id_and_timestamps() {
        let store = InMemoryNoteStore::new();
        let before = Utc::now();

        let note = store.create(NoteDraft::new("A", "B")).unwrap();

        assert!(!note.id.is_nil());
        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
        assert_eq!(note.created_at, note.updated_at);
        assert!(note.created_at >= before);
        assert!(note.created_at - before < Duration::seconds(5));
        assert_eq!(store.get(note.id), Some(note));
    }

    #[test]
    fn create_keeps_supplied_id() {
        let store = InMemoryNoteStore::new();
        let id = Uuid::new_v4();

        let note = store.create(NoteDraft::new("A", "B").with_id(id)).unwrap();

        assert_eq!(note.id, id);
    }

    #[test]
    fn create_replaces_nil_id() {
        let store = InMemoryNoteStore::new();

        let note = store.create(NoteDraft::new("A", "B").with_id(Uuid::nil())).unwrap();

        assert!(!note.id.is_nil());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let store = InMemoryNoteStore::new();

        let ids = (0..500)
            .map(|i| store.create(NoteDraft::new(format!("t{i}"), "c")).unwrap().id)
            .collect::<HashSet<_>>();

        assert_eq!(ids.len(), 500);
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn create_with_taken_id_fails() {
        let store = InMemoryNoteStore::new();
        let id = Uuid::new_v4();
        let first = store.create(NoteDraft::new("first", "1").with_id(id)).unwrap();

        let result = store.create(NoteDraft::new("second", "2").with_id(id));

        assert_eq!(result, Err(Error::AlreadyExists(id)));
        assert_eq!(store.get(id), Some(first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_is_none() {
        let store = InMemoryNoteStore::new();

        assert_eq!(store.get(Uuid::new_v4()), None);
    }

    #[test]
    fn list_returns_insertion_order() {
        let store = InMemoryNoteStore::new();
        let a = store.create(NoteDraft::new("a", "1")).unwrap();
        let b = store.create(NoteDraft::new("b", "2")).unwrap();
        let c = store.create(NoteDraft::new("c", "3")).unwrap();
        store.delete(b.id);

        let titles = store.list().into_iter().map(|n| n.title).collect::<Vec<_>>();

        assert_eq!(titles, ["a", "c"]);
        assert_eq!(store.get(a.id).map(|n| n.title).as_deref(), Some("a"));
        assert_eq!(store.get(c.id).map(|n| n.title).as_deref(), Some("c"));
    }

    #[test]
    fn update_missing_leaves_table_unchanged() {
        let store = InMemoryNoteStore::new();
        store.create(NoteDraft::new("a", "1")).unwrap();
        let before = store.list();

        let updated = store.update(Uuid::new_v4(), fields("x", "y"));

        assert_eq!(updated, None);
        assert_eq!(store.list(), before);
    }

    #[test]
    fn update_preserves_created_at() {
        let store = InMemoryNoteStore::new();
        let created = store.create(NoteDraft::new("A", "B")).unwrap();

        let updated = store.update(created.id, fields("A2", "B2")).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "A2");
        assert_eq!(updated.content, "B2");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.get(created.id), Some(updated.clone()));
        assert_eq!(store.list(), vec![updated]);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = InMemoryNoteStore::new();
        let note = store.create(NoteDraft::new("A", "B")).unwrap();

        assert!(store.delete(note.id));
        assert_eq!(store.get(note.id), None);
        assert!(!store.delete(note.id));
        assert!(store.is_empty());
    }

    #[test]
    fn deleted_id_can_be_reused() {
        let store = InMemoryNoteStore::new();
        let id = Uuid::new_v4();
        store.create(NoteDraft::new("old", "1").with_id(id)).unwrap();
        store.delete(id);

        let note = store.create(NoteDraft::new("new", "2").with_id(id)).unwrap();

        assert_eq!(note.title, "new");
    }

    #[test]
    fn concurrent_creates_with_same_id_succeed_once() {
        const THREADS: usize = 16;

        for _ in 0..20 {
            let store = InMemoryNoteStore::new();
            let id = Uuid::new_v4();
            let barrier = Barrier::new(THREADS);

            let results = std::thread::scope(|s| {
                let handles = (0..THREADS)
                    .map(|i| {
                        let store = &store;
                        let barrier = &barrier;
                        s.spawn(move || {
                            barrier.wait();
                            store.create(NoteDraft::new(format!("t{i}"), format!("c{i}")).with_id(id))
                        })
                    })
                    .collect::<Vec<_>>();
                handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
            });

            let successes = results.iter().filter(|r| r.is_ok()).count();
            let conflicts = results
                .iter()
                .filter(|r| matches!(r, Err(Error::AlreadyExists(conflict)) if *conflict == id))
                .count();

            assert_eq!(successes, 1);
            assert_eq!(conflicts, THREADS - 1);
            assert_eq!(store.len(), 1);
        }
    }

    #[test]
    fn concurrent_updates_keep_one_whole_payload() {
        const THREADS: usize = 16;

        let store = InMemoryNoteStore::new();
        let created = store.create(NoteDraft::new("initial", "initial")).unwrap();
        let barrier = Barrier::new(THREADS);

        let written = std::thread::scope(|s| {
            let handles = (0..THREADS)
                .map(|i| {
                    let store = &store;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        store
                            .update(created.id, fields(&format!("title-{i}"), &format!("content-{i}")))
                            .unwrap()
                    })
                })
                .collect::<Vec<_>>();
            handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
        });

        let stored = store.get(created.id).unwrap();
        let suffix = stored.title.strip_prefix("title-").unwrap();

        assert_eq!(stored.content, format!("content-{suffix}"));
        assert!(written.iter().any(|n| n.title == stored.title && n.content == stored.content));
        assert_eq!(stored.created_at, created.created_at);
        assert_eq!(stored.updated_at, written.iter().map(|n| n.updated_at).max().unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_mixed_operations_never_tear() {
        const ROUNDS: usize = 200;

        let store = InMemoryNoteStore::new();
        let id = Uuid::new_v4();
        store.create(NoteDraft::new("v", "v").with_id(id)).unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..ROUNDS {
                    let value = i.to_string();
                    store.update(id, fields(&value, &value));
                }
            });
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    if store.delete(id) {
                        let _ = store.create(NoteDraft::new("v", "v").with_id(id));
                    }
                }
            });
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    if let Some(note) = store.get(id) {
                        assert_eq!(note.title, note.content);
                        assert!(note.updated_at >= note.created_at);
                    }
                    assert!(store.len() <= 1);
                }
            });
        });
    }
}
