mod memory;

pub use memory::InMemoryNoteStore;

use crate::notes::{Note, NoteDraft, NoteFields, NoteId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("note with ID {0} already exists")]
    AlreadyExists(NoteId),
}

/// Storage for notes.
///
/// Implementations own every record and hand out clones. Each mutating call
/// must be atomic with respect to every other call on the same id.
pub trait NoteStore: Send + Sync {
    /// Snapshot of all notes. Order is unspecified.
    fn list(&self) -> Vec<Note>;

    fn get(&self, id: NoteId) -> Option<Note>;

    /// Inserts a new note, generating an id when the draft has none.
    /// Fails with [`Error::AlreadyExists`] if the id is taken.
    fn create(&self, draft: NoteDraft) -> Result<Note>;

    /// Replaces title and content of an existing note. `None` if there is no such note.
    fn update(&self, id: NoteId, fields: NoteFields) -> Option<Note>;

    /// Returns whether a note was removed.
    fn delete(&self, id: NoteId) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
