use std::sync::Arc;

use crate::{store::NoteStore, Error, Result};

use super::{CreateNote, Note, NoteDraft, NoteFields, NoteId, UpdateNote};

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub fn list_notes(&self) -> Vec<Note> {
        self.store.list()
    }

    pub fn get_note(&self, note_id: NoteId) -> Result<Note> {
        self.store.get(note_id).ok_or_else(|| not_found(note_id))
    }

    /// The store assigns the id.
    pub fn create_note(&self, CreateNote { title, content }: CreateNote) -> Result<Note> {
        validate(&title, &content)?;

        self.store
            .create(NoteDraft::new(title, content))
            .map_err(|e| Error::store("Failed to create note", e))
    }

    pub fn update_note(&self, note_id: NoteId, UpdateNote { title, content }: UpdateNote) -> Result<Note> {
        validate(&title, &content)?;

        self.store
            .update(note_id, NoteFields { title, content })
            .ok_or_else(|| not_found(note_id))
    }

    pub fn delete_note(&self, note_id: NoteId) -> Result<()> {
        if self.store.delete(note_id) {
            Ok(())
        } else {
            Err(not_found(note_id))
        }
    }

    /// Inserts a note with a caller-chosen id, used for fixtures.
    pub fn import_note(&self, draft: NoteDraft) -> Result<Note> {
        let context = match draft.id {
            Some(id) => format!("Failed to import note with ID {id}"),
            None => "Failed to import note".to_string(),
        };
        validate(&draft.title, &draft.content)?;

        self.store.create(draft).map_err(|e| Error::store(context, e))
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }
}

fn not_found(note_id: NoteId) -> Error {
    Error::NotFound(format!("Note with ID {note_id} not found."))
}

/// Rejects blank fields. Values are stored untouched.
fn validate(title: &str, content: &str) -> Result<()> {
    let mut problems = Vec::new();
    if title.trim().is_empty() {
        problems.push("Title is required");
    }
    if content.trim().is_empty() {
        problems.push("Content is required");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(problems.join(", ")))
    }
}

impl std::fmt::Debug for NoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteService").field("notes", &self.store.len()).finish()
    }
}
