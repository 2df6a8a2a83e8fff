use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type NoteId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a note. A missing or nil `id` is filled in by the store.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn with_id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }
}

#[derive(Debug, Clone)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNote {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateNote {
    pub title: String,
    pub content: String,
}
