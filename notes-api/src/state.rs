use axum::extract::FromRef;

use crate::notes::NoteService;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub notes: NoteService,
}
