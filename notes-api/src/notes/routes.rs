use crate::{
    openapi::{
        aide::axum::{routing::get_with, ApiRouter, IntoApiResponse},
        Created, Json, NoContent, Path,
    },
    state::AppState,
};
use axum::extract::State;

use schemars::JsonSchema;

use serde::Deserialize;

use super::{CreateNote, NoteId, NoteService, UpdateNote};

#[derive(Debug, Deserialize, JsonSchema)]
struct NoteIdPath {
    id: NoteId,
}

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route(
            "/api/notes",
            get_with(list_notes, |t| t.summary("List all notes")).post_with(create_note, |t| {
                t.summary("Create a note")
                    .description("The server assigns the id. The response carries a Location header.")
            }),
        )
        .api_route(
            "/api/notes/:id",
            get_with(get_note, |t| t.summary("Get a note by its ID"))
                .put_with(update_note, |t| t.summary("Replace the title and content of a note"))
                .delete_with(delete_note, |t| t.summary("Delete a note")),
        )
        .with_state(state)
}

async fn list_notes(State(notes): State<NoteService>) -> impl IntoApiResponse {
    Json(notes.list_notes())
}

async fn create_note(
    State(notes): State<NoteService>,
    Json(args): Json<CreateNote>,
) -> impl IntoApiResponse {
    notes.create_note(args).map(|note| Created {
        location: format!("/api/notes/{}", note.id),
        body: note,
    })
}

async fn get_note(
    State(notes): State<NoteService>,
    Path(NoteIdPath { id }): Path<NoteIdPath>,
) -> impl IntoApiResponse {
    notes.get_note(id).map(Json)
}

async fn update_note(
    State(notes): State<NoteService>,
    Path(NoteIdPath { id }): Path<NoteIdPath>,
    Json(args): Json<UpdateNote>,
) -> impl IntoApiResponse {
    notes.update_note(id, args).map(Json)
}

async fn delete_note(
    State(notes): State<NoteService>,
    Path(NoteIdPath { id }): Path<NoteIdPath>,
) -> impl IntoApiResponse {
    notes.delete_note(id).map(|()| NoContent)
}
