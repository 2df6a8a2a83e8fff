mod fixtures;
mod model;
mod routes;
mod service;

pub use fixtures::seed_demo_notes;
pub use model::*;
pub use service::NoteService;

use crate::{openapi::aide::axum::ApiRouter, state::AppState};

pub fn router(state: AppState) -> ApiRouter {
    ApiRouter::new().merge(routes::router(state))
}
