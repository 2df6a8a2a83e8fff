use uuid::{uuid, Uuid};

use super::{NoteDraft, NoteService};

const DEMO_NOTES: [(Uuid, &str, &str); 3] = [
    (
        uuid!("018f6138-5b4f-722d-97c5-29b927cedbd4"),
        "Welcome",
        "Notes live in memory and are gone after a restart.",
    ),
    (
        uuid!("018f6146-32f4-7948-8289-cfb5cdb2b2af"),
        "Shopping list",
        "Milk, bread, coffee",
    ),
    (
        uuid!("018f6150-0c1e-7a3b-b5d2-6e8f1a2c3d4e"),
        "Ideas",
        "Try the API docs at /__docs__",
    ),
];

/// Inserts the demo notes. Failures are logged, not returned.
pub fn seed_demo_notes(notes: &NoteService) {
    for (id, title, content) in DEMO_NOTES {
        if let Err(error) = notes.import_note(NoteDraft::new(title, content).with_id(id)) {
            tracing::warn!(%id, "skipping demo note: {error:?}");
        }
    }
    tracing::info!("seeded demo notes, {} in store", notes.count());
}
