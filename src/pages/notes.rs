use crate::error::{AppError, AppResult};
use crate::model::{Millis, QuickNote};
use crate::store::{add_typed, load_typed, patch, Collection, CollectionStore};
use serde_json::json;

/// Sticky-note colours offered by the notes board. The first is the default.
pub const NOTE_COLORS: [&str; 4] = ["#fef9c3", "#dbeafe", "#dcfce7", "#ffe4e6"];

#[derive(Debug, Default)]
pub struct NotesPage {
    notes: Vec<QuickNote>,
}

impl NotesPage {
    /// Loads unarchived notes, newest first.
    pub fn refresh(&mut self, store: &dyn CollectionStore) -> AppResult<()> {
        let mut notes: Vec<QuickNote> = load_typed::<QuickNote>(store, Collection::QuickNotes)?
            .into_iter()
            .filter(|n| !n.is_archived)
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.notes = notes;
        Ok(())
    }

    pub fn notes(&self) -> &[QuickNote] {
        &self.notes
    }

    pub fn create(
        &mut self,
        store: &mut dyn CollectionStore,
        content: &str,
        color: Option<&str>,
        now: Millis,
    ) -> AppResult<String> {
        if content.trim().is_empty() {
            return Err(AppError::bad_params("note content must not be empty"));
        }
        let color = match color {
            None => NOTE_COLORS[0],
            Some(c) => NOTE_COLORS
                .into_iter()
                .find(|known| known.eq_ignore_ascii_case(c.trim()))
                .ok_or_else(|| AppError::bad_params(format!("unknown note color: {}", c)))?,
        };
        let note = QuickNote {
            id: String::new(),
            content: content.to_string(),
            color: color.to_string(),
            is_archived: false,
            created_at: now,
        };
        let id = add_typed(store, Collection::QuickNotes, &note)?;
        self.refresh(store)?;
        Ok(id)
    }

    /// Notes are never deleted, only archived.
    pub fn archive(&mut self, store: &mut dyn CollectionStore, note_id: &str) -> AppResult<()> {
        store.update_item(
            Collection::QuickNotes,
            note_id,
            patch([("isArchived", json!(true))]),
        )?;
        tracing::debug!(note_id, "note archived");
        self.refresh(store)
    }
}
