//! Calendar page: grid view state, drag gestures, inline edits and the
//! store writes they trigger.

pub mod drag;
pub mod grid;

use crate::confirm::DeleteConfirmation;
use crate::error::{AppError, AppResult};
use crate::i18n::{self, Language};
use crate::model::{CalendarEvent, EventType, Intervention, Millis, QuickNote};
use crate::mutation::{MutationKind, MutationLog, MutationRecord, MutationStatus};
use crate::store::{add_typed, load_typed, patch, Collection, CollectionStore, StoreError};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use drag::{DragCommand, DragMachine, DragPayload, DragRejected, DragSnapshot, DropTarget};
use grid::{GridCell, ViewMode};
use serde::Serialize;
use serde_json::json;

/// Local hour a promoted note is scheduled at.
const PROMOTED_HOUR: u32 = 9;

/// Field values of the inline event editor, as typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEdit {
    pub event_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DropOutcome {
    #[serde(rename_all = "camelCase")]
    Promoted { event_id: String, mutation_id: u64 },
    #[serde(rename_all = "camelCase")]
    DeleteRequested { event_id: String },
    Ignored,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub view: ViewMode,
    pub reference: NaiveDate,
    pub title: String,
    pub weekdays: [&'static str; 7],
    pub cells: Vec<GridCell>,
    pub unscheduled_notes: Vec<QuickNote>,
    pub drag: DragSnapshot,
    pub editing: Option<EventEdit>,
    pub pending_delete: Option<String>,
}

pub struct CalendarPage<Tz: TimeZone> {
    tz: Tz,
    reference: NaiveDateTime,
    view: ViewMode,
    events: Vec<CalendarEvent>,
    interventions: Vec<Intervention>,
    notes: Vec<QuickNote>,
    drag: DragMachine,
    editing: Option<EventEdit>,
    confirmation: DeleteConfirmation,
    mutations: MutationLog,
}

impl<Tz: TimeZone> CalendarPage<Tz> {
    pub fn new(tz: Tz, now: NaiveDateTime, view: ViewMode) -> Self {
        Self {
            tz,
            reference: now,
            view,
            events: Vec::new(),
            interventions: Vec::new(),
            notes: Vec::new(),
            drag: DragMachine::default(),
            editing: None,
            confirmation: DeleteConfirmation::default(),
            mutations: MutationLog::default(),
        }
    }

    /// Reloads events, interventions and unarchived notes.
    pub fn refresh(&mut self, store: &dyn CollectionStore) -> AppResult<()> {
        self.events = load_typed(store, Collection::Events)?;
        self.interventions = load_typed(store, Collection::Interventions)?;
        self.notes = load_typed::<QuickNote>(store, Collection::QuickNotes)?
            .into_iter()
            .filter(|n| !n.is_archived)
            .collect();
        Ok(())
    }

    #[cfg(test)]
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    #[cfg(test)]
    pub fn unscheduled_notes(&self) -> &[QuickNote] {
        &self.notes
    }

    #[cfg(test)]
    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn navigate(&mut self, delta: i32) -> AppResult<()> {
        self.reference = grid::navigate(self.reference, self.view, delta)
            .ok_or_else(|| AppError::bad_params("navigation out of range"))?;
        Ok(())
    }

    pub fn go_to_today(&mut self, now: NaiveDateTime) {
        self.reference = now;
    }

    pub fn view_model(&self, today: NaiveDate, language: Language) -> CalendarView {
        let (title, cells) = match self.view {
            ViewMode::Month => (
                i18n::month_title(language, self.reference.date()),
                grid::month_grid(
                    &self.tz,
                    self.reference.date(),
                    &self.events,
                    &self.interventions,
                    today,
                ),
            ),
            ViewMode::Week => {
                let monday = grid::start_of_week(self.reference).date();
                let cells = grid::week_grid(
                    &self.tz,
                    self.reference,
                    &self.events,
                    &self.interventions,
                    today,
                );
                (
                    i18n::week_title(language, monday, monday + Duration::days(6)),
                    cells.into_iter().map(GridCell::Day).collect(),
                )
            }
        };
        CalendarView {
            view: self.view,
            reference: self.reference.date(),
            title,
            weekdays: i18n::dictionary(language).weekdays,
            cells,
            unscheduled_notes: self.notes.clone(),
            drag: self.drag.snapshot(),
            editing: self.editing.clone(),
            pending_delete: self.confirmation.pending().map(str::to_string),
        }
    }

    /// Creates an event from the day-cell form. Unparseable time parts count as zero.
    pub fn add_event(
        &mut self,
        store: &mut dyn CollectionStore,
        date: NaiveDate,
        time: &str,
        title: &str,
        kind: EventType,
    ) -> AppResult<(String, u64)> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::bad_params("title is required"));
        }
        let at = grid::local_millis(&self.tz, date.and_time(grid::parse_time_lenient(time)));
        self.insert_event(store, title.to_string(), at, kind)
    }

    fn insert_event(
        &mut self,
        store: &mut dyn CollectionStore,
        title: String,
        date: Millis,
        kind: EventType,
    ) -> AppResult<(String, u64)> {
        let mutation_id = self.mutations.begin(MutationKind::AddEvent {
            title: title.clone(),
            date,
            event_type: kind,
        });
        let event = CalendarEvent {
            id: String::new(),
            title,
            date,
            kind,
            linked_note_id: None,
        };
        let event_id = match add_typed(store, Collection::Events, &event) {
            Ok(id) => id,
            Err(e) => return Err(self.failed(store, mutation_id, e, true)),
        };
        self.mutations.commit(mutation_id);
        self.reload(store);
        Ok((event_id, mutation_id))
    }

    pub fn drag_note(&mut self, note_id: &str) -> AppResult<()> {
        let note = self
            .notes
            .iter()
            .find(|n| n.id == note_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("note {}", note_id)))?;
        self.start_drag(DragPayload::Note(note))
    }

    pub fn drag_event(&mut self, event_id: &str) -> AppResult<()> {
        if !self.events.iter().any(|e| e.id == event_id) {
            return Err(AppError::NotFound(format!("event {}", event_id)));
        }
        self.start_drag(DragPayload::EventId(event_id.to_string()))
    }

    fn start_drag(&mut self, payload: DragPayload) -> AppResult<()> {
        self.drag
            .start(payload, self.editing.is_some())
            .map_err(|rejected| match rejected {
                DragRejected::EditInProgress => {
                    AppError::InvalidState("an event is being edited".into())
                }
            })
    }

    pub fn drag_over(&mut self, target: DropTarget) {
        self.drag.over(target);
    }

    pub fn drag_leave(&mut self, target: DropTarget) {
        self.drag.leave(target);
    }

    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    pub fn drag_snapshot(&self) -> DragSnapshot {
        self.drag.snapshot()
    }

    pub fn drop_on(
        &mut self,
        store: &mut dyn CollectionStore,
        target: DropTarget,
    ) -> AppResult<DropOutcome> {
        match self.drag.drop_on(target) {
            Some(DragCommand::PromoteNote { note, day }) => {
                let (event_id, mutation_id) = self.promote_note(store, note, day)?;
                Ok(DropOutcome::Promoted {
                    event_id,
                    mutation_id,
                })
            }
            Some(DragCommand::RequestDelete { event_id }) => {
                self.request_delete(event_id.clone());
                Ok(DropOutcome::DeleteRequested { event_id })
            }
            None => Ok(DropOutcome::Ignored),
        }
    }

    /// Turns a note into a general event at 09:00 on `day`, then archives the note.
    ///
    /// If archiving fails the new event is deleted again so the note is not
    /// scheduled twice on retry.
    pub fn promote_note(
        &mut self,
        store: &mut dyn CollectionStore,
        note: QuickNote,
        day: NaiveDate,
    ) -> AppResult<(String, u64)> {
        self.notes.retain(|n| n.id != note.id);
        let nine = NaiveTime::from_hms_opt(PROMOTED_HOUR, 0, 0).unwrap_or_default();
        let date = grid::local_millis(&self.tz, day.and_time(nine));
        let mutation_id = self.mutations.begin(MutationKind::PromoteNote {
            note: note.clone(),
            day,
        });

        let event = CalendarEvent {
            id: String::new(),
            title: note.content.clone(),
            date,
            kind: EventType::General,
            linked_note_id: Some(note.id.clone()),
        };
        let event_id = match add_typed(store, Collection::Events, &event) {
            Ok(id) => id,
            Err(e) => return Err(self.failed(store, mutation_id, e, true)),
        };

        let archive = patch([("isArchived", json!(true))]);
        if let Err(e) = store.update_item(Collection::QuickNotes, &note.id, archive) {
            let compensated = match store.delete_item(Collection::Events, &event_id) {
                Ok(()) => true,
                Err(undo) => {
                    tracing::error!(
                        event_id = %event_id,
                        error = %undo,
                        "could not remove event after failed note archive"
                    );
                    false
                }
            };
            return Err(self.failed(store, mutation_id, e, compensated));
        }

        self.mutations.commit(mutation_id);
        tracing::info!(note_id = %note.id, event_id = %event_id, "note promoted to event");
        self.reload(store);
        Ok((event_id, mutation_id))
    }

    pub fn editing(&self) -> Option<&EventEdit> {
        self.editing.as_ref()
    }

    pub fn start_edit(&mut self, event_id: &str) -> AppResult<&EventEdit> {
        let event = self
            .events
            .iter()
            .find(|e| e.id == event_id)
            .ok_or_else(|| AppError::NotFound(format!("event {}", event_id)))?;
        let local = grid::local_datetime(&self.tz, event.date)
            .ok_or_else(|| AppError::InvalidState("event date out of range".into()))?;
        let edit = EventEdit {
            event_id: event.id.clone(),
            date: grid::format_date_field(local.date()),
            time: local.format("%H:%M").to_string(),
        };
        Ok(self.editing.insert(edit))
    }

    pub fn update_edit(&mut self, date: Option<String>, time: Option<String>) -> AppResult<()> {
        let edit = self
            .editing
            .as_mut()
            .ok_or_else(|| AppError::InvalidState("no event is being edited".into()))?;
        if let Some(date) = date {
            edit.date = date;
        }
        if let Some(time) = time {
            edit.time = time;
        }
        Ok(())
    }

    /// Writes the edited date and time back as one timestamp.
    ///
    /// An empty date leaves the editor open and writes nothing; an empty time
    /// means midnight. Returns the move's mutation id when a write happened.
    pub fn save_edit(&mut self, store: &mut dyn CollectionStore) -> AppResult<Option<u64>> {
        let edit = self
            .editing
            .as_ref()
            .ok_or_else(|| AppError::InvalidState("no event is being edited".into()))?;
        if edit.date.trim().is_empty() {
            return Ok(None);
        }
        let date = grid::parse_date_field(&edit.date)
            .ok_or_else(|| AppError::bad_params(format!("invalid date: {}", edit.date)))?;
        let time = if edit.time.trim().is_empty() {
            NaiveTime::default()
        } else {
            grid::parse_time_field(&edit.time)
                .ok_or_else(|| AppError::bad_params(format!("invalid time: {}", edit.time)))?
        };
        let event_id = edit.event_id.clone();
        self.editing = None;
        let to = grid::local_millis(&self.tz, date.and_time(time));
        self.move_event(store, &event_id, to).map(Some)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Reschedules an event. Only the `date` field is written.
    pub fn move_event(
        &mut self,
        store: &mut dyn CollectionStore,
        event_id: &str,
        to: Millis,
    ) -> AppResult<u64> {
        let idx = self
            .events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or_else(|| AppError::NotFound(format!("event {}", event_id)))?;
        let from = self.events[idx].date;
        self.events[idx].date = to;
        let mutation_id = self.mutations.begin(MutationKind::MoveEvent {
            event_id: event_id.to_string(),
            from,
            to,
        });

        if let Err(e) = store.update_item(Collection::Events, event_id, patch([("date", json!(to))]))
        {
            self.events[idx].date = from;
            return Err(self.failed(store, mutation_id, e, true));
        }
        self.mutations.commit(mutation_id);
        self.reload(store);
        Ok(mutation_id)
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.confirmation.pending()
    }

    pub fn request_delete(&mut self, event_id: impl Into<String>) {
        self.confirmation.request(event_id);
    }

    pub fn cancel_delete(&mut self) {
        self.confirmation.cancel();
    }

    /// Deletes the pending event, if any. Returns the mutation id.
    pub fn confirm_delete(&mut self, store: &mut dyn CollectionStore) -> AppResult<Option<u64>> {
        match self.confirmation.confirm() {
            Some(event_id) => self.delete_event(store, &event_id).map(Some),
            None => Ok(None),
        }
    }

    fn delete_event(&mut self, store: &mut dyn CollectionStore, event_id: &str) -> AppResult<u64> {
        let mutation_id = self.mutations.begin(MutationKind::DeleteEvent {
            event_id: event_id.to_string(),
        });
        if let Err(e) = store.delete_item(Collection::Events, event_id) {
            return Err(self.failed(store, mutation_id, e, true));
        }
        self.mutations.commit(mutation_id);
        tracing::info!(event_id = %event_id, "event deleted");
        self.reload(store);
        Ok(mutation_id)
    }

    pub fn mutations(&self) -> impl Iterator<Item = &MutationRecord> {
        self.mutations.records()
    }

    /// Runs a failed mutation again under a new id, which supersedes the old
    /// record. Failures that left partial changes in the store are not retried,
    /// nor are writes whose note or event changed since.
    pub fn retry(&mut self, store: &mut dyn CollectionStore, mutation_id: u64) -> AppResult<u64> {
        let record = self
            .mutations
            .get(mutation_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("mutation {}", mutation_id)))?;
        match record.status {
            MutationStatus::Failed {
                compensated: true, ..
            } => {}
            MutationStatus::Failed { .. } => {
                return Err(AppError::InvalidState(
                    "mutation left partial changes; reload and redo it by hand".into(),
                ))
            }
            MutationStatus::Superseded { by } => {
                return Err(AppError::InvalidState(format!(
                    "mutation was already retried as {}",
                    by
                )))
            }
            _ => return Err(AppError::InvalidState("mutation has not failed".into())),
        }
        self.check_still_applies(&record.kind)?;
        tracing::info!(mutation_id, "retrying calendar mutation");
        let result = match record.kind {
            MutationKind::AddEvent {
                title,
                date,
                event_type,
            } => self.insert_event(store, title, date, event_type).map(|(_, m)| m),
            MutationKind::PromoteNote { note, day } => {
                self.promote_note(store, note, day).map(|(_, m)| m)
            }
            MutationKind::MoveEvent { event_id, to, .. } => self.move_event(store, &event_id, to),
            MutationKind::DeleteEvent { event_id } => self.delete_event(store, &event_id),
        };
        let replacement = match &result {
            Ok(id) => Some(*id),
            Err(AppError::MutationFailed { mutation_id: next, .. }) => Some(*next),
            Err(_) => None,
        };
        if let Some(by) = replacement {
            self.mutations.supersede(mutation_id, by);
        }
        result
    }

    /// Rejects a retry whose target changed since the mutation failed.
    fn check_still_applies(&self, kind: &MutationKind) -> AppResult<()> {
        match kind {
            MutationKind::AddEvent { .. } => Ok(()),
            MutationKind::PromoteNote { note, .. } => {
                if self.notes.iter().any(|n| n.id == note.id) {
                    Ok(())
                } else {
                    Err(AppError::InvalidState(format!(
                        "note {} is no longer unscheduled",
                        note.id
                    )))
                }
            }
            MutationKind::MoveEvent { event_id, from, .. } => {
                match self.events.iter().find(|e| &e.id == event_id) {
                    Some(event) if event.date == *from => Ok(()),
                    Some(_) => Err(AppError::InvalidState(format!(
                        "event {} was moved since",
                        event_id
                    ))),
                    None => Err(AppError::InvalidState(format!(
                        "event {} no longer exists",
                        event_id
                    ))),
                }
            }
            MutationKind::DeleteEvent { event_id } => {
                if self.events.iter().any(|e| &e.id == event_id) {
                    Ok(())
                } else {
                    Err(AppError::InvalidState(format!(
                        "event {} no longer exists",
                        event_id
                    )))
                }
            }
        }
    }

    /// Reload after a committed write. The write stands even if this fails.
    fn reload(&mut self, store: &dyn CollectionStore) {
        if let Err(e) = self.refresh(store) {
            tracing::error!(error = %e, "calendar reload after commit");
        }
    }

    /// Marks the mutation failed and reloads from the store.
    fn failed(
        &mut self,
        store: &dyn CollectionStore,
        mutation_id: u64,
        error: StoreError,
        compensated: bool,
    ) -> AppError {
        let message = error.to_string();
        tracing::warn!(mutation_id, error = %message, compensated, "calendar mutation failed");
        self.mutations.fail(mutation_id, message.clone(), compensated);
        if let Err(e) = self.refresh(store) {
            tracing::error!(error = %e, "calendar reload after failure");
        }
        AppError::MutationFailed {
            mutation_id,
            message,
            compensated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{FailingStore, Op};
    use crate::store::{get_typed, to_document, MemoryStore};
    use chrono::Utc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        ymd(y, m, d).and_hms_opt(h, min, 0).expect("time")
    }

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        let note = QuickNote {
            id: "n1".into(),
            content: "Call parent".into(),
            color: "#fef9c3".into(),
            is_archived: false,
            created_at: 1,
        };
        let event = CalendarEvent {
            id: "e1".into(),
            title: "Exam 3A".into(),
            date: grid::local_millis(&Utc, at(2024, 3, 5, 8, 0)),
            kind: EventType::Exam,
            linked_note_id: None,
        };
        let other = CalendarEvent {
            id: "e2".into(),
            title: "Meeting".into(),
            date: grid::local_millis(&Utc, at(2024, 3, 6, 16, 0)),
            kind: EventType::Meeting,
            linked_note_id: None,
        };
        store
            .restore_collection(
                Collection::QuickNotes,
                vec![to_document(Collection::QuickNotes, &note).expect("doc")],
            )
            .expect("notes");
        store
            .restore_collection(
                Collection::Events,
                vec![
                    to_document(Collection::Events, &event).expect("doc"),
                    to_document(Collection::Events, &other).expect("doc"),
                ],
            )
            .expect("events");
        store
    }

    fn page(store: &dyn CollectionStore) -> CalendarPage<Utc> {
        let mut page = CalendarPage::new(Utc, at(2024, 3, 1, 12, 0), ViewMode::Month);
        page.refresh(store).expect("refresh");
        page
    }

    fn stored_events(store: &dyn CollectionStore) -> Vec<CalendarEvent> {
        get_typed(store, Collection::Events).expect("events")
    }

    #[test]
    fn dropping_a_note_on_a_day_promotes_it() {
        let mut store = seeded();
        let mut page = page(&store);

        page.drag_note("n1").expect("drag");
        let outcome = page
            .drop_on(&mut store, DropTarget::Day(ymd(2024, 3, 12)))
            .expect("drop");
        let event_id = match outcome {
            DropOutcome::Promoted { event_id, .. } => event_id,
            other => panic!("expected promotion, got {:?}", other),
        };

        let promoted: Vec<CalendarEvent> = stored_events(&store)
            .into_iter()
            .filter(|e| e.linked_note_id.is_some())
            .collect();
        assert_eq!(promoted.len(), 1);
        assert_eq!(promoted[0].id, event_id);
        assert_eq!(promoted[0].title, "Call parent");
        assert_eq!(promoted[0].date, grid::local_millis(&Utc, at(2024, 3, 12, 9, 0)));
        assert_eq!(promoted[0].kind, EventType::General);
        assert_eq!(promoted[0].linked_note_id.as_deref(), Some("n1"));

        let notes: Vec<QuickNote> = get_typed(&store, Collection::QuickNotes).expect("notes");
        assert!(notes[0].is_archived);
        assert!(page.unscheduled_notes().is_empty());
        assert_eq!(page.drag_snapshot().state, "idle");
    }

    #[test]
    fn dropping_a_note_on_trash_does_nothing() {
        let mut store = seeded();
        let mut page = page(&store);
        page.drag_note("n1").expect("drag");
        let outcome = page.drop_on(&mut store, DropTarget::Trash).expect("drop");
        assert_eq!(outcome, DropOutcome::Ignored);
        assert_eq!(stored_events(&store).len(), 2);
        assert_eq!(page.unscheduled_notes().len(), 1);
    }

    #[test]
    fn saving_an_edit_moves_only_the_date() {
        let mut store = seeded();
        let mut page = page(&store);
        let before = store.get_items(Collection::Events).expect("items")[0].clone();

        let edit = page.start_edit("e1").expect("edit");
        assert_eq!(edit.date, "2024-03-05");
        assert_eq!(edit.time, "08:00");
        page.update_edit(Some("2024-03-10".into()), None).expect("date");
        page.update_edit(None, Some("14:30".into())).expect("time");
        page.save_edit(&mut store).expect("save");

        let after = store.get_items(Collection::Events).expect("items")[0].clone();
        let expected = grid::local_millis(&Utc, at(2024, 3, 10, 14, 30));
        assert_eq!(after["date"], json!(expected));
        let mut rest = after.clone();
        rest.insert("date".into(), before["date"].clone());
        assert_eq!(rest, before);
        assert!(page.editing().is_none());
    }

    #[test]
    fn save_edit_with_empty_date_is_a_no_op_and_empty_time_is_midnight() {
        let mut store = seeded();
        let mut page = page(&store);
        page.start_edit("e1").expect("edit");
        page.update_edit(Some(String::new()), None).expect("update");
        assert_eq!(page.save_edit(&mut store).expect("save"), None);
        assert!(page.editing().is_some());

        page.update_edit(Some("2024-03-07".into()), Some(String::new()))
            .expect("update");
        page.save_edit(&mut store).expect("save");
        let moved = stored_events(&store);
        assert_eq!(moved[0].date, grid::local_millis(&Utc, at(2024, 3, 7, 0, 0)));
    }

    #[test]
    fn bad_edit_input_keeps_the_editor_open() {
        let mut store = seeded();
        let mut page = page(&store);
        page.start_edit("e1").expect("edit");
        page.update_edit(None, Some("25:99".into())).expect("update");
        assert!(matches!(page.save_edit(&mut store), Err(AppError::BadParams(_))));
        assert!(page.editing().is_some());
        page.cancel_edit();
        assert!(page.editing().is_none());
    }

    #[test]
    fn event_drag_is_rejected_while_editing() {
        let store = seeded();
        let mut page = page(&store);
        page.start_edit("e1").expect("edit");
        assert!(matches!(page.drag_event("e2"), Err(AppError::InvalidState(_))));
        assert!(!page.drag_snapshot().is_dragging);
        page.drag_note("n1").expect("notes may still be dragged");
    }

    #[test]
    fn trash_drop_only_requests_confirmation() {
        let mut store = seeded();
        let mut page = page(&store);
        page.drag_event("e1").expect("drag");
        page.drag_over(DropTarget::Trash);
        assert!(page.drag_snapshot().is_trash_active);
        let outcome = page.drop_on(&mut store, DropTarget::Trash).expect("drop");
        assert_eq!(
            outcome,
            DropOutcome::DeleteRequested {
                event_id: "e1".into()
            }
        );
        assert_eq!(stored_events(&store).len(), 2);
        assert_eq!(page.pending_delete(), Some("e1"));
    }

    #[test]
    fn delete_confirmation_overwrite_cancel_confirm() {
        let mut store = seeded();
        let mut page = page(&store);

        page.request_delete("e1");
        page.request_delete("e2");
        page.cancel_delete();
        assert_eq!(page.confirm_delete(&mut store).expect("confirm"), None);
        assert_eq!(stored_events(&store).len(), 2);

        page.request_delete("e1");
        page.request_delete("e2");
        page.confirm_delete(&mut store).expect("confirm");
        let left: Vec<String> = stored_events(&store).into_iter().map(|e| e.id).collect();
        assert_eq!(left, vec!["e1".to_string()]);
        assert_eq!(page.pending_delete(), None);
        assert_eq!(page.events().len(), 1);
    }

    #[test]
    fn failed_archive_removes_the_new_event_and_can_be_retried() {
        let mut store = FailingStore::new(seeded(), vec![(Op::Update, Collection::QuickNotes)]);
        let mut page = page(&store);

        page.drag_note("n1").expect("drag");
        let err = page
            .drop_on(&mut store, DropTarget::Day(ymd(2024, 3, 12)))
            .expect_err("archive fails");
        let (mutation_id, compensated) = match err {
            AppError::MutationFailed {
                mutation_id,
                compensated,
                ..
            } => (mutation_id, compensated),
            other => panic!("unexpected error {:?}", other),
        };
        assert!(compensated);
        assert_eq!(stored_events(&store).len(), 2);
        assert_eq!(page.unscheduled_notes().len(), 1);

        store.fail_on.clear();
        let retried = page.retry(&mut store, mutation_id).expect("retry");
        assert_ne!(retried, mutation_id);
        assert_eq!(stored_events(&store).len(), 3);
        assert!(page.unscheduled_notes().is_empty());

        let status = page
            .mutations()
            .find(|r| r.id == mutation_id)
            .map(|r| r.status.clone());
        assert_eq!(status, Some(MutationStatus::Superseded { by: retried }));
        assert!(matches!(
            page.retry(&mut store, mutation_id),
            Err(AppError::InvalidState(_))
        ));
        assert_eq!(stored_events(&store).len(), 3);
    }

    #[test]
    fn failed_event_add_puts_the_note_back() {
        let mut store = FailingStore::new(seeded(), vec![(Op::Add, Collection::Events)]);
        let mut page = page(&store);

        page.drag_note("n1").expect("drag");
        let err = page
            .drop_on(&mut store, DropTarget::Day(ymd(2024, 3, 12)))
            .expect_err("add fails");
        let mutation_id = match err {
            AppError::MutationFailed {
                mutation_id,
                compensated: true,
                ..
            } => mutation_id,
            other => panic!("unexpected error {:?}", other),
        };
        assert_eq!(page.unscheduled_notes().len(), 1);
        assert_eq!(page.unscheduled_notes()[0].id, "n1");
        assert_eq!(stored_events(&store).len(), 2);
        let record = page
            .mutations()
            .find(|r| r.id == mutation_id)
            .expect("record");
        assert!(matches!(
            record.status,
            MutationStatus::Failed {
                compensated: true,
                ..
            }
        ));
    }

    #[test]
    fn retrying_a_promotion_after_the_note_was_promoted_again_is_rejected() {
        let mut store = FailingStore::new(seeded(), vec![(Op::Add, Collection::Events)]);
        let mut page = page(&store);

        page.drag_note("n1").expect("drag");
        let err = page
            .drop_on(&mut store, DropTarget::Day(ymd(2024, 3, 12)))
            .expect_err("add fails");
        let mutation_id = match err {
            AppError::MutationFailed { mutation_id, .. } => mutation_id,
            other => panic!("unexpected error {:?}", other),
        };

        store.fail_on.clear();
        page.drag_note("n1").expect("drag again");
        page.drop_on(&mut store, DropTarget::Day(ymd(2024, 3, 14))).expect("drop");

        assert!(matches!(
            page.retry(&mut store, mutation_id),
            Err(AppError::InvalidState(_))
        ));
        let linked = stored_events(&store)
            .into_iter()
            .filter(|e| e.linked_note_id.as_deref() == Some("n1"))
            .count();
        assert_eq!(linked, 1);
    }

    #[test]
    fn retrying_a_move_after_a_newer_move_is_rejected() {
        let mut store = FailingStore::new(seeded(), vec![(Op::Update, Collection::Events)]);
        let mut page = page(&store);
        let original = grid::local_millis(&Utc, at(2024, 3, 5, 8, 0));

        let err = page.move_event(&mut store, "e1", original + 3_600_000);
        let mutation_id = match err {
            Err(AppError::MutationFailed { mutation_id, .. }) => mutation_id,
            other => panic!("unexpected result {:?}", other),
        };

        store.fail_on.clear();
        let newer = original + 2 * 3_600_000;
        page.move_event(&mut store, "e1", newer).expect("move");

        assert!(matches!(
            page.retry(&mut store, mutation_id),
            Err(AppError::InvalidState(_))
        ));
        let e1 = stored_events(&store)
            .into_iter()
            .find(|e| e.id == "e1")
            .expect("e1");
        assert_eq!(e1.date, newer);
    }

    #[test]
    fn committed_write_stands_when_the_reload_fails() {
        let mut store = FailingStore::new(seeded(), Vec::new());
        let mut page = page(&store);
        store.fail_on = vec![(Op::Read, Collection::Interventions)];

        let (event_id, mutation_id) = page
            .add_event(&mut store, ymd(2024, 3, 20), "10:15", "Excursión", EventType::General)
            .expect("add is committed");
        let status = page
            .mutations()
            .find(|r| r.id == mutation_id)
            .map(|r| r.status.clone());
        assert_eq!(status, Some(MutationStatus::Committed));
        assert!(stored_events(&store.inner).iter().any(|e| e.id == event_id));
    }

    #[test]
    fn undecodable_events_do_not_hide_the_rest() {
        let mut store = seeded();
        store
            .add_item(
                Collection::Events,
                patch([
                    ("title", json!("Salida")),
                    ("date", json!(grid::local_millis(&Utc, at(2024, 3, 8, 9, 0)))),
                    ("type", json!("trip")),
                ]),
            )
            .expect("add bad");
        let mut page = page(&store);
        page.add_event(&mut store, ymd(2024, 3, 20), "", "Claustro", EventType::Meeting)
            .expect("add");

        page.refresh(&store).expect("refresh");
        let titles: Vec<&str> = page.events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles.len(), 3);
        assert!(titles.contains(&"Claustro"));
        assert!(!titles.contains(&"Salida"));
    }

    #[test]
    fn uncompensated_failure_is_not_retried() {
        let mut store = FailingStore::new(
            seeded(),
            vec![
                (Op::Update, Collection::QuickNotes),
                (Op::Delete, Collection::Events),
            ],
        );
        let mut page = page(&store);
        let note = page.unscheduled_notes()[0].clone();
        let err = page
            .promote_note(&mut store, note, ymd(2024, 3, 12))
            .expect_err("fails");
        let (mutation_id, compensated) = match err {
            AppError::MutationFailed {
                mutation_id,
                compensated,
                ..
            } => (mutation_id, compensated),
            other => panic!("unexpected error {:?}", other),
        };
        assert!(!compensated);
        assert_eq!(stored_events(&store).len(), 3);
        assert!(matches!(
            page.retry(&mut store, mutation_id),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn failed_move_reverts_to_stored_date() {
        let mut store = FailingStore::new(seeded(), vec![(Op::Update, Collection::Events)]);
        let mut page = page(&store);
        let original = page.events()[0].date;
        let err = page.move_event(&mut store, "e1", original + 3_600_000);
        assert!(matches!(err, Err(AppError::MutationFailed { .. })));
        assert_eq!(page.events()[0].date, original);
        let failed = page.mutations().filter(|r| r.is_failed()).count();
        assert_eq!(failed, 1);
    }

    #[test]
    fn committed_mutations_cannot_be_retried() {
        let mut store = seeded();
        let mut page = page(&store);
        let (_, mutation_id) = page
            .add_event(&mut store, ymd(2024, 3, 20), "10:15", "Excursión", EventType::General)
            .expect("add");
        assert!(matches!(
            page.retry(&mut store, mutation_id),
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(page.retry(&mut store, 999), Err(AppError::NotFound(_))));
        let added = stored_events(&store)
            .into_iter()
            .find(|e| e.title == "Excursión")
            .expect("added");
        assert_eq!(added.date, grid::local_millis(&Utc, at(2024, 3, 20, 10, 15)));
    }

    #[test]
    fn view_model_titles_and_cells() {
        let store = seeded();
        let mut page = page(&store);
        let month = page.view_model(ymd(2024, 3, 5), Language::Es);
        assert_eq!(month.title, "marzo de 2024");
        assert_eq!(month.cells.len(), 4 + 31);
        assert_eq!(month.weekdays[0], "Lun");

        page.set_view(ViewMode::Week);
        page.go_to_today(at(2024, 3, 10, 9, 0));
        let week = page.view_model(ymd(2024, 3, 5), Language::Es);
        assert_eq!(week.title, "Semana: 4/3/2024 - 10/3/2024");
        assert_eq!(week.cells.len(), 7);
        let tuesday = week.cells[1].as_day().expect("day");
        assert_eq!(tuesday.events.len(), 1);
        assert_eq!(tuesday.events[0].time, "08:00");

        page.navigate(-1).expect("navigate");
        assert_eq!(page.reference(), at(2024, 3, 3, 9, 0));
    }
}
