//! Drag-and-drop gestures on the calendar as a small state machine.
//!
//! The machine only decides; it never touches the store. A successful drop
//! yields a [`DragCommand`] that the page carries out.

use crate::model::QuickNote;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum DragPayload {
    Note(QuickNote),
    EventId(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Day(NaiveDate),
    Trash,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    DraggingNote { note: QuickNote },
    DraggingEvent { event_id: String, over_trash: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragCommand {
    PromoteNote { note: QuickNote, day: NaiveDate },
    RequestDelete { event_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRejected {
    /// Events cannot be picked up while an inline edit is open.
    EditInProgress,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragSnapshot {
    pub state: &'static str,
    pub is_dragging: bool,
    pub is_trash_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DragMachine {
    state: DragState,
}

impl Default for DragMachine {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
        }
    }
}

impl DragMachine {
    #[cfg(test)]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Picks up a payload. A start while already dragging replaces the payload.
    pub fn start(&mut self, payload: DragPayload, editing: bool) -> Result<(), DragRejected> {
        if editing && matches!(payload, DragPayload::EventId(_)) {
            self.state = DragState::Idle;
            return Err(DragRejected::EditInProgress);
        }
        self.state = match payload {
            DragPayload::Note(note) => DragState::DraggingNote { note },
            DragPayload::EventId(event_id) => DragState::DraggingEvent {
                event_id,
                over_trash: false,
            },
        };
        Ok(())
    }

    pub fn over(&mut self, target: DropTarget) {
        if let (DragState::DraggingEvent { over_trash, .. }, DropTarget::Trash) =
            (&mut self.state, target)
        {
            *over_trash = true;
        }
    }

    pub fn leave(&mut self, target: DropTarget) {
        if let (DragState::DraggingEvent { over_trash, .. }, DropTarget::Trash) =
            (&mut self.state, target)
        {
            *over_trash = false;
        }
    }

    /// Releases the payload over `target`. Always returns to idle.
    pub fn drop_on(&mut self, target: DropTarget) -> Option<DragCommand> {
        match (std::mem::replace(&mut self.state, DragState::Idle), target) {
            (DragState::DraggingNote { note }, DropTarget::Day(day)) => {
                Some(DragCommand::PromoteNote { note, day })
            }
            (DragState::DraggingEvent { event_id, .. }, DropTarget::Trash) => {
                Some(DragCommand::RequestDelete { event_id })
            }
            _ => None,
        }
    }

    /// Gesture finished or was abandoned (escape, drop outside any target).
    pub fn end(&mut self) {
        self.state = DragState::Idle;
    }

    /// Only event drags count: they are what reveals the trash target.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::DraggingEvent { .. })
    }

    pub fn is_trash_active(&self) -> bool {
        matches!(
            self.state,
            DragState::DraggingEvent {
                over_trash: true,
                ..
            }
        )
    }

    pub fn snapshot(&self) -> DragSnapshot {
        let (state, note_id, event_id) = match &self.state {
            DragState::Idle => ("idle", None, None),
            DragState::DraggingNote { note } => ("draggingNote", Some(note.id.clone()), None),
            DragState::DraggingEvent { event_id, .. } => {
                ("draggingEvent", None, Some(event_id.clone()))
            }
        };
        DragSnapshot {
            state,
            is_dragging: self.is_dragging(),
            is_trash_active: self.is_trash_active(),
            note_id,
            event_id,
        }
    }
}
