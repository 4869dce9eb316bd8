use crate::model::{EventType, Millis, QuickNote};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::VecDeque;

const LOG_CAPACITY: usize = 50;

/// A calendar write, with enough data to run it again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum MutationKind {
    #[serde(rename_all = "camelCase")]
    AddEvent {
        title: String,
        date: Millis,
        event_type: EventType,
    },
    #[serde(rename_all = "camelCase")]
    PromoteNote { note: QuickNote, day: NaiveDate },
    #[serde(rename_all = "camelCase")]
    MoveEvent {
        event_id: String,
        from: Millis,
        to: Millis,
    },
    #[serde(rename_all = "camelCase")]
    DeleteEvent { event_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum MutationStatus {
    Pending,
    Committed,
    /// `compensated` is true when the store was left as it was before the write.
    Failed { message: String, compensated: bool },
    /// Retried under mutation `by`; never runs again.
    Superseded { by: u64 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    pub id: u64,
    pub kind: MutationKind,
    pub status: MutationStatus,
}

impl MutationRecord {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, MutationStatus::Failed { .. })
    }
}

/// Bounded history of calendar writes, newest last.
#[derive(Debug, Clone, Default)]
pub struct MutationLog {
    next_id: u64,
    records: VecDeque<MutationRecord>,
}

impl MutationLog {
    pub fn begin(&mut self, kind: MutationKind) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        if self.records.len() == LOG_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(MutationRecord {
            id,
            kind,
            status: MutationStatus::Pending,
        });
        id
    }

    pub fn commit(&mut self, id: u64) {
        self.set_status(id, MutationStatus::Committed);
    }

    pub fn fail(&mut self, id: u64, message: impl Into<String>, compensated: bool) {
        self.set_status(
            id,
            MutationStatus::Failed {
                message: message.into(),
                compensated,
            },
        );
    }

    pub fn supersede(&mut self, id: u64, by: u64) {
        self.set_status(id, MutationStatus::Superseded { by });
    }

    fn set_status(&mut self, id: u64, status: MutationStatus) {
        if let Some(rec) = self.records.iter_mut().find(|r| r.id == id) {
            rec.status = status;
        }
    }

    pub fn get(&self, id: u64) -> Option<&MutationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> impl Iterator<Item = &MutationRecord> {
        self.records.iter()
    }
}
