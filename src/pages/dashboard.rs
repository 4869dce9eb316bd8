use crate::error::AppResult;
use crate::i18n;
use crate::model::{Intervention, InterventionStatus, QuickNote, Student};
use crate::store::{load_typed, Collection, CollectionStore};
use serde::Serialize;

const RECENT_PENDING: usize = 5;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub greeting: &'static str,
    pub student_count: usize,
    pub pending_count: usize,
    pub active_note_count: usize,
    /// Most recent pending interventions first.
    pub recent_pending: Vec<Intervention>,
}

pub fn summary(store: &dyn CollectionStore, hour: u32) -> AppResult<DashboardSummary> {
    let students: Vec<Student> = load_typed(store, Collection::Students)?;
    let interventions: Vec<Intervention> = load_typed(store, Collection::Interventions)?;
    let notes: Vec<QuickNote> = load_typed(store, Collection::QuickNotes)?;

    let mut pending: Vec<Intervention> = interventions
        .into_iter()
        .filter(|i| i.status == InterventionStatus::Pendiente)
        .collect();
    let pending_count = pending.len();
    pending.sort_by(|a, b| b.date.cmp(&a.date));
    pending.truncate(RECENT_PENDING);

    Ok(DashboardSummary {
        greeting: i18n::greeting(hour),
        student_count: students.len(),
        pending_count,
        active_note_count: notes.iter().filter(|n| !n.is_archived).count(),
        recent_pending: pending,
    })
}
