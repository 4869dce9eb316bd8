//! Per-view controllers. Each page owns the collections it loaded and
//! reloads them after every write.

pub mod classes;
pub mod dashboard;
pub mod notes;
pub mod resources;
pub mod students;

pub use classes::ClassesPage;
pub use notes::NotesPage;
pub use resources::ResourcesPage;
pub use students::StudentsPage;

use crate::error::{AppError, AppResult};

/// Case-insensitive substring match used by the search boxes. An empty query matches.
pub(crate) fn matches_query(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.to_lowercase())
}

pub(crate) fn required(field: &str, value: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::bad_params(format!("{} must not be empty", field)));
    }
    Ok(v.to_string())
}
