pub mod backup;
pub mod calendar;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod nav;
pub mod notes;
pub mod resources;
pub mod settings;
pub mod store;
pub mod students;
