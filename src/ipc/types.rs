use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Deserialize;

use crate::calendar::grid::ViewMode;
use crate::calendar::CalendarPage;
use crate::config::LocalConfig;
use crate::pages::{ClassesPage, NotesPage, ResourcesPage, StudentsPage};
use crate::store::{CollectionStore, MemoryStore, SqliteStore};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Per-view controllers. Rebuilt whenever the store connection changes.
pub struct Pages {
    pub calendar: CalendarPage<Local>,
    pub students: StudentsPage,
    pub classes: ClassesPage,
    pub notes: NotesPage,
    pub resources: ResourcesPage,
}

impl Pages {
    pub fn new(default_view: ViewMode) -> Self {
        Self {
            calendar: CalendarPage::new(Local, Local::now().naive_local(), default_view),
            students: StudentsPage::default(),
            classes: ClassesPage::default(),
            notes: NotesPage::default(),
            resources: ResourcesPage::default(),
        }
    }
}

pub struct AppState {
    pub config_path: PathBuf,
    pub config: LocalConfig,
    pub workspace: Option<PathBuf>,
    pub store: Box<dyn CollectionStore>,
    pub pages: Pages,
}

impl AppState {
    /// Loads the config and connects to the configured workspace, falling
    /// back to the in-memory store if it cannot be opened.
    pub fn start(config_path: PathBuf) -> Self {
        let config = LocalConfig::load_or_default(&config_path);
        let mut state = Self {
            config_path,
            pages: Pages::new(config.calendar.default_view),
            config,
            workspace: None,
            store: Box::new(MemoryStore::new()),
        };
        if let Some(path) = state.config.connection.workspace_path.clone() {
            if let Err(e) = state.open_workspace(&path) {
                let reason = format!("{e:#}");
                tracing::warn!(
                    workspace = %path.to_string_lossy(),
                    error = %reason,
                    "workspace unavailable, using in-memory store"
                );
            }
        }
        state
    }

    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let store = SqliteStore::open(path)?;
        self.store = Box::new(store);
        self.workspace = Some(path.to_path_buf());
        self.reset_pages();
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.store = Box::new(MemoryStore::new());
        self.workspace = None;
        self.reset_pages();
        tracing::info!("store disconnected, using in-memory store");
    }

    pub fn reset_pages(&mut self) {
        self.pages = Pages::new(self.config.calendar.default_view);
    }
}
