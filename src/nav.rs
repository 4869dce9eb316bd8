use crate::i18n::{dictionary, Language};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Calendar,
    Classes,
    Students,
    Notes,
    Resources,
    Settings,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Dashboard,
        Page::Calendar,
        Page::Classes,
        Page::Students,
        Page::Notes,
        Page::Resources,
        Page::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Calendar => "/calendar",
            Self::Classes => "/classes",
            Self::Students => "/students",
            Self::Notes => "/notes",
            Self::Resources => "/resources",
            Self::Settings => "/settings",
        }
    }

    pub fn title(self, language: Language) -> &'static str {
        let nav = &dictionary(language).nav;
        match self {
            Self::Dashboard => nav.dashboard,
            Self::Calendar => nav.calendar,
            Self::Classes => nav.classes,
            Self::Students => nav.students,
            Self::Notes => nav.notes,
            Self::Resources => nav.resources,
            Self::Settings => nav.settings,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub title: &'static str,
}

pub fn routes(language: Language) -> Vec<Route> {
    Page::ALL
        .into_iter()
        .map(|p| Route {
            path: p.path(),
            title: p.title(language),
        })
        .collect()
}
