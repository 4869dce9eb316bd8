//! Static Spanish/Basque strings. Switching language swaps the whole table.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    Eu,
}

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Some(Self::Es),
            "eu" => Some(Self::Eu),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dictionary {
    pub language: Language,
    pub nav: NavLabels,
    pub weekdays: [&'static str; 7],
    pub months: [&'static str; 12],
    pub week_label: &'static str,
    pub no_group: &'static str,
    /// Preset special-needs tags offered on the student form.
    pub special_needs: [&'static str; 5],
    pub api_connected: &'static str,
    pub api_mock: &'static str,
    pub operation_failed: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLabels {
    pub dashboard: &'static str,
    pub calendar: &'static str,
    pub classes: &'static str,
    pub students: &'static str,
    pub notes: &'static str,
    pub resources: &'static str,
    pub settings: &'static str,
}

static ES: Dictionary = Dictionary {
    language: Language::Es,
    nav: NavLabels {
        dashboard: "Inicio",
        calendar: "Calendario",
        classes: "Clases",
        students: "Alumnos",
        notes: "Notas",
        resources: "Recursos",
        settings: "Ajustes",
    },
    weekdays: ["Lun", "Mar", "Mié", "Jue", "Vie", "Sáb", "Dom"],
    months: [
        "enero",
        "febrero",
        "marzo",
        "abril",
        "mayo",
        "junio",
        "julio",
        "agosto",
        "septiembre",
        "octubre",
        "noviembre",
        "diciembre",
    ],
    week_label: "Semana",
    no_group: "Sin grupo",
    special_needs: ["TDAH", "Dislexia", "TEA", "Altas capacidades", "Refuerzo"],
    api_connected: "Conectado",
    api_mock: "Modo local",
    operation_failed: "La operación ha fallado",
};

static EU: Dictionary = Dictionary {
    language: Language::Eu,
    nav: NavLabels {
        dashboard: "Hasiera",
        calendar: "Egutegia",
        classes: "Klaseak",
        students: "Ikasleak",
        notes: "Oharrak",
        resources: "Baliabideak",
        settings: "Ezarpenak",
    },
    weekdays: ["Al", "Ar", "Az", "Og", "Or", "Lr", "Ig"],
    months: [
        "urtarrila",
        "otsaila",
        "martxoa",
        "apirila",
        "maiatza",
        "ekaina",
        "uztaila",
        "abuztua",
        "iraila",
        "urria",
        "azaroa",
        "abendua",
    ],
    week_label: "Astea",
    no_group: "Talderik gabe",
    special_needs: ["AGNH", "Dislexia", "AEN", "Gaitasun handiak", "Indartzea"],
    api_connected: "Konektatuta",
    api_mock: "Modu lokala",
    operation_failed: "Eragiketak huts egin du",
};

pub fn dictionary(language: Language) -> &'static Dictionary {
    match language {
        Language::Es => &ES,
        Language::Eu => &EU,
    }
}

/// "marzo de 2024" / "2024ko martxoa".
pub fn month_title(language: Language, date: NaiveDate) -> String {
    let dict = dictionary(language);
    let month = dict.months[date.month0() as usize];
    match language {
        Language::Es => format!("{} de {}", month, date.year()),
        Language::Eu => format!("{}ko {}", date.year(), month),
    }
}

/// "Semana: 4/3/2024 - 10/3/2024".
pub fn week_title(language: Language, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{}: {} - {}",
        dictionary(language).week_label,
        short_date(start),
        short_date(end)
    )
}

fn short_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Dashboard greeting by local hour.
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Egun on"
    } else if hour < 18 {
        "Arratsalde on"
    } else {
        "Gabon"
    }
}
