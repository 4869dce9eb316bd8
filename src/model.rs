use serde::{Deserialize, Serialize};

/// Epoch milliseconds.
pub type Millis = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub contact_info: String,
    /// ClassGroup ids. Not checked against the `classes` collection.
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub special_needs: Vec<String>,
    #[serde(default)]
    pub created_at: Millis,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGroup {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub created_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterventionType {
    Conducta,
    #[serde(rename = "Académico")]
    Academico,
    Familia,
    Positivo,
}

impl InterventionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Conducta" => Some(Self::Conducta),
            "Académico" | "Academico" => Some(Self::Academico),
            "Familia" => Some(Self::Familia),
            "Positivo" => Some(Self::Positivo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionStatus {
    Pendiente,
    Resuelto,
}

impl InterventionStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Pendiente => Self::Resuelto,
            Self::Resuelto => Self::Pendiente,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervention {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    /// Name at creation time. Renaming the student does not touch it.
    #[serde(default)]
    pub student_name: String,
    #[serde(rename = "type")]
    pub kind: InterventionType,
    #[serde(default)]
    pub description: String,
    pub status: InterventionStatus,
    pub date: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeType {
    Exam,
    Work,
    Final,
}

impl GradeType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exam" => Some(Self::Exam),
            "work" => Some(Self::Work),
            "final" => Some(Self::Final),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub class_group_id: String,
    pub title: String,
    pub grade: f64,
    #[serde(rename = "type")]
    pub kind: GradeType,
    pub date: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickNote {
    #[serde(default)]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    General,
    Exam,
    Meeting,
}

impl EventType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "exam" => Some(Self::Exam),
            "meeting" => Some(Self::Meeting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub date: Millis,
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Note this event was promoted from. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_note_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpNote {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: Millis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Anything that sits on the calendar at a point in time.
pub trait Timestamped {
    fn timestamp(&self) -> Millis;
}

impl Timestamped for CalendarEvent {
    fn timestamp(&self) -> Millis {
        self.date
    }
}

impl Timestamped for Intervention {
    fn timestamp(&self) -> Millis {
        self.date
    }
}

/// Splits a comma-separated form field into trimmed, non-empty entries.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
