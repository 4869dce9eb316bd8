use super::{matches_query, required};
use crate::error::{AppError, AppResult};
use crate::i18n::{dictionary, Language};
use crate::model::{
    ClassGroup, FollowUpNote, Grade, GradeType, Intervention, InterventionStatus, InterventionType,
    Millis, Student,
};
use crate::store::{
    add_typed, load_typed, patch, to_document, Collection, CollectionStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Averages at or above this are shown as passing.
pub const PASS_MARK: f64 = 5.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub special_needs: Vec<String>,
}

/// Fields of an existing student to overwrite; absent fields are left alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_needs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeForm {
    /// Set when editing an existing grade.
    #[serde(default)]
    pub grade_id: Option<String>,
    pub student_id: String,
    pub class_group_id: String,
    pub title: String,
    pub grade: f64,
    #[serde(rename = "type")]
    pub kind: GradeType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    #[serde(flatten)]
    pub student: Student,
    pub group_names: Vec<String>,
    pub groups_label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSection {
    pub class_id: String,
    pub class_name: String,
    pub subject: String,
    pub grades: Vec<Grade>,
    /// Mean of non-final grades, one decimal.
    pub average: Option<f64>,
    pub passing: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub row: StudentRow,
    pub interventions: Vec<Intervention>,
    pub grades: Vec<Grade>,
    pub grade_sections: Vec<GradeSection>,
    pub follow_ups: Vec<FollowUpNote>,
}

/// Mean of every grade that is not a final evaluation.
pub fn grade_average(grades: &[Grade]) -> Option<f64> {
    let counted: Vec<f64> = grades
        .iter()
        .filter(|g| g.kind != GradeType::Final)
        .map(|g| g.grade)
        .collect();
    if counted.is_empty() {
        return None;
    }
    Some(counted.iter().sum::<f64>() / counted.len() as f64)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Adds `tag` if absent, removes it if present.
pub fn toggle_tag(tags: &[String], tag: &str) -> Vec<String> {
    if tags.iter().any(|t| t == tag) {
        tags.iter().filter(|t| *t != tag).cloned().collect()
    } else {
        let mut out = tags.to_vec();
        out.push(tag.to_string());
        out
    }
}

/// Appends a trimmed custom tag unless it is blank or already there.
pub fn add_custom_tag(tags: &[String], raw: &str) -> Vec<String> {
    let tag = raw.trim();
    let mut out = tags.to_vec();
    if !tag.is_empty() && !out.iter().any(|t| t == tag) {
        out.push(tag.to_string());
    }
    out
}

#[derive(Debug, Default)]
pub struct StudentsPage {
    students: Vec<Student>,
    classes: Vec<ClassGroup>,
    interventions: Vec<Intervention>,
    grades: Vec<Grade>,
    follow_ups: Vec<FollowUpNote>,
}

impl StudentsPage {
    pub fn refresh(&mut self, store: &dyn CollectionStore) -> AppResult<()> {
        self.students = load_typed(store, Collection::Students)?;
        self.classes = load_typed(store, Collection::Classes)?;
        self.interventions = load_typed(store, Collection::Interventions)?;
        self.grades = load_typed(store, Collection::Grades)?;
        self.follow_ups = load_typed(store, Collection::FollowUpNotes)?;
        Ok(())
    }

    fn group_names(&self, student: &Student) -> Vec<String> {
        student
            .groups
            .iter()
            .filter_map(|gid| self.classes.iter().find(|c| &c.id == gid))
            .map(|c| c.name.clone())
            .collect()
    }

    fn row(&self, student: &Student, language: Language) -> StudentRow {
        let group_names = self.group_names(student);
        let groups_label = if group_names.is_empty() {
            dictionary(language).no_group.to_string()
        } else {
            group_names.join(", ")
        };
        StudentRow {
            student: student.clone(),
            group_names,
            groups_label,
        }
    }

    /// Students whose full name or any group name contains `search`.
    pub fn list(&self, search: &str, language: Language) -> Vec<StudentRow> {
        self.students
            .iter()
            .map(|s| self.row(s, language))
            .filter(|row| {
                matches_query(&row.student.full_name(), search)
                    || matches_query(&row.group_names.join(" "), search)
            })
            .collect()
    }

    fn student(&self, student_id: &str) -> AppResult<&Student> {
        self.students
            .iter()
            .find(|s| s.id == student_id)
            .ok_or_else(|| AppError::NotFound(format!("student {}", student_id)))
    }

    pub fn detail(&self, student_id: &str, language: Language) -> AppResult<StudentDetail> {
        let student = self.student(student_id)?;

        let mut interventions: Vec<Intervention> = self
            .interventions
            .iter()
            .filter(|i| i.student_id == student_id)
            .cloned()
            .collect();
        interventions.sort_by(|a, b| b.date.cmp(&a.date));

        let mut grades: Vec<Grade> = self
            .grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect();
        grades.sort_by(|a, b| b.date.cmp(&a.date));

        let mut follow_ups: Vec<FollowUpNote> = self
            .follow_ups
            .iter()
            .filter(|n| n.student_id == student_id)
            .cloned()
            .collect();
        follow_ups.sort_by(|a, b| b.date.cmp(&a.date));

        let grade_sections = student
            .groups
            .iter()
            .filter_map(|gid| self.classes.iter().find(|c| &c.id == gid))
            .map(|class| {
                let class_grades: Vec<Grade> = grades
                    .iter()
                    .filter(|g| g.class_group_id == class.id)
                    .cloned()
                    .collect();
                let average = grade_average(&class_grades).map(round1);
                GradeSection {
                    class_id: class.id.clone(),
                    class_name: class.name.clone(),
                    subject: class.subject.clone(),
                    grades: class_grades,
                    average,
                    passing: average.map(|a| a >= PASS_MARK),
                }
            })
            .collect();

        Ok(StudentDetail {
            row: self.row(student, language),
            interventions,
            grades,
            grade_sections,
            follow_ups,
        })
    }

    pub fn create(
        &mut self,
        store: &mut dyn CollectionStore,
        form: StudentForm,
        now: Millis,
    ) -> AppResult<String> {
        let student = Student {
            id: String::new(),
            first_name: required("firstName", &form.first_name)?,
            last_name: required("lastName", &form.last_name)?,
            contact_info: form.contact_info,
            groups: form.groups,
            special_needs: form.special_needs,
            created_at: now,
        };
        let id = add_typed(store, Collection::Students, &student)?;
        tracing::info!(student_id = %id, "student created");
        self.refresh(store)?;
        Ok(id)
    }

    pub fn update(
        &mut self,
        store: &mut dyn CollectionStore,
        student_id: &str,
        changes: StudentPatch,
    ) -> AppResult<()> {
        self.student(student_id)?;
        if let Some(name) = &changes.first_name {
            required("firstName", name)?;
        }
        if let Some(name) = &changes.last_name {
            required("lastName", name)?;
        }
        let doc = to_document(Collection::Students, &changes)?;
        store.update_item(Collection::Students, student_id, doc)?;
        self.refresh(store)?;
        Ok(())
    }

    /// Records an intervention with the student's current name as a snapshot.
    pub fn add_intervention(
        &mut self,
        store: &mut dyn CollectionStore,
        student_id: &str,
        kind: InterventionType,
        description: &str,
        now: Millis,
    ) -> AppResult<String> {
        let student = self.student(student_id)?;
        let intervention = Intervention {
            id: String::new(),
            student_id: student.id.clone(),
            student_name: student.full_name(),
            kind,
            description: description.to_string(),
            status: InterventionStatus::Pendiente,
            date: now,
        };
        let id = add_typed(store, Collection::Interventions, &intervention)?;
        self.refresh(store)?;
        Ok(id)
    }

    pub fn toggle_intervention(
        &mut self,
        store: &mut dyn CollectionStore,
        intervention_id: &str,
    ) -> AppResult<InterventionStatus> {
        let current = self
            .interventions
            .iter()
            .find(|i| i.id == intervention_id)
            .ok_or_else(|| AppError::NotFound(format!("intervention {}", intervention_id)))?;
        let next = current.status.toggled();
        store.update_item(
            Collection::Interventions,
            intervention_id,
            patch([("status", json!(next))]),
        )?;
        self.refresh(store)?;
        Ok(next)
    }

    /// Creates a grade, or rewrites an existing one keeping its original date.
    pub fn save_grade(
        &mut self,
        store: &mut dyn CollectionStore,
        form: GradeForm,
        now: Millis,
    ) -> AppResult<String> {
        self.student(&form.student_id)?;
        if !form.grade.is_finite() {
            return Err(AppError::bad_params("grade must be a number"));
        }
        let existing = match &form.grade_id {
            Some(id) => Some(
                self.grades
                    .iter()
                    .find(|g| &g.id == id)
                    .ok_or_else(|| AppError::NotFound(format!("grade {}", id)))?,
            ),
            None => None,
        };
        let grade = Grade {
            id: String::new(),
            student_id: form.student_id,
            class_group_id: form.class_group_id,
            title: required("title", &form.title)?,
            grade: form.grade,
            kind: form.kind,
            date: existing.map(|g| g.date).unwrap_or(now),
        };
        let id = match form.grade_id {
            Some(id) => {
                let mut doc = to_document(Collection::Grades, &grade)?;
                doc.remove("id");
                store.update_item(Collection::Grades, &id, doc)?;
                id
            }
            None => add_typed(store, Collection::Grades, &grade)?,
        };
        self.refresh(store)?;
        Ok(id)
    }

    pub fn add_follow_up(
        &mut self,
        store: &mut dyn CollectionStore,
        student_id: &str,
        title: &str,
        content: &str,
        now: Millis,
    ) -> AppResult<String> {
        self.student(student_id)?;
        let note = FollowUpNote {
            id: String::new(),
            student_id: student_id.to_string(),
            title: required("title", title)?,
            content: content.to_string(),
            date: now,
        };
        let id = add_typed(store, Collection::FollowUpNotes, &note)?;
        self.refresh(store)?;
        Ok(id)
    }
}
