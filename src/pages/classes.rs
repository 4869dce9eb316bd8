use super::required;
use crate::error::{AppError, AppResult};
use crate::model::{split_tags, ClassGroup, Millis, Student};
use crate::store::{add_typed, load_typed, Collection, CollectionStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRow {
    #[serde(flatten)]
    pub class: ClassGroup,
    pub student_count: usize,
}

/// Quick-add form on the class roster. Special needs arrive comma separated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterStudentForm {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub special_needs: String,
}

#[derive(Debug, Default)]
pub struct ClassesPage {
    classes: Vec<ClassGroup>,
    students: Vec<Student>,
}

impl ClassesPage {
    pub fn refresh(&mut self, store: &dyn CollectionStore) -> AppResult<()> {
        self.classes = load_typed(store, Collection::Classes)?;
        self.students = load_typed(store, Collection::Students)?;
        Ok(())
    }

    fn members<'a>(&'a self, class_id: &'a str) -> impl Iterator<Item = &'a Student> + 'a {
        self.students
            .iter()
            .filter(move |s| s.groups.iter().any(|g| g == class_id))
    }

    pub fn list(&self) -> Vec<ClassRow> {
        self.classes
            .iter()
            .map(|c| ClassRow {
                class: c.clone(),
                student_count: self.members(&c.id).count(),
            })
            .collect()
    }

    pub fn roster(&self, class_id: &str) -> AppResult<Vec<Student>> {
        if !self.classes.iter().any(|c| c.id == class_id) {
            return Err(AppError::NotFound(format!("class {}", class_id)));
        }
        Ok(self.members(class_id).cloned().collect())
    }

    pub fn create(
        &mut self,
        store: &mut dyn CollectionStore,
        name: &str,
        subject: &str,
        now: Millis,
    ) -> AppResult<String> {
        let class = ClassGroup {
            id: String::new(),
            name: required("name", name)?,
            subject: subject.trim().to_string(),
            created_at: now,
        };
        let id = add_typed(store, Collection::Classes, &class)?;
        tracing::info!(class_id = %id, name = %class.name, "class created");
        self.refresh(store)?;
        Ok(id)
    }

    /// Creates a new student whose only group is `class_id`.
    pub fn add_student(
        &mut self,
        store: &mut dyn CollectionStore,
        class_id: &str,
        form: RosterStudentForm,
        now: Millis,
    ) -> AppResult<String> {
        if !self.classes.iter().any(|c| c.id == class_id) {
            return Err(AppError::NotFound(format!("class {}", class_id)));
        }
        let student = Student {
            id: String::new(),
            first_name: required("firstName", &form.first_name)?,
            last_name: required("lastName", &form.last_name)?,
            contact_info: form.contact_info,
            groups: vec![class_id.to_string()],
            special_needs: split_tags(&form.special_needs),
            created_at: now,
        };
        let id = add_typed(store, Collection::Students, &student)?;
        self.refresh(store)?;
        Ok(id)
    }
}
