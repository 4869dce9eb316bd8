use super::{matches_query, required};
use crate::confirm::DeleteConfirmation;
use crate::error::{AppError, AppResult};
use crate::model::{split_tags, Resource};
use crate::store::{add_typed, load_typed, patch, to_document, Collection, CollectionStore};
use serde::Deserialize;
use serde_json::json;

/// Tags may come from the form as one comma-separated string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Text(String),
    List(Vec<String>),
}

impl Default for TagsInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            Self::Text(raw) => split_tags(&raw),
            Self::List(list) => list
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceForm {
    /// Set when editing.
    #[serde(default)]
    pub resource_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: TagsInput,
}

#[derive(Debug, Default)]
pub struct ResourcesPage {
    resources: Vec<Resource>,
    confirmation: DeleteConfirmation,
}

impl ResourcesPage {
    pub fn refresh(&mut self, store: &dyn CollectionStore) -> AppResult<()> {
        self.resources = load_typed(store, Collection::Resources)?;
        Ok(())
    }

    /// Resources whose title or any tag contains `search`.
    pub fn list(&self, search: &str) -> Vec<Resource> {
        self.resources
            .iter()
            .filter(|r| {
                matches_query(&r.title, search) || r.tags.iter().any(|t| matches_query(t, search))
            })
            .cloned()
            .collect()
    }

    fn find(&self, resource_id: &str) -> AppResult<&Resource> {
        self.resources
            .iter()
            .find(|r| r.id == resource_id)
            .ok_or_else(|| AppError::NotFound(format!("resource {}", resource_id)))
    }

    /// Creates or edits a resource. Editing keeps the favourite flag.
    pub fn save(&mut self, store: &mut dyn CollectionStore, form: ResourceForm) -> AppResult<String> {
        let is_favorite = match &form.resource_id {
            Some(id) => self.find(id)?.is_favorite,
            None => false,
        };
        let resource = Resource {
            id: String::new(),
            title: required("title", &form.title)?,
            url: form.url.trim().to_string(),
            category: form.category.trim().to_string(),
            tags: form.tags.into_tags(),
            is_favorite,
        };
        let id = match form.resource_id {
            Some(id) => {
                let mut doc = to_document(Collection::Resources, &resource)?;
                doc.remove("id");
                store.update_item(Collection::Resources, &id, doc)?;
                id
            }
            None => add_typed(store, Collection::Resources, &resource)?,
        };
        self.refresh(store)?;
        Ok(id)
    }

    pub fn toggle_favorite(
        &mut self,
        store: &mut dyn CollectionStore,
        resource_id: &str,
    ) -> AppResult<bool> {
        let next = !self.find(resource_id)?.is_favorite;
        store.update_item(
            Collection::Resources,
            resource_id,
            patch([("isFavorite", json!(next))]),
        )?;
        self.refresh(store)?;
        Ok(next)
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.confirmation.pending()
    }

    pub fn request_delete(&mut self, resource_id: &str) {
        self.confirmation.request(resource_id);
    }

    pub fn cancel_delete(&mut self) {
        self.confirmation.cancel();
    }

    /// Deletes the pending resource. Returns its id, or `None` when nothing was pending.
    pub fn confirm_delete(&mut self, store: &mut dyn CollectionStore) -> AppResult<Option<String>> {
        let Some(resource_id) = self.confirmation.confirm() else {
            return Ok(None);
        };
        let deleted = store.delete_item(Collection::Resources, &resource_id);
        self.refresh(store)?;
        deleted?;
        tracing::info!(resource_id = %resource_id, "resource deleted");
        Ok(Some(resource_id))
    }
}
