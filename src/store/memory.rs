use super::{
    new_id, strip_id, ApiStatus, Collection, CollectionStore, Document, StoreError, StoreResult,
};
use serde_json::Value;
use std::collections::HashMap;

/// In-process store used when no workspace is connected. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<Collection, Vec<(String, Document)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_mut(&mut self, collection: Collection, id: &str) -> StoreResult<&mut Document> {
        self.collections
            .get_mut(&collection)
            .and_then(|docs| docs.iter_mut().find(|(doc_id, _)| doc_id == id))
            .map(|(_, doc)| doc)
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }
}

impl CollectionStore for MemoryStore {
    fn get_items(&self, collection: Collection) -> StoreResult<Vec<Document>> {
        let docs = self
            .collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| {
                        let mut out = doc.clone();
                        out.insert("id".into(), Value::String(id.clone()));
                        out
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    fn add_item(&mut self, collection: Collection, fields: Document) -> StoreResult<String> {
        let id = new_id();
        self.collections
            .entry(collection)
            .or_default()
            .push((id.clone(), strip_id(fields)));
        Ok(id)
    }

    fn update_item(
        &mut self,
        collection: Collection,
        id: &str,
        patch: Document,
    ) -> StoreResult<()> {
        let doc = self.find_mut(collection, id)?;
        for (k, v) in strip_id(patch) {
            doc.insert(k, v);
        }
        Ok(())
    }

    fn delete_item(&mut self, collection: Collection, id: &str) -> StoreResult<()> {
        let docs = self.collections.entry(collection).or_default();
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        if docs.len() == before {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn restore_collection(
        &mut self,
        collection: Collection,
        documents: Vec<Document>,
    ) -> StoreResult<()> {
        let mut docs = Vec::with_capacity(documents.len());
        for doc in documents {
            let id = match doc.get("id").and_then(|v| v.as_str()) {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => new_id(),
            };
            docs.push((id, strip_id(doc)));
        }
        self.collections.insert(collection, docs);
        Ok(())
    }

    fn status(&self) -> ApiStatus {
        ApiStatus::Mock
    }
}
