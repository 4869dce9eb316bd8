mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Students,
    Classes,
    Events,
    Interventions,
    Grades,
    QuickNotes,
    Resources,
    FollowUpNotes,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Students,
        Collection::Classes,
        Collection::Events,
        Collection::Interventions,
        Collection::Grades,
        Collection::QuickNotes,
        Collection::Resources,
        Collection::FollowUpNotes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Classes => "classes",
            Self::Events => "events",
            Self::Interventions => "interventions",
            Self::Grades => "grades",
            Self::QuickNotes => "quick_notes",
            Self::Resources => "resources",
            Self::FollowUpNotes => "follow_up_notes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Connected,
    Mock,
}

impl ApiStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Mock => "mock",
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("invalid document in {collection}: {message}")]
    InvalidDocument {
        collection: Collection,
        message: String,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidDocument { .. } => "bad_document",
            Self::Sqlite(_) => "db_query_failed",
            Self::Json(_) => "bad_document",
            Self::Unavailable(_) => "store_unavailable",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document store over named collections. Ids are assigned by the store and
/// returned as the `id` field of every document.
pub trait CollectionStore {
    /// Whole collection in insertion order.
    fn get_items(&self, collection: Collection) -> StoreResult<Vec<Document>>;

    /// Inserts a new document and returns its id. An `id` key in `fields` is ignored.
    fn add_item(&mut self, collection: Collection, fields: Document) -> StoreResult<String>;

    /// Merges `patch` into the stored document; keys not in `patch` keep their value.
    fn update_item(&mut self, collection: Collection, id: &str, patch: Document)
        -> StoreResult<()>;

    fn delete_item(&mut self, collection: Collection, id: &str) -> StoreResult<()>;

    /// Replaces the whole collection, keeping the ids carried by `documents`.
    fn restore_collection(
        &mut self,
        collection: Collection,
        documents: Vec<Document>,
    ) -> StoreResult<()>;

    fn status(&self) -> ApiStatus;
}

fn decode<T: DeserializeOwned>(collection: Collection, doc: Document) -> StoreResult<T> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::InvalidDocument {
        collection,
        message: e.to_string(),
    })
}

/// Strict read: the first document that does not decode fails the whole call.
#[cfg(test)]
pub fn get_typed<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    collection: Collection,
) -> StoreResult<Vec<T>> {
    store
        .get_items(collection)?
        .into_iter()
        .map(|doc| decode(collection, doc))
        .collect()
}

/// Page read: documents that do not decode are logged and skipped, so one
/// malformed record never hides the rest of its collection.
pub fn load_typed<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    collection: Collection,
) -> StoreResult<Vec<T>> {
    let docs = store.get_items(collection)?;
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let id = doc
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        match decode(collection, doc) {
            Ok(record) => out.push(record),
            Err(e) => {
                tracing::warn!(%collection, id = %id, error = %e, "skipping undecodable document")
            }
        }
    }
    Ok(out)
}

pub fn add_typed<T: Serialize>(
    store: &mut dyn CollectionStore,
    collection: Collection,
    record: &T,
) -> StoreResult<String> {
    let mut fields = to_document(collection, record)?;
    fields.remove("id");
    store.add_item(collection, fields)
}

pub fn to_document<T: Serialize>(collection: Collection, record: &T) -> StoreResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument {
            collection,
            message: format!("expected object, got {}", other),
        }),
    }
}

/// Builds a patch from key/value pairs.
pub fn patch<I, K>(fields: I) -> Document
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    fields.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

pub(crate) fn strip_id(mut doc: Document) -> Document {
    doc.remove("id");
    doc
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
