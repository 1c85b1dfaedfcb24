use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::firestore::error::{internal_error, FirestoreResult};
use crate::firestore::model::DocumentKey;

/// Top-level fields of a document, decoded into plain JSON values.
pub type DocumentData = serde_json::Map<String, JsonValue>;

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    key: DocumentKey,
    data: Option<DocumentData>,
}

impl DocumentSnapshot {
    pub fn new(key: DocumentKey, data: Option<DocumentData>) -> Self {
        Self { key, data }
    }

    /// Returns whether the document exists on the backend.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&DocumentData> {
        self.data.as_ref()
    }

    pub fn id(&self) -> &str {
        self.key.id()
    }

    pub fn document_key(&self) -> &DocumentKey {
        &self.key
    }

    /// Deserializes the document fields into `T`; `None` when the document is missing.
    pub fn to_object<T>(&self) -> FirestoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(data) = &self.data else {
            return Ok(None);
        };
        serde_json::from_value(JsonValue::Object(data.clone()))
            .map(Some)
            .map_err(|err| {
                internal_error(format!(
                    "Document {} could not be decoded: {err}",
                    self.key.path()
                ))
            })
    }
}

/// Serializes `value` into document fields. Only structs and maps are accepted.
pub fn encode_document<T>(value: &T) -> FirestoreResult<DocumentData>
where
    T: Serialize + ?Sized,
{
    match serde_json::to_value(value)? {
        JsonValue::Object(fields) => Ok(fields),
        other => Err(internal_error(format!(
            "Documents must serialize to a map, got {other}"
        ))),
    }
}
