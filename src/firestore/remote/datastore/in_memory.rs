use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::firestore::api::{DocumentData, DocumentSnapshot};
use crate::firestore::error::{invalid_argument, not_found, FirestoreResult};
use crate::firestore::model::{DocumentKey, ResourcePath};

use super::Datastore;

const AUTO_ID_LENGTH: usize = 20;

/// Process-local datastore keyed by canonical document path.
///
/// Listing returns documents ordered by id, which matches the default order
/// of a Firestore collection read.
#[derive(Clone, Default)]
pub struct InMemoryDatastore {
    documents: Arc<Mutex<BTreeMap<String, DocumentData>>>,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across every collection.
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn apply_set(&self, key: &DocumentKey, data: DocumentData) {
        let mut store = self.documents.lock().unwrap();
        store.insert(key.path().canonical_string(), data);
    }

    fn apply_update(&self, key: &DocumentKey, data: DocumentData) -> FirestoreResult<()> {
        let mut store = self.documents.lock().unwrap();
        let canonical = key.path().canonical_string();
        let current = store
            .get_mut(&canonical)
            .ok_or_else(|| not_found(format!("No document to update: {canonical}")))?;
        for (field, value) in data {
            current.insert(field, value);
        }
        Ok(())
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn add_document(
        &self,
        collection: &ResourcePath,
        data: DocumentData,
    ) -> FirestoreResult<DocumentKey> {
        if !collection.is_collection() {
            return Err(invalid_argument(format!(
                "'{collection}' is not a collection path"
            )));
        }
        let key = DocumentKey::in_collection(collection, &generate_auto_id())?;
        self.apply_set(&key, data);
        Ok(key)
    }

    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot> {
        let store = self.documents.lock().unwrap();
        let data = store.get(&key.path().canonical_string()).cloned();
        Ok(DocumentSnapshot::new(key.clone(), data))
    }

    async fn set_document(&self, key: &DocumentKey, data: DocumentData) -> FirestoreResult<()> {
        self.apply_set(key, data);
        Ok(())
    }

    async fn update_document(
        &self,
        key: &DocumentKey,
        data: DocumentData,
    ) -> FirestoreResult<()> {
        self.apply_update(key, data)
    }

    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()> {
        let mut store = self.documents.lock().unwrap();
        store.remove(&key.path().canonical_string());
        Ok(())
    }

    async fn list_documents(
        &self,
        collection: &ResourcePath,
    ) -> FirestoreResult<Vec<DocumentSnapshot>> {
        let store = self.documents.lock().unwrap();
        let mut documents = Vec::new();
        for (path, data) in store.iter() {
            let key = DocumentKey::from_string(path)?;
            if &key.collection_path() != collection {
                continue;
            }
            documents.push(DocumentSnapshot::new(key, Some(data.clone())));
        }
        Ok(documents)
    }
}

fn generate_auto_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(AUTO_ID_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> DocumentData {
        value.as_object().cloned().unwrap()
    }

    fn wishlist() -> ResourcePath {
        ResourcePath::from_string("users/alice/myWishList").unwrap()
    }

    #[tokio::test]
    async fn add_generates_ids_inside_collection() {
        let datastore = InMemoryDatastore::new();
        let key = datastore
            .add_document(&wishlist(), fields(json!({ "itemName": "Lamp" })))
            .await
            .unwrap();
        assert_eq!(key.id().len(), AUTO_ID_LENGTH);
        assert_eq!(key.collection_path(), wishlist());

        let snapshot = datastore.get_document(&key).await.unwrap();
        assert_eq!(snapshot.data().unwrap().get("itemName"), Some(&json!("Lamp")));
    }

    #[tokio::test]
    async fn add_rejects_document_paths() {
        let datastore = InMemoryDatastore::new();
        let document = ResourcePath::from_string("users/alice").unwrap();
        let err = datastore
            .add_document(&document, DocumentData::new())
            .await
            .unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
    }

    #[tokio::test]
    async fn update_patches_fields_and_requires_existing_document() {
        let datastore = InMemoryDatastore::new();
        let key = DocumentKey::in_collection(&wishlist(), "abc").unwrap();

        let err = datastore
            .update_document(&key, fields(json!({ "docID": "abc" })))
            .await
            .unwrap_err();
        assert_eq!(err.code_str(), "firestore/not-found");

        datastore
            .set_document(&key, fields(json!({ "itemName": "Lamp", "price": 10.0 })))
            .await
            .unwrap();
        datastore
            .update_document(&key, fields(json!({ "docID": "abc" })))
            .await
            .unwrap();

        let snapshot = datastore.get_document(&key).await.unwrap();
        assert_eq!(
            snapshot.data().cloned().unwrap(),
            fields(json!({ "itemName": "Lamp", "price": 10.0, "docID": "abc" }))
        );
    }

    #[tokio::test]
    async fn set_replaces_whole_document() {
        let datastore = InMemoryDatastore::new();
        let key = DocumentKey::in_collection(&wishlist(), "abc").unwrap();
        datastore
            .set_document(&key, fields(json!({ "itemName": "Lamp", "price": 10.0 })))
            .await
            .unwrap();
        datastore
            .set_document(&key, fields(json!({ "itemName": "Desk lamp" })))
            .await
            .unwrap();
        let snapshot = datastore.get_document(&key).await.unwrap();
        assert_eq!(
            snapshot.data().cloned().unwrap(),
            fields(json!({ "itemName": "Desk lamp" }))
        );
    }

    #[tokio::test]
    async fn list_is_scoped_to_direct_children_in_id_order() {
        let datastore = InMemoryDatastore::new();
        let collection = wishlist();
        for id in ["b", "a", "c"] {
            let key = DocumentKey::in_collection(&collection, id).unwrap();
            datastore
                .set_document(&key, fields(json!({ "itemName": id })))
                .await
                .unwrap();
        }
        let other = ResourcePath::from_string("users/bob/myWishList").unwrap();
        let foreign = DocumentKey::in_collection(&other, "z").unwrap();
        datastore
            .set_document(&foreign, DocumentData::new())
            .await
            .unwrap();
        let profile = DocumentKey::from_string("users/alice").unwrap();
        datastore
            .set_document(&profile, fields(json!({ "name": "Alice" })))
            .await
            .unwrap();

        let ids: Vec<_> = datastore
            .list_documents(&collection)
            .await
            .unwrap()
            .iter()
            .map(|snapshot| snapshot.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn delete_missing_document_is_not_an_error() {
        let datastore = InMemoryDatastore::new();
        let key = DocumentKey::in_collection(&wishlist(), "ghost").unwrap();
        datastore.delete_document(&key).await.unwrap();
        assert!(datastore.is_empty());
    }
}
