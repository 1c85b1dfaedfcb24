use std::sync::Arc;

use async_trait::async_trait;

use crate::firestore::api::{DocumentData, DocumentSnapshot};
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::{DocumentKey, ResourcePath};

pub mod http;
pub mod in_memory;

/// Document operations the wishlist store needs from a Firestore backend.
#[async_trait]
pub trait Datastore: Send + Sync + 'static {
    /// Creates a document with a backend-generated id and returns its key.
    async fn add_document(
        &self,
        collection: &ResourcePath,
        data: DocumentData,
    ) -> FirestoreResult<DocumentKey>;
    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot>;
    /// Replaces the whole document, creating it when absent.
    async fn set_document(&self, key: &DocumentKey, data: DocumentData) -> FirestoreResult<()>;
    /// Overwrites only the top-level fields present in `data`. Fails with
    /// `NotFound` when the document does not exist.
    async fn update_document(&self, key: &DocumentKey, data: DocumentData)
        -> FirestoreResult<()>;
    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()>;
    /// Every document directly inside `collection`, in backend order.
    async fn list_documents(
        &self,
        collection: &ResourcePath,
    ) -> FirestoreResult<Vec<DocumentSnapshot>>;
}

#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    async fn get_token(&self) -> FirestoreResult<Option<String>>;
}

#[derive(Default, Clone)]
pub struct NoopTokenProvider;

#[async_trait]
impl TokenProvider for NoopTokenProvider {
    async fn get_token(&self) -> FirestoreResult<Option<String>> {
        Ok(None)
    }
}

pub type DatastoreArc = Arc<dyn Datastore>;
pub type TokenProviderArc = Arc<dyn TokenProvider>;

pub use http::{HttpDatastore, HttpDatastoreBuilder};
pub use in_memory::InMemoryDatastore;
