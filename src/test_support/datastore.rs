use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::firestore::api::{DocumentData, DocumentSnapshot};
use crate::firestore::error::{FirestoreError, FirestoreResult};
use crate::firestore::model::{DocumentKey, ResourcePath};
use crate::firestore::remote::datastore::{Datastore, InMemoryDatastore};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatastoreCall {
    Add,
    Get,
    Set,
    Update,
    Delete,
    List,
}

/// `InMemoryDatastore` wrapper that records every call, can fail chosen calls
/// and can hold a list request open until the test releases it.
#[derive(Default)]
pub struct RecordingDatastore {
    backing: InMemoryDatastore,
    calls: Mutex<Vec<DatastoreCall>>,
    failures: Mutex<HashMap<DatastoreCall, FirestoreError>>,
    list_gate: Mutex<Option<PausedList>>,
}

/// A list request parked after reading the backing store.
#[derive(Clone, Default)]
pub struct PausedList {
    fetched: Arc<Notify>,
    release: Arc<Notify>,
}

impl PausedList {
    pub async fn wait_until_fetched(&self) {
        self.fetched.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

impl RecordingDatastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for seeding and inspection; not recorded.
    pub fn backing(&self) -> &InMemoryDatastore {
        &self.backing
    }

    pub fn calls(&self) -> Vec<DatastoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes every later `call` fail with `error` until cleared.
    pub fn fail(&self, call: DatastoreCall, error: FirestoreError) {
        self.failures.lock().unwrap().insert(call, error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// The next `list_documents` call reads the store, then waits for
    /// [`PausedList::release`] before returning.
    pub fn pause_next_list(&self) -> PausedList {
        let paused = PausedList::default();
        *self.list_gate.lock().unwrap() = Some(paused.clone());
        paused
    }

    fn record(&self, call: DatastoreCall) -> FirestoreResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Datastore for RecordingDatastore {
    async fn add_document(
        &self,
        collection: &ResourcePath,
        data: DocumentData,
    ) -> FirestoreResult<DocumentKey> {
        self.record(DatastoreCall::Add)?;
        self.backing.add_document(collection, data).await
    }

    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot> {
        self.record(DatastoreCall::Get)?;
        self.backing.get_document(key).await
    }

    async fn set_document(&self, key: &DocumentKey, data: DocumentData) -> FirestoreResult<()> {
        self.record(DatastoreCall::Set)?;
        self.backing.set_document(key, data).await
    }

    async fn update_document(
        &self,
        key: &DocumentKey,
        data: DocumentData,
    ) -> FirestoreResult<()> {
        self.record(DatastoreCall::Update)?;
        self.backing.update_document(key, data).await
    }

    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()> {
        self.record(DatastoreCall::Delete)?;
        self.backing.delete_document(key).await
    }

    async fn list_documents(
        &self,
        collection: &ResourcePath,
    ) -> FirestoreResult<Vec<DocumentSnapshot>> {
        self.record(DatastoreCall::List)?;
        let gate = self.list_gate.lock().unwrap().take();
        let result = self.backing.list_documents(collection).await;
        if let Some(gate) = gate {
            gate.fetched.notify_one();
            gate.release.notified().await;
        }
        result
    }
}
