//! Minimal Cloud Firestore client: paths, documents, and the `Datastore` seam
//! with in-memory and REST implementations.

pub mod api;
mod constants;
pub mod error;
pub mod model;
pub mod remote;

pub use api::{encode_document, DocumentData, DocumentSnapshot};
pub use error::{FirestoreError, FirestoreErrorCode, FirestoreResult};
pub use model::{DatabaseId, DocumentKey, ResourcePath};
pub use remote::{
    Datastore, DatastoreArc, HttpDatastore, InMemoryDatastore, TokenProvider, TokenProviderArc,
};
