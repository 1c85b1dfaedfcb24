//! Test utilities shared across crate-level unit tests.

pub mod datastore;
pub mod http;

pub use datastore::{DatastoreCall, PausedList, RecordingDatastore};
pub use http::start_mock_server;
