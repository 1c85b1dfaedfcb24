mod snapshot;

pub use snapshot::{encode_document, DocumentData, DocumentSnapshot};
