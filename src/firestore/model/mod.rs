pub mod database_id;
pub mod document_key;
pub mod resource_path;

pub use database_id::DatabaseId;
pub use document_key::DocumentKey;
pub use resource_path::ResourcePath;
