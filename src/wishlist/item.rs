use serde::{Deserialize, Serialize};

use crate::firestore::api::{encode_document, DocumentData, DocumentSnapshot};
use crate::firestore::error::{not_found, FirestoreResult};

/// One wishlist entry as stored under `users/{uid}/myWishList/{docID}`.
///
/// `doc_id` is `None` until the backend has assigned an id and it has been
/// written back onto the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishListItem {
    #[serde(default)]
    pub item_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(rename = "docID", default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

impl WishListItem {
    pub fn new(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    pub(crate) fn to_document_data(&self) -> FirestoreResult<DocumentData> {
        encode_document(self)
    }

    /// Decodes the stored fields as-is; `doc_id` comes from the `docID` field,
    /// not from the document's key.
    pub(crate) fn from_snapshot(snapshot: &DocumentSnapshot) -> FirestoreResult<Self> {
        snapshot.to_object()?.ok_or_else(|| {
            not_found(format!(
                "Document {} has no data",
                snapshot.document_key().path()
            ))
        })
    }
}
