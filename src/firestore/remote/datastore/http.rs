use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;

use crate::firestore::api::{DocumentData, DocumentSnapshot};
use crate::firestore::error::{internal_error, invalid_argument, FirestoreResult};
use crate::firestore::model::{DatabaseId, DocumentKey, ResourcePath};
use crate::firestore::remote::connection::{
    documents_path, Connection, ConnectionBuilder, RequestContext,
};
use crate::firestore::remote::serializer::JsonProtoSerializer;

use super::{Datastore, NoopTokenProvider, TokenProviderArc};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Datastore backed by the Firestore REST API (v1).
///
/// Each operation is a single request; failures are mapped to
/// `FirestoreError` and returned without retrying.
#[derive(Clone)]
pub struct HttpDatastore {
    connection: Connection,
    serializer: JsonProtoSerializer,
    auth_provider: TokenProviderArc,
    request_timeout: Duration,
}

#[derive(Clone)]
pub struct HttpDatastoreBuilder {
    database_id: DatabaseId,
    connection_builder: ConnectionBuilder,
    auth_provider: TokenProviderArc,
    request_timeout: Duration,
}

impl HttpDatastore {
    pub fn builder(database_id: DatabaseId) -> HttpDatastoreBuilder {
        HttpDatastoreBuilder::new(database_id)
    }

    pub fn from_database_id(database_id: DatabaseId) -> FirestoreResult<Self> {
        Self::builder(database_id).build()
    }

    async fn request_context(&self) -> FirestoreResult<RequestContext> {
        Ok(RequestContext {
            auth_token: self.auth_provider.get_token().await?,
            request_timeout: Some(self.request_timeout),
        })
    }
}

#[async_trait]
impl Datastore for HttpDatastore {
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
        let context = self.request_context().await?;
        let body = self.serializer.encode_document_fields(&data);
        let response = self
            .connection
            .invoke_json(
                Method::POST,
                &documents_path(collection),
                &[],
                Some(body),
                &context,
            )
            .await?;
        let snapshot = self.serializer.decode_document(&response)?;
        Ok(snapshot.document_key().clone())
    }

    async fn get_document(&self, key: &DocumentKey) -> FirestoreResult<DocumentSnapshot> {
        let context = self.request_context().await?;
        let response = self
            .connection
            .invoke_json_optional(Method::GET, &documents_path(key.path()), &[], None, &context)
            .await?;
        match response {
            Some(document) => self.serializer.decode_document(&document),
            None => Ok(DocumentSnapshot::new(key.clone(), None)),
        }
    }

    async fn set_document(&self, key: &DocumentKey, data: DocumentData) -> FirestoreResult<()> {
        // PATCH without an update mask replaces the whole document.
        let context = self.request_context().await?;
        let body = self.serializer.encode_document_fields(&data);
        self.connection
            .invoke_json(
                Method::PATCH,
                &documents_path(key.path()),
                &[],
                Some(body),
                &context,
            )
            .await
            .map(|_| ())
    }

    async fn update_document(
        &self,
        key: &DocumentKey,
        data: DocumentData,
    ) -> FirestoreResult<()> {
        if data.is_empty() {
            return Err(invalid_argument(
                "update_document requires at least one field",
            ));
        }
        let context = self.request_context().await?;
        let mut query: Vec<(&str, String)> = data
            .keys()
            .map(|field| ("updateMask.fieldPaths", quote_field_name(field)))
            .collect();
        query.push(("currentDocument.exists", "true".to_string()));
        let body = self.serializer.encode_document_fields(&data);
        self.connection
            .invoke_json(
                Method::PATCH,
                &documents_path(key.path()),
                &query,
                Some(body),
                &context,
            )
            .await
            .map(|_| ())
    }

    async fn delete_document(&self, key: &DocumentKey) -> FirestoreResult<()> {
        let context = self.request_context().await?;
        self.connection
            .invoke_json(Method::DELETE, &documents_path(key.path()), &[], None, &context)
            .await
            .map(|_| ())
    }

    async fn list_documents(
        &self,
        collection: &ResourcePath,
    ) -> FirestoreResult<Vec<DocumentSnapshot>> {
        let path = documents_path(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let context = self.request_context().await?;
            let query: Vec<(&str, String)> = page_token
                .take()
                .map(|token| vec![("pageToken", token)])
                .unwrap_or_default();
            let response = self
                .connection
                .invoke_json(Method::GET, &path, &query, None, &context)
                .await?;

            if let Some(entries) = response.get("documents") {
                let entries = entries
                    .as_array()
                    .ok_or_else(|| internal_error("Firestore list response 'documents' must be an array"))?;
                for entry in entries {
                    documents.push(self.serializer.decode_document(entry)?);
                }
            }

            match response.get("nextPageToken").and_then(JsonValue::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(documents)
    }
}

/// Field paths that are not plain identifiers must be backtick-quoted.
fn quote_field_name(field: &str) -> String {
    let mut chars = field.chars();
    let simple = matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

impl HttpDatastoreBuilder {
    fn new(database_id: DatabaseId) -> Self {
        let connection_builder = Connection::builder(database_id.clone());
        Self {
            database_id,
            connection_builder,
            auth_provider: Arc::new(NoopTokenProvider),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_auth_provider(mut self, provider: TokenProviderArc) -> Self {
        self.auth_provider = provider;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_connection_builder(mut self, builder: ConnectionBuilder) -> Self {
        self.connection_builder = builder;
        self
    }

    pub fn build(self) -> FirestoreResult<HttpDatastore> {
        let connection = self.connection_builder.build()?;
        Ok(HttpDatastore {
            connection,
            serializer: JsonProtoSerializer::new(self.database_id),
            auth_provider: self.auth_provider,
            request_timeout: self.request_timeout,
        })
    }
}
