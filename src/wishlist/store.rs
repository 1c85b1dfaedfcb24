use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;

use crate::app::{FirebaseOptions, WishlistSettings};
use crate::auth::{AuthTokenProvider, IdentityProvider, IdentityToolkitAuth};
use crate::firestore::api::{encode_document, DocumentData};
use crate::firestore::error::{invalid_argument, FirestoreError, FirestoreResult};
use crate::firestore::model::{DatabaseId, DocumentKey, ResourcePath};
use crate::firestore::remote::{DatastoreArc, HttpDatastore};
use crate::platform::runtime::spawn_detached;

use super::item::WishListItem;
use super::operation::OperationHandle;
use super::profile::UserProfile;
use super::session::Session;

const DOC_ID_FIELD: &str = "docID";

/// Wishlist data access for UI callers.
///
/// Every write is followed by a refresh that starts only after the write has
/// completed, so the cache reflects the write unless the refresh itself fails.
/// The cache holds the result of the most recently *started* refresh that has
/// completed; an older refresh finishing late never replaces it.
#[derive(Clone)]
pub struct RemoteListStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    identity: Arc<dyn IdentityProvider>,
    datastore: DatastoreArc,
    settings: WishlistSettings,
    cache: Mutex<CachedList>,
    refresh_tickets: AtomicU64,
}

#[derive(Default)]
struct CachedList {
    ticket: u64,
    items: Vec<WishListItem>,
}

impl RemoteListStore {
    pub fn new(identity: Arc<dyn IdentityProvider>, datastore: DatastoreArc) -> Self {
        Self::with_settings(identity, datastore, WishlistSettings::default())
    }

    pub fn with_settings(
        identity: Arc<dyn IdentityProvider>,
        datastore: DatastoreArc,
        settings: WishlistSettings,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                identity,
                datastore,
                settings,
                cache: Mutex::new(CachedList::default()),
                refresh_tickets: AtomicU64::new(0),
            }),
        }
    }

    /// Store talking to Cloud Firestore over REST, authorized by `auth`'s
    /// signed-in user.
    pub fn connect(
        options: &FirebaseOptions,
        auth: Arc<IdentityToolkitAuth>,
    ) -> FirestoreResult<Self> {
        let database_id = DatabaseId::from_options(options)?;
        let datastore = HttpDatastore::builder(database_id)
            .with_auth_provider(AuthTokenProvider::new(auth.clone()).into_arc())
            .build()?;
        Ok(Self::new(auth, Arc::new(datastore)))
    }

    pub fn settings(&self) -> &WishlistSettings {
        &self.inner.settings
    }

    /// Opens a session for the signed-in user and loads their list.
    ///
    /// Returns `Ok(None)` without touching the datastore or the cache when
    /// nobody is signed in. A failed initial load is logged and the session
    /// is still returned, with the cache left as it was.
    pub async fn bind_session(&self) -> FirestoreResult<Option<Session>> {
        let Some(user) = self.inner.identity.current_user() else {
            log::debug!("no one signed in; wishlist not loaded");
            return Ok(None);
        };
        let session = Session::for_user(&user)?;
        match self.refresh(&session).await {
            Ok(items) => log::debug!(
                "bound wishlist for {} with {} items",
                session.uid(),
                items.len()
            ),
            Err(err) => log::warn!(
                "bound wishlist for {} but could not load it: {err}",
                session.uid()
            ),
        }
        Ok(Some(session))
    }

    /// Adds `item` to the session's list and returns it with its new `doc_id`.
    ///
    /// The backend id is written back onto the document in a second request.
    /// If that second request fails the document exists without a `docID`
    /// field and the error is returned.
    pub async fn create(
        &self,
        session: &Session,
        mut item: WishListItem,
    ) -> FirestoreResult<WishListItem> {
        item.doc_id = None;
        let collection = self.items_collection(session)?;
        let key = self
            .inner
            .datastore
            .add_document(&collection, item.to_document_data()?)
            .await
            .map_err(log_failure("Error adding document"))?;

        let mut stamp = DocumentData::new();
        stamp.insert(
            DOC_ID_FIELD.to_string(),
            JsonValue::String(key.id().to_string()),
        );
        self.inner
            .datastore
            .update_document(&key, stamp)
            .await
            .map_err(log_failure("Error recording docID"))?;

        log::info!("just added {}", item.item_name);
        item.doc_id = Some(key.id().to_string());
        self.refresh_after_write(session, "create").await;
        Ok(item)
    }

    /// Overwrites the stored document with every field of `item`.
    pub async fn update(&self, session: &Session, item: &WishListItem) -> FirestoreResult<()> {
        let key = self.item_key(session, item)?;
        self.inner
            .datastore
            .set_document(&key, item.to_document_data()?)
            .await
            .map_err(log_failure("Error updating document"))?;

        log::info!("{} successfully updated!", item.item_name);
        self.refresh_after_write(session, "update").await;
        Ok(())
    }

    pub async fn delete(&self, session: &Session, item: &WishListItem) -> FirestoreResult<()> {
        let key = self.item_key(session, item)?;
        self.inner
            .datastore
            .delete_document(&key)
            .await
            .map_err(log_failure("Error deleting document"))?;

        log::info!("{} successfully deleted!", item.item_name);
        self.refresh_after_write(session, "delete").await;
        Ok(())
    }

    /// Fetches the session's whole list, caches it and returns it.
    ///
    /// Items keep the order the backend returned. On failure the cache is left
    /// as it was.
    pub async fn refresh(&self, session: &Session) -> FirestoreResult<Vec<WishListItem>> {
        let ticket = self.inner.refresh_tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let collection = self.items_collection(session)?;
        let snapshots = self
            .inner
            .datastore
            .list_documents(&collection)
            .await
            .map_err(log_failure("Error getting documents"))?;
        let items = snapshots
            .iter()
            .map(WishListItem::from_snapshot)
            .collect::<FirestoreResult<Vec<_>>>()
            .map_err(log_failure("Error decoding documents"))?;

        self.install(ticket, &items);
        Ok(items)
    }

    /// Refreshes in the background and hands the list to `callback` on
    /// success. Failures are logged and the callback is not invoked.
    pub fn refresh_with<F>(&self, session: &Session, callback: F)
    where
        F: FnOnce(Vec<WishListItem>) + Send + 'static,
    {
        let store = self.clone();
        let session = session.clone();
        spawn_detached(async move {
            match store.refresh(&session).await {
                Ok(items) => callback(items),
                Err(err) => {
                    log::debug!("refresh for {} dropped: {err}", session.uid());
                }
            }
        });
    }

    /// The most recently cached list. Never contacts the backend.
    pub fn cached_items(&self) -> Vec<WishListItem> {
        self.inner.cache.lock().unwrap().items.clone()
    }

    /// Writes the profile document `users/{uid}` for a newly created account.
    pub async fn register_account(&self, uid: &str, display_name: &str) -> FirestoreResult<()> {
        let key = self.user_document(uid)?;
        let profile = encode_document(&UserProfile::new(display_name))?;
        self.inner
            .datastore
            .set_document(&key, profile)
            .await
            .map_err(log_failure("Error adding user account"))?;
        log::info!("{display_name}'s user account added");
        Ok(())
    }

    /// Creates an email/password account, signs it in and writes its profile.
    ///
    /// Identity failures surface as `Unauthenticated`. If the profile write
    /// fails the account still exists and stays signed in.
    pub async fn register_user(
        &self,
        auth: &IdentityToolkitAuth,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> FirestoreResult<Session> {
        let user = auth
            .create_user_with_email_and_password(email, password, Some(display_name))
            .await
            .map_err(FirestoreError::from)
            .map_err(log_failure("Error creating account"))?;
        self.register_account(user.uid(), display_name).await?;
        Session::for_user(&user)
    }

    pub async fn fetch_profile(&self, uid: &str) -> FirestoreResult<Option<UserProfile>> {
        let key = self.user_document(uid)?;
        let snapshot = self
            .inner
            .datastore
            .get_document(&key)
            .await
            .map_err(log_failure("Error reading user account"))?;
        snapshot.to_object()
    }

    pub fn spawn_create(
        &self,
        session: &Session,
        item: WishListItem,
    ) -> OperationHandle<WishListItem> {
        let store = self.clone();
        let session = session.clone();
        OperationHandle::spawn(async move { store.create(&session, item).await })
    }

    pub fn spawn_update(&self, session: &Session, item: WishListItem) -> OperationHandle<()> {
        let store = self.clone();
        let session = session.clone();
        OperationHandle::spawn(async move { store.update(&session, &item).await })
    }

    pub fn spawn_delete(&self, session: &Session, item: WishListItem) -> OperationHandle<()> {
        let store = self.clone();
        let session = session.clone();
        OperationHandle::spawn(async move { store.delete(&session, &item).await })
    }

    pub fn spawn_refresh(&self, session: &Session) -> OperationHandle<Vec<WishListItem>> {
        let store = self.clone();
        let session = session.clone();
        OperationHandle::spawn(async move { store.refresh(&session).await })
    }

    async fn refresh_after_write(&self, session: &Session, operation: &str) {
        if let Err(err) = self.refresh(session).await {
            log::warn!("refresh after {operation} failed; cached list is stale: {err}");
        }
    }

    fn install(&self, ticket: u64, items: &[WishListItem]) {
        let mut cache = self.inner.cache.lock().unwrap();
        if ticket > cache.ticket {
            cache.ticket = ticket;
            cache.items = items.to_vec();
        } else {
            log::debug!("discarding refresh #{ticket}; #{} already cached", cache.ticket);
        }
    }

    fn user_document(&self, uid: &str) -> FirestoreResult<DocumentKey> {
        let users = ResourcePath::root().child(&self.inner.settings.users_collection)?;
        DocumentKey::in_collection(&users, uid)
    }

    fn items_collection(&self, session: &Session) -> FirestoreResult<ResourcePath> {
        self.user_document(session.uid())?
            .path()
            .child(&self.inner.settings.items_collection)
    }

    fn item_key(&self, session: &Session, item: &WishListItem) -> FirestoreResult<DocumentKey> {
        let doc_id = item.doc_id().ok_or_else(|| {
            invalid_argument(format!(
                "'{}' has no docID; create it before changing it",
                item.item_name
            ))
        })?;
        DocumentKey::in_collection(&self.items_collection(session)?, doc_id)
    }
}

fn log_failure(context: &'static str) -> impl FnOnce(FirestoreError) -> FirestoreError {
    move |err| {
        log::warn!("{context}: {err}");
        err
    }
}
