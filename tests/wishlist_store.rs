use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;
use wishlist_store::auth::InMemoryIdentityProvider;
use wishlist_store::firestore::remote::{Connection, HttpDatastore};
use wishlist_store::firestore::{
    DatabaseId, Datastore, DocumentKey, FirestoreErrorCode, InMemoryDatastore,
};
use wishlist_store::wishlist::{OperationStatus, RemoteListStore, Session, WishListItem};

fn store_for(uid: &str) -> (RemoteListStore, Arc<InMemoryDatastore>) {
    let identity = Arc::new(InMemoryIdentityProvider::signed_in(uid));
    let datastore = Arc::new(InMemoryDatastore::new());
    (RemoteListStore::new(identity, datastore.clone()), datastore)
}

#[tokio::test]
async fn signed_in_user_manages_their_list() {
    let (store, _) = store_for("alice");
    let session = store.bind_session().await.unwrap().expect("signed in");
    assert!(store.cached_items().is_empty());

    let kettle = store
        .create(&session, WishListItem::new("Kettle").with_price(24.5))
        .await
        .unwrap();
    let atlas = store
        .create(&session, WishListItem::new("Atlas").with_priority(1))
        .await
        .unwrap();
    let names: Vec<_> = store
        .cached_items()
        .into_iter()
        .map(|item| item.item_name)
        .collect();
    assert!(names.contains(&"Kettle".to_string()));
    assert!(names.contains(&"Atlas".to_string()));

    let mut cheaper = kettle.clone();
    cheaper.price = Some(19.0);
    store.update(&session, &cheaper).await.unwrap();
    assert!(store.cached_items().contains(&cheaper));

    store.delete(&session, &atlas).await.unwrap();
    let items = store.refresh(&session).await.unwrap();
    assert_eq!(items, vec![cheaper]);
    assert_eq!(store.cached_items(), items);
}

#[tokio::test]
async fn lists_are_kept_per_user() {
    let (store, datastore) = store_for("alice");
    let alice = Session::for_uid("alice").unwrap();
    let bob = Session::for_uid("bob").unwrap();

    store
        .create(&alice, WishListItem::new("Kettle"))
        .await
        .unwrap();
    assert!(store.refresh(&bob).await.unwrap().is_empty());
    assert_eq!(store.refresh(&alice).await.unwrap().len(), 1);
    assert_eq!(datastore.len(), 1);
}

#[tokio::test]
async fn nobody_signed_in_binds_nothing() {
    let identity = Arc::new(InMemoryIdentityProvider::new());
    let datastore = Arc::new(InMemoryDatastore::new());
    datastore
        .set_document(
            &DocumentKey::from_string("users/alice/myWishList/a").unwrap(),
            json!({ "itemName": "Atlas" }).as_object().cloned().unwrap(),
        )
        .await
        .unwrap();
    let store = RemoteListStore::new(identity, datastore);

    assert_eq!(store.bind_session().await.unwrap(), None);
    assert!(store.cached_items().is_empty());
}

#[tokio::test]
async fn unsaved_items_cannot_be_deleted() {
    let (store, _) = store_for("alice");
    let session = Session::for_uid("alice").unwrap();

    let handle = store.spawn_delete(&session, WishListItem::new("Kettle"));
    let err = handle.wait().await.unwrap_err();
    assert_eq!(err.code, FirestoreErrorCode::InvalidArgument);
}

#[tokio::test]
async fn background_create_settles_with_status() {
    let (store, _) = store_for("alice");
    let session = Session::for_uid("alice").unwrap();

    let mut handle = store.spawn_create(&session, WishListItem::new("Kettle"));
    let created = loop {
        if let Some(result) = handle.try_take() {
            break result.unwrap();
        }
        tokio::task::yield_now().await;
    };
    assert_eq!(handle.status(), OperationStatus::Succeeded);
    assert!(created.doc_id().is_some());
}

#[tokio::test]
async fn back_to_back_refreshes_see_consistent_snapshots() {
    let (store, _) = store_for("alice");
    let session = Session::for_uid("alice").unwrap();
    store
        .create(&session, WishListItem::new("Kettle"))
        .await
        .unwrap();

    let (first, second) = futures::join!(store.refresh(&session), store.refresh(&session));
    let (first, second) = (first.unwrap(), second.unwrap());
    let cached = store.cached_items();
    assert!(cached == first || cached == second);
}

#[tokio::test]
async fn create_over_rest_stamps_doc_id_and_refreshes() {
    let server = MockServer::start_async().await;
    let prefix = "/v1/projects/demo-project/databases/(default)/documents";
    let name = "projects/demo-project/databases/(default)/documents/users/alice/myWishList/gen1";

    let add = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{prefix}/users/alice/myWishList"))
                .json_body(json!({ "fields": { "itemName": { "stringValue": "Kettle" } } }));
            then.status(200).json_body(json!({
                "name": name,
                "fields": { "itemName": { "stringValue": "Kettle" } }
            }));
        })
        .await;
    let stamp = server
        .mock_async(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path(format!("{prefix}/users/alice/myWishList/gen1"))
                .query_param("updateMask.fieldPaths", "docID")
                .json_body(json!({ "fields": { "docID": { "stringValue": "gen1" } } }));
            then.status(200).json_body(json!({ "name": name }));
        })
        .await;
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{prefix}/users/alice/myWishList"));
            then.status(200).json_body(json!({
                "documents": [{
                    "name": name,
                    "fields": {
                        "itemName": { "stringValue": "Kettle" },
                        "docID": { "stringValue": "gen1" }
                    }
                }]
            }));
        })
        .await;

    let database_id = DatabaseId::new("demo-project", "(default)");
    let datastore = HttpDatastore::builder(database_id.clone())
        .with_connection_builder(
            Connection::builder(database_id).with_emulator_host(server.address().to_string()),
        )
        .build()
        .unwrap();
    let store = RemoteListStore::new(
        Arc::new(InMemoryIdentityProvider::signed_in("alice")),
        Arc::new(datastore),
    );
    let session = store.bind_session().await.unwrap().unwrap();

    let created = store
        .create(&session, WishListItem::new("Kettle"))
        .await
        .unwrap();
    assert_eq!(created.doc_id(), Some("gen1"));
    assert_eq!(store.cached_items(), vec![created]);

    add.assert_async().await;
    stamp.assert_async().await;
    // once while binding, once after the create
    list.assert_hits_async(2).await;
}
