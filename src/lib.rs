//! Wishlist data access over Firebase Authentication and Cloud Firestore.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use wishlist_store::app::FirebaseOptions;
//! use wishlist_store::auth::IdentityToolkitAuth;
//! use wishlist_store::wishlist::{RemoteListStore, WishListItem};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let options = FirebaseOptions::from_env();
//! let auth = Arc::new(IdentityToolkitAuth::new(&options)?);
//! auth.sign_in_with_email_and_password("ada@example.com", "secret")
//!     .await?;
//!
//! let store = RemoteListStore::connect(&options, auth)?;
//! if let Some(session) = store.bind_session().await? {
//!     store
//!         .create(&session, WishListItem::new("Kettle").with_price(24.5))
//!         .await?;
//!     for item in store.cached_items() {
//!         println!("{}", item.item_name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod auth;
pub mod firestore;
pub mod platform;
pub mod wishlist;

#[cfg(test)]
pub mod test_support;
