//! Per-user wishlists stored under `users/{uid}/myWishList`.
//!
//! [`RemoteListStore`] is the entry point: it binds a [`Session`] to the
//! signed-in user, performs create/update/delete/refresh against the
//! datastore and keeps the most recently fetched list in memory.

mod item;
mod operation;
mod profile;
mod session;
mod store;

pub use item::WishListItem;
pub use operation::{OperationHandle, OperationStatus};
pub use profile::UserProfile;
pub use session::Session;
pub use store::RemoteListStore;
