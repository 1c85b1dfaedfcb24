//! Project configuration shared by the auth and Firestore layers.

mod types;

#[doc(inline)]
pub use types::{FirebaseOptions, WishlistSettings};
