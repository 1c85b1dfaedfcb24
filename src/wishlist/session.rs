use crate::auth::User;
use crate::firestore::error::FirestoreResult;
use crate::firestore::model::resource_path::validate_segment;

/// Names the user whose wishlist an operation addresses.
///
/// Sessions are plain values owned by the caller. A session built with
/// [`Session::for_uid`] is not checked against the live sign-in state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Session {
    uid: String,
}

impl Session {
    pub fn for_uid(uid: impl Into<String>) -> FirestoreResult<Self> {
        let uid = uid.into();
        validate_segment(&uid)?;
        Ok(Self { uid })
    }

    pub fn for_user(user: &User) -> FirestoreResult<Self> {
        Self::for_uid(user.uid())
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_uids_that_break_paths() {
        assert!(Session::for_uid("").is_err());
        assert!(Session::for_uid("a/b").is_err());
        assert_eq!(Session::for_uid("alice").unwrap().uid(), "alice");
    }
}
