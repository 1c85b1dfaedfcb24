use std::sync::{Arc, Mutex};

use super::model::{User, UserInfo};

/// Source of the currently signed-in identity.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns the signed-in user, or `None` when nobody is signed in.
    fn current_user(&self) -> Option<Arc<User>>;
}

/// Identity provider that holds a user set by the caller; nothing leaves the process.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    current_user: Mutex<Option<Arc<User>>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider with `uid` already signed in.
    pub fn signed_in(uid: impl Into<String>) -> Self {
        let provider = Self::new();
        provider.sign_in(User::new(UserInfo {
            uid: uid.into(),
            ..Default::default()
        }));
        provider
    }

    pub fn sign_in(&self, user: User) -> Arc<User> {
        let user = Arc::new(user);
        *self.current_user.lock().unwrap() = Some(user.clone());
        user
    }

    pub fn sign_out(&self) {
        self.current_user.lock().unwrap().take();
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn current_user(&self) -> Option<Arc<User>> {
        self.current_user.lock().unwrap().clone()
    }
}
