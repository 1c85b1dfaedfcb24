use std::sync::Mutex;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Default)]
struct TokenState {
    id_token: Option<String>,
    refresh_token: Option<String>,
    expiration_time: Option<SystemTime>,
}

/// ID/refresh token pair of a signed-in user, replaced in place on refresh.
#[derive(Debug, Default)]
pub struct TokenManager {
    state: Mutex<TokenState>,
}

impl Clone for TokenManager {
    fn clone(&self) -> Self {
        let state = self.state.lock().unwrap().clone();
        Self {
            state: Mutex::new(state),
        }
    }
}

impl TokenManager {
    /// Applies the fields present in `update`; absent fields keep their value.
    pub fn update(&self, update: TokenUpdate) {
        let mut state = self.state.lock().unwrap();
        if let Some(id_token) = update.id_token {
            state.id_token = Some(id_token);
        }
        if let Some(refresh_token) = update.refresh_token {
            state.refresh_token = Some(refresh_token);
        }
        if let Some(expires_in) = update.expires_in {
            state.expiration_time = SystemTime::now().checked_add(expires_in);
        }
    }

    pub fn id_token(&self) -> Option<String> {
        self.state.lock().unwrap().id_token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.state.lock().unwrap().refresh_token.clone()
    }

    pub fn expiration_time(&self) -> Option<SystemTime> {
        self.state.lock().unwrap().expiration_time
    }

    /// True when there is no ID token or it expires within `tolerance`.
    /// A token without a known expiry is used as-is.
    pub fn should_refresh(&self, tolerance: Duration) -> bool {
        let state = self.state.lock().unwrap();
        if state.id_token.is_none() {
            return true;
        }
        match state.expiration_time {
            None => false,
            Some(expiration) => {
                let threshold = SystemTime::now()
                    .checked_add(tolerance)
                    .unwrap_or_else(SystemTime::now);
                expiration <= threshold
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct TokenUpdate {
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<Duration>,
}

impl TokenUpdate {
    pub fn new(
        id_token: Option<String>,
        refresh_token: Option<String>,
        expires_in: Option<Duration>,
    ) -> Self {
        Self {
            id_token,
            refresh_token,
            expires_in,
        }
    }
}
