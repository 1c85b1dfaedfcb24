use std::env;

use serde::Deserialize;

/// Connection settings for the Firebase project backing the wishlist.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseOptions {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Named Firestore database; `(default)` when unset.
    #[serde(default)]
    pub database_id: Option<String>,
}

impl FirebaseOptions {
    /// Loads options from the process environment.
    ///
    /// `FIREBASE_CONFIG` may hold a JSON object (`apiKey`, `projectId`,
    /// `databaseId`); `FIREBASE_API_KEY`, `FIREBASE_PROJECT_ID` and
    /// `FIRESTORE_DATABASE_ID` override individual fields.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = lookup("FIREBASE_CONFIG")
            .and_then(|raw| match serde_json::from_str::<FirebaseOptions>(&raw) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    log::warn!("ignoring malformed FIREBASE_CONFIG: {err}");
                    None
                }
            })
            .unwrap_or_default();

        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(api_key) = non_empty("FIREBASE_API_KEY") {
            options.api_key = Some(api_key);
        }
        if let Some(project_id) = non_empty("FIREBASE_PROJECT_ID") {
            options.project_id = Some(project_id);
        }
        if let Some(database_id) = non_empty("FIRESTORE_DATABASE_ID") {
            options.database_id = Some(database_id);
        }
        options
    }
}

/// Collection layout: items live at `{users}/{uid}/{items}/{docID}` and
/// profiles at `{users}/{uid}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WishlistSettings {
    pub users_collection: String,
    pub items_collection: String,
}

impl Default for WishlistSettings {
    fn default() -> Self {
        Self {
            users_collection: "users".to_string(),
            items_collection: "myWishList".to_string(),
        }
    }
}
