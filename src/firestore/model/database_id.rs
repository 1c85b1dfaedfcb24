use crate::app::FirebaseOptions;
use crate::firestore::constants::DEFAULT_DATABASE_ID;
use crate::firestore::error::{missing_project_id, FirestoreResult};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabaseId {
    project_id: String,
    database: String,
}

impl DatabaseId {
    pub fn new(project_id: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: database.into(),
        }
    }

    pub fn default(project_id: impl Into<String>) -> Self {
        Self::new(project_id, DEFAULT_DATABASE_ID)
    }

    /// Resolves the database named by the options, falling back to `(default)`.
    pub fn from_options(options: &FirebaseOptions) -> FirestoreResult<Self> {
        let project_id = options.project_id.clone().ok_or_else(missing_project_id)?;
        let database = options
            .database_id
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_ID.to_string());
        Ok(Self::new(project_id, database))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// `projects/{project}/databases/{database}` as used in REST resource names.
    pub fn database_name(&self) -> String {
        format!("projects/{}/databases/{}", self.project_id, self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_options() {
        let options = FirebaseOptions {
            project_id: Some("project".into()),
            ..Default::default()
        };
        let db = DatabaseId::from_options(&options).unwrap();
        assert_eq!(db.project_id(), "project");
        assert_eq!(db.database(), DEFAULT_DATABASE_ID);
        assert_eq!(db.database_name(), "projects/project/databases/(default)");
    }

    #[test]
    fn honours_named_database() {
        let options = FirebaseOptions {
            project_id: Some("project".into()),
            database_id: Some("wishes".into()),
            ..Default::default()
        };
        let db = DatabaseId::from_options(&options).unwrap();
        assert_eq!(db.database(), "wishes");
    }

    #[test]
    fn missing_project_id_errors() {
        let options = FirebaseOptions {
            api_key: Some("test".into()),
            ..Default::default()
        };
        let err = DatabaseId::from_options(&options).unwrap_err();
        assert_eq!(err.code_str(), "firestore/missing-project-id");
    }
}
