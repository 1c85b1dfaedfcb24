pub(crate) const DEFAULT_DATABASE_ID: &str = "(default)";
