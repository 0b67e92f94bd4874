use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Chartnote";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info,chartnote=debug"
}

/// Default location for the visit-note database.
pub fn default_database_path() -> PathBuf {
    PathBuf::from("chartnote.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(APP_NAME, "Chartnote");
    }

    #[test]
    fn default_filter_names_this_crate() {
        assert!(default_log_filter().contains("chartnote"));
    }
}
