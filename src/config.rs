use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Mawid";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    "info,mawid=debug".to_string()
}

/// Get the application data directory
/// ~/Mawid/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("Mawid"),
        None => PathBuf::from("Mawid"),
    }
}

/// Get the appointment database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("appointments.db")
}

/// Get the exports directory (card PNGs default here)
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Get the optional card assets directory (subject/logo imagery)
pub fn assets_dir() -> PathBuf {
    app_data_dir().join("assets")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("Mawid"));
    }

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("appointments.db"));
    }

    #[test]
    fn exports_under_app_data() {
        assert!(exports_dir().starts_with(app_data_dir()));
        assert!(exports_dir().ends_with("exports"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
