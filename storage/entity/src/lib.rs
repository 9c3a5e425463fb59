pub mod language;
pub mod repository;
pub mod summary;

/// Text written for a value that is absent or has no valid number behind it.
pub const NOT_AVAILABLE: &str = "N/A";
