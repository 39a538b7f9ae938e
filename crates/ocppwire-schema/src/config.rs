use std::path::PathBuf;

/// Environment variable that overrides the schema directory.
pub const SCHEMA_DIR_ENV: &str = "OCPPWIRE_SCHEMA_DIR";

/// Controls where and how schema documents are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Root directory holding the `v16/` and `v20/` namespaces.
    pub schema_dir: PathBuf,
    /// Maximum bytes allowed per schema file.
    pub max_schema_file_size: usize,
}

impl StoreConfig {
    /// Config rooted at an explicit directory.
    pub fn with_schema_dir(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            ..Self::default()
        }
    }

    /// The schemas shipped with this crate.
    pub fn bundled_schema_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas"))
    }
}

impl Default for StoreConfig {
    /// Uses `$OCPPWIRE_SCHEMA_DIR` when set and non-empty, otherwise the
    /// bundled schemas.
    fn default() -> Self {
        let schema_dir = std::env::var_os(SCHEMA_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::bundled_schema_dir);

        Self {
            schema_dir,
            max_schema_file_size: 256 * 1024,
        }
    }
}
