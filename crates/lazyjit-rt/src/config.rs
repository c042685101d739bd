use lazyjit_service::DEFAULT_SERVICE_PATH;
use std::path::PathBuf;

/// Directory used by `--dump-wasm`, relative to the working directory.
pub const DUMP_DIR: &str = "dump_wasm";

/// Name of the export invoked once the skeleton is loaded.
pub const DEFAULT_ENTRY_POINT: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Location of the compiler service artifact.
    pub service_path: PathBuf,
    /// Skeleton export invoked by [`crate::Session::run_entry`].
    pub entry_point: String,
    /// When set, every blob from the service is also written here.
    pub dump_dir: Option<PathBuf>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            service_path: PathBuf::from(DEFAULT_SERVICE_PATH),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            dump_dir: None,
        }
    }
}

impl DispatcherConfig {
    pub fn with_dump_wasm(mut self, enabled: bool) -> Self {
        self.dump_dir = enabled.then(|| PathBuf::from(DUMP_DIR));
        self
    }

    pub fn with_service_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.service_path = path.into();
        self
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.service_path, PathBuf::from(DEFAULT_SERVICE_PATH));
        assert_eq!(config.entry_point, "main");
        assert_eq!(config.dump_dir, None);
    }

    #[test]
    fn test_dump_flag_selects_dump_dir() {
        let config = DispatcherConfig::default().with_dump_wasm(true);
        assert_eq!(config.dump_dir, Some(PathBuf::from("dump_wasm")));
        assert_eq!(config.with_dump_wasm(false).dump_dir, None);
    }
}
