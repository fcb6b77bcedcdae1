// Adapters - External system implementations

pub mod catalog_http;
pub mod fs_walk;
pub mod probe_ffprobe;
pub mod store_sqlite;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use catalog_http::HttpCatalogClient;
pub use fs_walk::WalkDirLibrary;
pub use probe_ffprobe::FfprobeAdapter;
pub use store_sqlite::SqliteTrackStore;
pub use toml_config::AppConfig;
pub use tracing_log::init_logging;
