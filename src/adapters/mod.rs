// Adapters - Configuration files, track files and logging backend

pub mod toml_config;
pub mod track_file;
pub mod tracing_log;

pub use toml_config::{ConfigLoader, ConfigOverrides};
pub use track_file::{load_tracks, parse_tracks, write_tracks, TrackFormat};
pub use tracing_log::{init_logging, LogLevel};
