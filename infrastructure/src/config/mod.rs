//! Configuration file loading for agent-tribunal
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TRIBUNAL_` environment variables (`TRIBUNAL_PIPELINE__SOLVER_COUNT=5`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./tribunal.toml` or `./.tribunal.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-tribunal/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileBackendConfig, FileConfig, FileOutputConfig, FilePathsConfig, FilePipelineConfig,
};
pub use loader::ConfigLoader;
