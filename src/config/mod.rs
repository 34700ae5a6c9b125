//! Config module.
//! Provides configuration types, default paths and XML loading for the
//! `atomic_file` command-line wrapper. The library write path never reads it.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{default_config_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{create_template_config, load_config, load_config_from_xml_path};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "ATOMIC_FILE_CONFIG";
