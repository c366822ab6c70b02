use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file (`cmdwatch.toml`, `cmdwatch.yaml`, ...)
pub const CONFIG_FILE_STEM: &str = "cmdwatch";

/// Prefix of the environment variables that override file values (`CMDWATCH_COMMAND_FILE`, ...)
pub const ENV_PREFIX: &str = "CMDWATCH";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// The file whose content is interpreted as a command on every change.
    pub command_file: PathBuf,

    /// Relative paths inside commands are resolved against this directory.
    pub base_dir: PathBuf,

    /// Run the current content of the command file once at startup.
    pub process_existing: bool,

    /// Append logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            command_file: PathBuf::from("command.txt"),
            base_dir: PathBuf::from("."),
            process_existing: false,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env`, then `cmdwatch.*` from the working directory, then `CMDWATCH_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case
        let _ = dotenvy::dotenv();

        Self::build(File::with_name(CONFIG_FILE_STEM).required(false))
    }

    /// Same layering as [`AppConfig::load`] but reads an explicit configuration file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();

        Config::builder()
            .set_default("command_file", defaults.command_file.to_string_lossy().into_owned())?
            .set_default("base_dir", defaults.base_dir.to_string_lossy().into_owned())?
            .set_default("process_existing", defaults.process_existing)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Command file resolved with tilde expansion.
    pub fn command_path(&self) -> PathBuf {
        crate::path_utils::get_path(&self.command_file.to_string_lossy())
    }

    /// Base directory resolved with tilde expansion.
    pub fn base_path(&self) -> PathBuf {
        crate::path_utils::get_path(&self.base_dir.to_string_lossy())
    }
}
