//! Runtime configuration read from the process environment at startup.

use std::{
    env,
    error::Error,
    fmt, io,
    path::{Path, PathBuf},
};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// The artifact looked up next to the executable when `MODEL_PATH` isn't set.
pub const MODEL_FILE_NAME: &str = "MMGSY_best_model.json";

/// Configuration failures, all of them fatal.
#[derive(Debug)]
pub enum ConfigError {
    InvalidPort(String),
    /// The directory of the running executable couldn't be resolved.
    InstallDir(io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort(port) => write!(f, "invalid PORT '{port}'"),
            Self::InstallDir(e) => write!(f, "cannot locate the executable's directory: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InstallDir(e) => Some(e),
            Self::InvalidPort(_) => None,
        }
    }
}

/// Snapshot of configuration values consumed by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Config {
    /// Creates a configuration from `HOST`, `PORT` and `MODEL_PATH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a configuration reading every variable through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?,
            None => DEFAULT_PORT,
        };

        let model_path = match lookup("MODEL_PATH") {
            Some(path) => PathBuf::from(path),
            None => install_dir()?.join(MODEL_FILE_NAME),
        };

        Ok(Self {
            host,
            port,
            model_path,
        })
    }

    /// The `host:port` pair to bind the server to.
    pub fn bind_addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

fn install_dir() -> Result<PathBuf, ConfigError> {
    let exe = env::current_exe().map_err(ConfigError::InstallDir)?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        ConfigError::InstallDir(io::Error::new(
            io::ErrorKind::NotFound,
            "executable has no parent directory",
        ))
    })
}
