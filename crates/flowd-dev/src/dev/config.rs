//! Development server configuration.
//!
//! Resolves the loaded [`DevSettings`] against the project root into the
//! absolute paths and socket address the dev server runs with.

use crate::config::DevSettings;
use crate::dev::ServeConfig;
use crate::error::{ConfigError, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved development server configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Loaded settings
    pub settings: DevSettings,

    /// Project root all relative settings resolve against
    pub root: PathBuf,

    /// Server socket address (IP + port)
    pub addr: SocketAddr,
}

impl DevConfig {
    /// Resolve settings against `root`.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not an IP address
    pub fn from_settings(settings: DevSettings, root: PathBuf) -> Result<Self> {
        let ip: IpAddr = settings
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "host".to_string(),
                value: settings.host.clone(),
                hint: "Use an IP address such as 127.0.0.1".to_string(),
            })?;
        let addr = SocketAddr::new(ip, settings.port);

        Ok(Self {
            settings,
            root,
            addr,
        })
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn watch_dir(&self) -> PathBuf {
        self.resolve(&self.settings.watch_dir)
    }

    pub fn serve_dir(&self) -> PathBuf {
        self.resolve(&self.settings.serve_dir)
    }

    /// Single-page entry document served for unknown routes.
    pub fn index_path(&self) -> PathBuf {
        self.serve_dir().join(&self.settings.index_file)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.settings.debounce_ms)
    }

    pub fn retry(&self) -> Duration {
        Duration::from_millis(self.settings.retry_ms)
    }

    /// Serving configuration handed to the request router.
    pub fn serve_config(&self) -> ServeConfig {
        ServeConfig {
            serve_dir: self.serve_dir(),
            index_path: self.index_path(),
            events_prefix: self.settings.events_prefix.clone(),
            api_prefix: self.settings.api_prefix.clone(),
            retry: self.retry(),
        }
    }

    /// Validate the settings and the directories they point at.
    ///
    /// The served directory may not exist yet: the initial build creates it.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The settings are invalid
    /// - The project root or the watched directory doesn't exist
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if !self.root.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "cwd".to_string(),
                value: self.root.display().to_string(),
                hint: "Working directory does not exist".to_string(),
            }
            .into());
        }

        let watch_dir = self.watch_dir();
        if !watch_dir.is_dir() {
            return Err(ConfigError::InvalidValue {
                field: "watchDir".to_string(),
                value: self.settings.watch_dir.display().to_string(),
                hint: format!("Directory does not exist: {}", watch_dir.display()),
            }
            .into());
        }

        Ok(())
    }

    /// Get the server URL as a string.
    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}
