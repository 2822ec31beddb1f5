use crate::config::DevSettings;
use crate::error::{ConfigError, Result};
use std::net::IpAddr;

/// Validate a URL prefix used for request dispatch.
pub fn validate_prefix(field: &str, prefix: &str) -> Result<()> {
    if !prefix.starts_with('/') || prefix.len() < 2 {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: prefix.to_string(),
            hint: "Prefixes must start with '/' and name a path segment (e.g. \"/api\")"
                .to_string(),
        }
        .into());
    }

    Ok(())
}

impl DevSettings {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.build.entry_points.is_empty() {
            return Err(ConfigError::MissingField {
                field: "build.entryPoints".to_string(),
                hint: "Provide at least one entry point".to_string(),
            }
            .into());
        }

        if self.build.bundler.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "build.bundler".to_string(),
                hint: "Name the bundler executable, e.g. \"esbuild\"".to_string(),
            }
            .into());
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "The dev server needs a fixed port so browser tabs can reconnect"
                    .to_string(),
            }
            .into());
        }

        if self.host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Use an IP address such as \"127.0.0.1\" or \"0.0.0.0\"".to_string(),
            }
            .into());
        }

        if self.debounce_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "debounceMs".to_string(),
                value: "0".to_string(),
                hint: "Use a quiet period of at least 1ms".to_string(),
            }
            .into());
        }

        validate_prefix("eventsPrefix", &self.events_prefix)?;
        validate_prefix("apiPrefix", &self.api_prefix)?;

        if self.events_prefix == self.api_prefix {
            return Err(ConfigError::InvalidValue {
                field: "apiPrefix".to_string(),
                value: self.api_prefix.clone(),
                hint: "The API prefix must differ from eventsPrefix".to_string(),
            }
            .into());
        }

        if self.index_file.is_empty() {
            return Err(ConfigError::MissingField {
                field: "indexFile".to_string(),
                hint: "Name the single-page entry document, e.g. \"index.html\"".to_string(),
            }
            .into());
        }

        for ext in &self.style_extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ConfigError::InvalidValue {
                    field: "styleExtensions".to_string(),
                    value: ext.clone(),
                    hint: "Extensions include the leading dot, e.g. \".css\"".to_string(),
                }
                .into());
            }
        }

        for rule in &self.build.copy {
            if rule.from.as_os_str().is_empty() || rule.to.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "build.copy".to_string(),
                    value: format!("{} -> {}", rule.from.display(), rule.to.display()),
                    hint: "Copy rules need both `from` and `to`".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}
