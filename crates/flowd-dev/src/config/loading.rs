use crate::config::{DevSettings, CONFIG_FILE_NAME, ENV_PREFIX};
use crate::error::{ConfigError, Result};
use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use serde::Serialize;
use std::path::Path;

/// Values given on the command line. Only the fields that were set are
/// merged, so unset flags never mask the file or the environment.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl DevSettings {
    /// Load configuration from multiple sources.
    ///
    /// Priority: CLI args > environment variables > config file > defaults.
    /// Without an explicit `config_path`, `flowd.dev.json` in `root` is used
    /// when present.
    pub fn load(root: &Path, config_path: Option<&Path>, cli: &CliOverrides) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        let config_file = match config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        // FLOWD_DEV_PORT, FLOWD_DEV_DEBOUNCE_MS, FLOWD_DEV_BUILD__BUNDLER, ...
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .map(|key| camel_case_key(key.as_str()).into()),
        );

        figment = figment.merge(Serialized::defaults(cli));

        figment.extract().map_err(|e| {
            ConfigError::ValidationFailed {
                errors: e.to_string(),
            }
            .into()
        })
    }
}

/// Turn a lowercased, dot-separated env key (`build.entry_points`) into the
/// camelCase key the settings deserialize from (`build.entryPoints`).
pub(crate) fn camel_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;

    for c in key.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}
