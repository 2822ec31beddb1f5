//! Configuration system for the dev server with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod types;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::CliOverrides;
pub use types::*;

/// Dev server settings - loaded from flowd.dev.json, env and CLI args.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DevSettings {
    /// Directory watched recursively for source changes
    #[serde(default = "default_watch_dir")]
    pub watch_dir: PathBuf,

    /// Directory the bundle is written to and served from
    #[serde(default = "default_serve_dir")]
    pub serve_dir: PathBuf,

    /// Single-page entry document, relative to `serveDir`
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server binds to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Quiet period after the last change before rebuilding
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Reconnect interval advertised to event-stream clients
    #[serde(default = "default_retry_ms")]
    pub retry_ms: u64,

    /// URL prefix of the live-reload event stream
    #[serde(default = "default_events_prefix")]
    pub events_prefix: String,

    /// URL prefix answered with "not available in local development"
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Extensions that make a change set style-only (hot update, no reload)
    #[serde(default = "default_style_extensions")]
    pub style_extensions: Vec<String>,

    /// Patterns ignored by the file watcher ("name" or "*.ext")
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,

    /// Bundle description
    #[serde(default)]
    pub build: BuildSpec,
}

impl DevSettings {
    /// Generate JSON Schema for flowd.dev.json.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(DevSettings);
        serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
    }

    /// Get default configuration values.
    pub fn default_config() -> Self {
        Self {
            watch_dir: default_watch_dir(),
            serve_dir: default_serve_dir(),
            index_file: default_index_file(),
            host: default_host(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            retry_ms: default_retry_ms(),
            events_prefix: default_events_prefix(),
            api_prefix: default_api_prefix(),
            style_extensions: default_style_extensions(),
            watch_ignore: default_watch_ignore(),
            build: BuildSpec::default(),
        }
    }

    /// Generate example flowd.dev.json content.
    pub fn example_config() -> String {
        serde_json::to_string_pretty(&Self::default_config()).unwrap_or_default()
    }
}
