use crate::config::types::{BuildSpec, CopyRule, Format, Platform};
use std::path::PathBuf;

/// Config file looked up in the project root when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "flowd.dev.json";

/// Prefix for environment variable overrides (`FLOWD_DEV_PORT=4000`).
pub const ENV_PREFIX: &str = "FLOWD_DEV_";

pub fn default_watch_dir() -> PathBuf {
    PathBuf::from("src")
}

pub fn default_serve_dir() -> PathBuf {
    PathBuf::from("dev")
}

pub fn default_index_file() -> String {
    "index.html".to_string()
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_debounce_ms() -> u64 {
    500
}

pub fn default_retry_ms() -> u64 {
    10_000
}

pub fn default_events_prefix() -> String {
    "/esbuild".to_string()
}

pub fn default_api_prefix() -> String {
    "/api".to_string()
}

pub fn default_style_extensions() -> Vec<String> {
    vec![".css".to_string()]
}

pub fn default_watch_ignore() -> Vec<String> {
    vec!["*.swp".to_string(), "*~".to_string()]
}

pub fn default_bundler() -> String {
    "esbuild".to_string()
}

pub fn default_entry_points() -> Vec<String> {
    vec!["src/index.js".to_string()]
}

pub fn default_outfile() -> PathBuf {
    PathBuf::from("dev/index.js")
}

pub fn default_format() -> Format {
    Format::Esm
}

pub fn default_platform() -> Platform {
    Platform::Browser
}

pub fn default_targets() -> Vec<String> {
    vec!["chrome120".to_string(), "firefox130".to_string()]
}

pub fn default_jsx() -> Option<String> {
    Some("automatic".to_string())
}

pub fn default_tsconfig() -> Option<PathBuf> {
    Some(PathBuf::from("tsconfig.json"))
}

pub fn default_true() -> bool {
    true
}

pub fn default_copy_rules() -> Vec<CopyRule> {
    vec![
        CopyRule::new("build-templates/index.dev.html", "dev/index.html"),
        CopyRule::new("assets", "dev/assets"),
    ]
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            bundler: default_bundler(),
            entry_points: default_entry_points(),
            outfile: default_outfile(),
            format: default_format(),
            platform: default_platform(),
            target: default_targets(),
            bundle: true,
            minify: false,
            sourcemap: true,
            tree_shaking: true,
            tsconfig: default_tsconfig(),
            jsx: default_jsx(),
            jsx_dev: true,
            css_modules: true,
            extra_args: vec![],
            copy: default_copy_rules(),
        }
    }
}
