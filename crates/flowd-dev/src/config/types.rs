use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output format for the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Esm,
    Cjs,
    Iife,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Esm => "esm",
            Format::Cjs => "cjs",
            Format::Iife => "iife",
        }
    }
}

/// Target platform for the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Browser,
    Node,
    Neutral,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Browser => "browser",
            Platform::Node => "node",
            Platform::Neutral => "neutral",
        }
    }
}

/// A file or directory copied into the served directory after each build.
///
/// Paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CopyRule {
    /// Source file or directory
    pub from: PathBuf,
    /// Destination path (a directory source is copied recursively into it)
    pub to: PathBuf,
}

impl CopyRule {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Declarative description of the bundle: entry points, targets and assets.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildSpec {
    /// Bundler executable (looked up on PATH unless absolute)
    #[serde(default = "crate::config::defaults::default_bundler")]
    pub bundler: String,

    /// Entry points, relative to the project root
    #[serde(default = "crate::config::defaults::default_entry_points")]
    pub entry_points: Vec<String>,

    /// Bundle output file, relative to the project root
    #[serde(default = "crate::config::defaults::default_outfile")]
    pub outfile: PathBuf,

    /// Output module format
    #[serde(default = "crate::config::defaults::default_format")]
    pub format: Format,

    /// Target platform
    #[serde(default = "crate::config::defaults::default_platform")]
    pub platform: Platform,

    /// Engine targets (e.g. "chrome120", "firefox130")
    #[serde(default = "crate::config::defaults::default_targets")]
    pub target: Vec<String>,

    /// Inline imported dependencies into the bundle
    #[serde(default = "crate::config::defaults::default_true")]
    pub bundle: bool,

    /// Minify the output
    #[serde(default)]
    pub minify: bool,

    /// Emit source maps
    #[serde(default = "crate::config::defaults::default_true")]
    pub sourcemap: bool,

    /// Remove unused code
    #[serde(default = "crate::config::defaults::default_true")]
    pub tree_shaking: bool,

    /// tsconfig.json used for path aliases and JSX settings; `null` disables
    #[serde(
        default = "crate::config::defaults::default_tsconfig",
        skip_serializing_if = "Option::is_none"
    )]
    pub tsconfig: Option<PathBuf>,

    /// JSX transform mode ("automatic", "transform", "preserve")
    #[serde(default = "crate::config::defaults::default_jsx")]
    pub jsx: Option<String>,

    /// Emit development-mode JSX
    #[serde(default = "crate::config::defaults::default_true")]
    pub jsx_dev: bool,

    /// Bundle `*.module.css` imports as locally scoped CSS modules
    #[serde(default = "crate::config::defaults::default_true")]
    pub css_modules: bool,

    /// Extra arguments passed verbatim to the bundler
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,

    /// Assets copied into the served directory after each build
    #[serde(default = "crate::config::defaults::default_copy_rules")]
    pub copy: Vec<CopyRule>,
}
