//! Configuration management for the schema compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-compiler.toml)
//! - Environment variables (SCHEMAC__*)
//!
//! ## Example config file (schema-compiler.toml):
//! ```toml
//! [input]
//! extensions = ["yaml", "yml"]
//!
//! [link]
//! enabled = true
//! strict = false
//!
//! [output]
//! format = "summary"
//! fingerprint = false
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Main configuration for the compiler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub link: LinkConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Input discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extensions picked up when a directory is given as input
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Post-load reference checking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Run the link pass after loading
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fail the run when the link pass reports errors
    #[serde(default)]
    pub strict: bool,
}

/// What to print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print the graph fingerprint after the output
    #[serde(default)]
    pub fingerprint: bool,
}

/// Output format for the compiled graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One line per named type
    #[default]
    Summary,
    Json,
    JsonCompact,
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Summary,
            fingerprint: false,
        }
    }
}

impl CompilerConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding an explicit file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-compiler.toml",
            ".schema-compiler.toml",
            "config/schema-compiler.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "schema-compiler", "schema-compiler") {
            let xdg_config = config_dir.config_dir().join("schema-compiler.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMAC__LINK__STRICT=true etc.
        builder = builder.add_source(
            Environment::with_prefix("SCHEMAC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
