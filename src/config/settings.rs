//! TOML-based configuration for lkml2cube.
//!
//! Supports a config file (lkml2cube.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [loader]
//! root_dir = "./lookml"
//!
//! [views]
//! use_explore_names = true
//!
//! [output]
//! dir = "./cube/model"
//!
//! [meta]
//! url = "https://cube.example.com/cubejs-api/v1/meta"
//! token = "${CUBE_API_TOKEN}"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub loader: LoaderSettings,
    pub views: ViewsSettings,
    pub output: OutputSettings,
    pub meta: MetaSettings,
}

/// Loader configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Directory that absolute include paths are resolved against.
    pub root_dir: Option<String>,
}

/// `views` command configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewsSettings {
    /// Name Cube views after explores instead of their labels.
    pub use_explore_names: bool,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory generated files are written under.
    pub dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

/// Cube meta API configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetaSettings {
    pub url: Option<String>,

    /// Bearer token (supports ${ENV_VAR} expansion).
    pub token: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text and expand environment variables.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.resolved()
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `LKML2CUBE_CONFIG`
    /// 2. `./lkml2cube.toml`
    /// 3. `~/.config/lkml2cube/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("LKML2CUBE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("lkml2cube.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lkml2cube").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn resolved(mut self) -> Result<Self, SettingsError> {
        let expand = |value: &mut Option<String>| -> Result<(), SettingsError> {
            if let Some(v) = value.as_mut() {
                *v = expand_env_vars(v)?;
            }
            Ok(())
        };
        expand(&mut self.loader.root_dir)?;
        expand(&mut self.meta.url)?;
        expand(&mut self.meta.token)?;
        self.output.dir = expand_env_vars(&self.output.dir)?;
        Ok(self)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
