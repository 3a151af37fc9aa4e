//! Sync configuration files
//!
//! The file extension picks the format: `.toml`, `.json`, `.yaml` or `.yml`.
//! Saving goes through [`io::write_atomic`], so a half-written config is
//! never left behind.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, NormalizedPath, Result, io};

/// Serialization format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    fn parse<T: DeserializeOwned>(self, text: &str) -> std::result::Result<T, String> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> std::result::Result<String, String> {
        match self {
            Self::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        }
    }
}

/// Read and deserialize a config file.
pub fn load_config<T: DeserializeOwned>(path: &NormalizedPath) -> Result<T> {
    let format = ConfigFormat::from_path(path)?;
    let text = io::read_text(path)?;
    format.parse(&text).map_err(|message| Error::ConfigParse {
        path: path.to_native(),
        format: format.name().to_string(),
        message,
    })
}

/// Serialize `value` and write it atomically, creating parent folders.
pub fn save_config<T: Serialize>(path: &NormalizedPath, value: &T) -> Result<()> {
    let format = ConfigFormat::from_path(path)?;
    let text = format.render(value).map_err(|message| Error::ConfigSerialize {
        path: path.to_native(),
        format: format.name().to_string(),
        message,
    })?;
    tracing::debug!(path = %path, format = format.name(), "saving config");
    io::write_atomic(path, text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(&"a/sync.TOML".into()).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(&"sync.yml".into()).unwrap(), ConfigFormat::Yaml);
        assert!(matches!(
            ConfigFormat::from_path(&"sync".into()),
            Err(Error::UnsupportedFormat { extension }) if extension.is_empty()
        ));
    }
}
