//! Widget config file reading.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::models::WidgetConfig;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Reader for widget config files.
pub struct WidgetReader;

impl WidgetReader {
    /// Read a widget config, choosing the parser from the file extension.
    pub fn read(path: impl AsRef<Path>) -> SpecResult<WidgetConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SpecError::NotFound(path.to_path_buf()));
        }
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| SpecError::UnsupportedFormat(path.to_path_buf()))?;

        debug!("Reading widget config from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::parse(&content, format)
    }

    /// Parse a widget config from a string.
    pub fn parse(content: &str, format: ConfigFormat) -> SpecResult<WidgetConfig> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyType;
    use tempfile::tempdir;

    #[test]
    fn test_read_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("widget.yaml");
        fs::write(
            &path,
            r#"
name: ProgressRing
displayName: Progress Ring
description: Circular progress indicator
properties:
  - key: value
    type: decimal
    caption: Value
    required: true
events:
  - name: onComplete
"#,
        )
        .unwrap();

        let config = WidgetReader::read(&path).unwrap();
        assert_eq!(config.name, "ProgressRing");
        assert_eq!(config.properties[0].property_type, PropertyType::Decimal);
        assert!(config.properties[0].required);
        assert_eq!(config.events[0].name, "onComplete");
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("widget.toml");
        fs::write(
            &path,
            r#"
name = "Badge"
company = "acme"

[[properties]]
key = "label"
type = "textTemplate"
"#,
        )
        .unwrap();

        let config = WidgetReader::read(&path).unwrap();
        assert_eq!(config.company, "acme");
        assert_eq!(config.properties[0].property_type, PropertyType::TextTemplate);
    }

    #[test]
    fn test_unsupported_and_missing() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("widget.txt");
        fs::write(&txt, "name: x").unwrap();
        assert!(matches!(WidgetReader::read(&txt), Err(SpecError::UnsupportedFormat(_))));
        assert!(matches!(
            WidgetReader::read(dir.path().join("absent.json")),
            Err(SpecError::NotFound(_))
        ));
    }
}
