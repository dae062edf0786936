//! Data models for widget configurations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::validator::{ValidationResult, WidgetValidator};

/// Property type of a widget property.
///
/// Serialized with the names used in the widget definition XML. The aliases
/// accept the descriptive names produced by intake tooling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    #[serde(alias = "text")]
    String,
    Boolean,
    Integer,
    Decimal,
    #[serde(alias = "enum")]
    Enumeration,
    #[serde(alias = "template-text")]
    TextTemplate,
    Expression,
    Action,
    Attribute,
    #[serde(alias = "list-datasource")]
    Datasource,
    #[serde(alias = "child-widgets")]
    Widgets,
    Image,
    Icon,
    Association,
    #[serde(alias = "nested-object")]
    Object,
}

impl PropertyType {
    /// Every property type, in declaration order.
    pub const ALL: [PropertyType; 15] = [
        PropertyType::String,
        PropertyType::Boolean,
        PropertyType::Integer,
        PropertyType::Decimal,
        PropertyType::Enumeration,
        PropertyType::TextTemplate,
        PropertyType::Expression,
        PropertyType::Action,
        PropertyType::Attribute,
        PropertyType::Datasource,
        PropertyType::Widgets,
        PropertyType::Image,
        PropertyType::Icon,
        PropertyType::Association,
        PropertyType::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Enumeration => "enumeration",
            Self::TextTemplate => "textTemplate",
            Self::Expression => "expression",
            Self::Action => "action",
            Self::Attribute => "attribute",
            Self::Datasource => "datasource",
            Self::Widgets => "widgets",
            Self::Image => "image",
            Self::Icon => "icon",
            Self::Association => "association",
            Self::Object => "object",
        }
    }

    /// Parse a type name, accepting both XML names and descriptive aliases.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        let ty = match normalized.as_str() {
            "string" | "text" => Self::String,
            "boolean" | "bool" => Self::Boolean,
            "integer" | "int" => Self::Integer,
            "decimal" => Self::Decimal,
            "enumeration" | "enum" => Self::Enumeration,
            "texttemplate" | "template-text" => Self::TextTemplate,
            "expression" => Self::Expression,
            "action" => Self::Action,
            "attribute" => Self::Attribute,
            "datasource" | "list-datasource" => Self::Datasource,
            "widgets" | "child-widgets" => Self::Widgets,
            "image" => Self::Image,
            "icon" => Self::Icon,
            "association" => Self::Association,
            "object" | "nested-object" => Self::Object,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether a property of this type can be linked to a list datasource.
    pub fn can_link_datasource(&self) -> bool {
        matches!(
            self,
            Self::Attribute
                | Self::Action
                | Self::Expression
                | Self::TextTemplate
                | Self::Widgets
                | Self::Association
        )
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One option of an enumeration property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumValue {
    pub key: String,
    pub caption: String,
}

impl EnumValue {
    pub fn new(key: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            caption: caption.into(),
        }
    }
}

/// A configurable property of the widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub key: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Options for `enumeration` properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    /// Allowed attribute kinds for `attribute` properties (e.g. "String", "Decimal").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_attribute_types: Vec<String>,
    /// Key of the `datasource` property this property is linked to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, property_type: PropertyType) -> Self {
        let key = key.into();
        Self {
            caption: key.clone(),
            key,
            property_type,
            description: String::new(),
            required: false,
            default_value: None,
            enum_values: Vec::new(),
            allowed_attribute_types: Vec::new(),
            data_source: None,
        }
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn enum_value(mut self, key: impl Into<String>, caption: impl Into<String>) -> Self {
        self.enum_values.push(EnumValue::new(key, caption));
        self
    }

    pub fn allow_attribute(mut self, kind: impl Into<String>) -> Self {
        self.allowed_attribute_types.push(kind.into());
        self
    }

    pub fn linked_to(mut self, datasource_key: impl Into<String>) -> Self {
        self.data_source = Some(datasource_key.into());
        self
    }
}

/// An event the widget exposes to the page (rendered as an action property).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetEvent {
    pub name: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
}

impl WidgetEvent {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            caption: name.clone(),
            name,
            description: String::new(),
        }
    }
}

/// Declarative description of the widget to generate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_company")]
    pub company: String,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub events: Vec<WidgetEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_project_path: Option<PathBuf>,
}

fn default_category() -> String {
    "Display".to_string()
}

fn default_company() -> String {
    "mendix".to_string()
}

impl WidgetConfig {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            category: default_category(),
            company: default_company(),
            properties: Vec::new(),
            events: Vec::new(),
            target_project_path: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_event(mut self, event: WidgetEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_target_project(mut self, path: impl Into<PathBuf>) -> Self {
        self.target_project_path = Some(path.into());
        self
    }

    /// Display name, falling back to the widget name.
    pub fn display_name(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Package identifier: lowercase ASCII alphanumerics only.
    pub fn package_name(&self) -> String {
        self.name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }

    /// Component identifier in PascalCase.
    pub fn component_name(&self) -> String {
        self.name
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }

    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Minimal check needed before a build can start: the widget has a name.
    pub fn ensure_runnable(&self) -> SpecResult<()> {
        if self.package_name().is_empty() {
            return Err(SpecError::MissingField("name".to_string()));
        }
        Ok(())
    }

    /// Full structural validation (unique keys, meaningful extras).
    pub fn validate(&self) -> ValidationResult {
        WidgetValidator::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let config = WidgetConfig::new("star-rating widget");
        assert_eq!(config.package_name(), "starratingwidget");
        assert_eq!(config.component_name(), "StarRatingWidget");
        assert_eq!(config.display_name(), "star-rating widget");
    }

    #[test]
    fn test_property_type_aliases() {
        let prop: Property =
            serde_json::from_str(r#"{"key": "items", "type": "list-datasource"}"#).unwrap();
        assert_eq!(prop.property_type, PropertyType::Datasource);

        let prop: Property = serde_json::from_str(r#"{"key": "mode", "type": "enum"}"#).unwrap();
        assert_eq!(prop.property_type, PropertyType::Enumeration);

        assert_eq!(PropertyType::parse("nested-object"), Some(PropertyType::Object));
        assert_eq!(PropertyType::parse("TextTemplate"), Some(PropertyType::TextTemplate));
        assert_eq!(PropertyType::parse("nope"), None);
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: WidgetConfig = serde_json::from_str(r#"{"name": "Badge"}"#).unwrap();
        assert_eq!(config.category, "Display");
        assert_eq!(config.company, "mendix");
        assert!(config.properties.is_empty());
        assert!(config.target_project_path.is_none());
    }

    #[test]
    fn test_ensure_runnable() {
        assert!(WidgetConfig::new("Badge").ensure_runnable().is_ok());
        assert!(WidgetConfig::new("  ").ensure_runnable().is_err());
    }
}
