//! Widget configuration validation.

use std::collections::HashSet;

use crate::models::{PropertyType, WidgetConfig};

/// Validation result with details.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Validator for widget configurations.
pub struct WidgetValidator;

impl WidgetValidator {
    pub fn validate(config: &WidgetConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.package_name().is_empty() {
            result.add_error("Widget name cannot be empty");
        }

        if config.description.trim().is_empty() {
            result.add_warning("Widget description is recommended");
        }

        let mut seen = HashSet::new();
        for property in &config.properties {
            if property.key.trim().is_empty() {
                result.add_error("Property key cannot be empty");
                continue;
            }
            if !seen.insert(property.key.as_str()) {
                result.add_error(format!("Duplicate property key '{}'", property.key));
            }

            match property.property_type {
                PropertyType::Enumeration if property.enum_values.is_empty() => {
                    result.add_error(format!(
                        "Enumeration property '{}' must declare at least one value",
                        property.key
                    ));
                }
                PropertyType::Enumeration => {}
                _ if !property.enum_values.is_empty() => {
                    result.add_warning(format!(
                        "Property '{}' declares enum values but is of type {}",
                        property.key, property.property_type
                    ));
                }
                _ => {}
            }

            if !property.allowed_attribute_types.is_empty()
                && property.property_type != PropertyType::Attribute
            {
                result.add_warning(format!(
                    "Property '{}' declares attribute kinds but is of type {}",
                    property.key, property.property_type
                ));
            }

            if let Some(source) = &property.data_source {
                if !property.property_type.can_link_datasource() {
                    result.add_error(format!(
                        "Property '{}' of type {} cannot be linked to a datasource",
                        property.key, property.property_type
                    ));
                }
                let linked = config
                    .property(source)
                    .map_or(false, |p| p.property_type == PropertyType::Datasource);
                if !linked {
                    result.add_error(format!(
                        "Property '{}' references unknown datasource '{}'",
                        property.key, source
                    ));
                }
            }
        }

        let mut event_names = HashSet::new();
        for event in &config.events {
            if !event_names.insert(event.name.as_str()) {
                result.add_error(format!("Duplicate event '{}'", event.name));
            }
            if seen.contains(event.name.as_str()) {
                result.add_error(format!(
                    "Event '{}' clashes with a property of the same key",
                    event.name
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Property, WidgetEvent};

    #[test]
    fn test_valid_config() {
        let config = WidgetConfig::new("Rating")
            .with_description("Star rating")
            .with_property(Property::new("value", PropertyType::Attribute).allow_attribute("Integer"))
            .with_property(
                Property::new("size", PropertyType::Enumeration)
                    .enum_value("small", "Small")
                    .enum_value("large", "Large"),
            );

        let result = config.validate();
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_keys() {
        let config = WidgetConfig::new("Rating")
            .with_property(Property::new("value", PropertyType::Integer))
            .with_property(Property::new("value", PropertyType::String));

        let result = config.validate();
        assert!(!result.valid);
        assert!(result.errors[0].contains("Duplicate property key"));
    }

    #[test]
    fn test_enum_without_values() {
        let config = WidgetConfig::new("Rating")
            .with_property(Property::new("size", PropertyType::Enumeration));
        assert!(!config.validate().valid);
    }

    #[test]
    fn test_datasource_links() {
        let ok = WidgetConfig::new("List")
            .with_property(Property::new("items", PropertyType::Datasource))
            .with_property(Property::new("label", PropertyType::Attribute).linked_to("items"));
        assert!(ok.validate().valid);

        let dangling = WidgetConfig::new("List")
            .with_property(Property::new("label", PropertyType::Attribute).linked_to("missing"));
        assert!(!dangling.validate().valid);

        let wrong_type = WidgetConfig::new("List")
            .with_property(Property::new("items", PropertyType::Datasource))
            .with_property(Property::new("flag", PropertyType::Boolean).linked_to("items"));
        assert!(!wrong_type.validate().valid);
    }

    #[test]
    fn test_event_clash() {
        let config = WidgetConfig::new("Button")
            .with_property(Property::new("onClick", PropertyType::Action))
            .with_event(WidgetEvent::new("onClick"));
        assert!(!config.validate().valid);
    }
}
