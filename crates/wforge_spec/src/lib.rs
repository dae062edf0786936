//! # wforge_spec
//!
//! Widget configuration model for wForge.
//!
//! A [`WidgetConfig`] is the unit of work handed to the build loop: the widget
//! name and metadata, its typed properties and the events it exposes. Configs
//! are produced by intake tooling and can be read from JSON, YAML or TOML.
//!
//! ## Example
//!
//! ```rust,no_run
//! use wforge_spec::{Property, PropertyType, WidgetConfig, WidgetReader};
//!
//! let config = WidgetConfig::new("StarRating")
//!     .with_description("Read-only star rating")
//!     .with_property(Property::new("value", PropertyType::Attribute).allow_attribute("Integer"));
//!
//! let result = config.validate();
//! assert!(result.valid);
//!
//! let from_disk = WidgetReader::read("widget.yaml").unwrap();
//! println!("{}", from_disk.component_name());
//! ```

pub mod error;
pub mod models;
pub mod reader;
pub mod validator;

pub use error::{SpecError, SpecResult};
pub use models::*;
pub use reader::{ConfigFormat, WidgetReader};
pub use validator::{ValidationResult, WidgetValidator};
