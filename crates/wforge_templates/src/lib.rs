//! # wforge_templates
//!
//! Scaffolding for pluggable widgets.
//!
//! [`WidgetGenerator`] turns a [`WidgetConfig`](wforge_spec::WidgetConfig)
//! into a buildable package: manifest with the standard build scripts, widget
//! definition XML, component source and generated props typings.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use wforge_spec::WidgetConfig;
//! use wforge_templates::{GenerateMode, WidgetGenerator};
//!
//! let config = WidgetConfig::new("Badge");
//! let result = WidgetGenerator::new()
//!     .generate(&config, Path::new("./widgets/badge"), GenerateMode::Fresh)
//!     .unwrap();
//! println!("wrote {} files", result.written.len());
//! ```

pub mod error;
pub mod files;
pub mod generator;
pub mod renderer;

pub use error::{TemplateError, TemplateResult};
pub use files::STANDARD_SCRIPTS;
pub use generator::{GenerateMode, GenerationResult, WidgetGenerator, MANIFEST_FILE};
pub use renderer::TemplateRenderer;
