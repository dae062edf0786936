//! Widget package generation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wforge_spec::WidgetConfig;

use crate::error::{TemplateError, TemplateResult};
use crate::files::{
    package_manifest, props_typings, widget_xml, COMPONENT_TSX, EDITOR_CONFIG_TS, GITIGNORE,
    PACKAGE_XML, TSCONFIG_JSON, WIDGET_CSS, WIDGET_VERSION,
};
use crate::renderer::TemplateRenderer;

/// Name of the package manifest inside a generated widget.
pub const MANIFEST_FILE: &str = "package.json";

/// How existing files in the output directory are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateMode {
    /// Overwrite every generated file.
    Fresh,
    /// Keep files that already exist, so earlier edits survive.
    PreserveExisting,
}

/// Files written (and kept) by one generation run, relative to the output dir.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    pub preserved: Vec<PathBuf>,
}

impl GenerationResult {
    pub fn all_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.written.iter().chain(self.preserved.iter())
    }
}

/// Renders a [`WidgetConfig`] into a pluggable-widget package.
#[derive(Default)]
pub struct WidgetGenerator {
    renderer: TemplateRenderer,
}

impl WidgetGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables available to the static templates.
    pub fn variables(config: &WidgetConfig) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("package_name".to_string(), config.package_name());
        vars.insert("component_name".to_string(), config.component_name());
        vars.insert("display_name".to_string(), config.display_name().to_string());
        vars.insert("description".to_string(), config.description.clone());
        vars.insert("company".to_string(), config.company.clone());
        vars.insert("company_path".to_string(), config.company.replace('.', "/"));
        vars.insert("category".to_string(), config.category.clone());
        vars.insert("version".to_string(), WIDGET_VERSION.to_string());
        vars
    }

    /// Relative path and content of every file in the package.
    pub fn render(&self, config: &WidgetConfig) -> TemplateResult<Vec<(PathBuf, String)>> {
        config.ensure_runnable()?;

        let vars = Self::variables(config);
        let component = config.component_name();
        let src = PathBuf::from("src");

        let templated = [
            (PathBuf::from("tsconfig.json"), TSCONFIG_JSON),
            (PathBuf::from(".gitignore"), GITIGNORE),
            (src.join("package.xml"), PACKAGE_XML),
            (src.join(format!("{}.tsx", component)), COMPONENT_TSX),
            (src.join(format!("{}.editorConfig.ts", component)), EDITOR_CONFIG_TS),
            (src.join("ui").join(format!("{}.css", component)), WIDGET_CSS),
        ];

        let mut files = vec![(
            PathBuf::from(MANIFEST_FILE),
            serde_json::to_string_pretty(&package_manifest(config))? + "\n",
        )];

        for (path, template) in templated {
            let unresolved = self.renderer.unresolved(template, &vars);
            if !unresolved.is_empty() {
                return Err(TemplateError::RenderingFailed(format!(
                    "{}: unresolved {}",
                    path.display(),
                    unresolved.join(", ")
                )));
            }
            files.push((path, self.renderer.render_content(template, &vars)));
        }

        files.push((src.join(format!("{}.xml", component)), widget_xml(config)));
        files.push((
            PathBuf::from("typings").join(format!("{}Props.d.ts", component)),
            props_typings(config),
        ));

        Ok(files)
    }

    /// Write the package for `config` into `output_dir`.
    pub fn generate(
        &self,
        config: &WidgetConfig,
        output_dir: &Path,
        mode: GenerateMode,
    ) -> TemplateResult<GenerationResult> {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(TemplateError::NotADirectory(output_dir.to_path_buf()));
        }
        fs::create_dir_all(output_dir)?;

        info!(
            "Generating widget {} into {:?} ({:?})",
            config.component_name(),
            output_dir,
            mode
        );

        let mut result = GenerationResult {
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        };

        for (relative, content) in self.render(config)? {
            let target = output_dir.join(&relative);
            if mode == GenerateMode::PreserveExisting && target.exists() {
                debug!("Preserved: {:?}", relative);
                result.preserved.push(relative);
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
            debug!("Rendered: {:?}", relative);
            result.written.push(relative);
        }

        Ok(result)
    }
}
