//! Template catalog: the `.pptx` files in the templates directory.
//!
//! Opening a template reads and inflates the whole zip, so the async entry
//! points run that work on the blocking pool.

use std::path::{Path, PathBuf};

use crate::errors::BuildError;
use crate::models::{DEFAULT_TEMPLATE, TemplatePlan};
use crate::pptx::blank::default_template;
use crate::pptx::{LayoutInfo, Template};

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    dir: PathBuf,
}

impl TemplateCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every readable template, sorted by filename. Broken files are logged
    /// and left out.
    pub async fn list(&self) -> Result<Vec<TemplatePlan>, BuildError> {
        let catalog = self.clone();
        tokio::task::spawn_blocking(move || catalog.list_blocking()).await?
    }

    /// Open one template by filename.
    pub async fn load(&self, filename: &str) -> Result<Template, BuildError> {
        let catalog = self.clone();
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || catalog.load_blocking(&filename)).await?
    }

    pub async fn layouts(&self, filename: &str) -> Result<Vec<LayoutInfo>, BuildError> {
        Ok(self.load(filename).await?.layouts.into_iter().map(|l| l.info).collect())
    }

    fn list_blocking(&self) -> Result<Vec<TemplatePlan>, BuildError> {
        std::fs::create_dir_all(&self.dir)?;

        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_template_file(name))
            .collect();
        names.sort();

        let mut plans = Vec::with_capacity(names.len());
        for filename in names {
            match Template::open(&self.dir.join(&filename)) {
                Ok(template) => {
                    let layouts: Vec<LayoutInfo> = template.layouts.into_iter().map(|l| l.info).collect();
                    plans.push(TemplatePlan { filename, layout_count: layouts.len(), layouts });
                }
                Err(e) => log::warn!("Skipping template {filename}: {e}"),
            }
        }
        Ok(plans)
    }

    fn load_blocking(&self, filename: &str) -> Result<Template, BuildError> {
        validate_name(filename)?;
        let path = self.dir.join(filename);
        if !path.is_file() {
            return Err(BuildError::TemplateNotFound(filename.to_string()));
        }
        Ok(Template::open(&path)?)
    }

    /// Write the built-in template when the directory has none. Returns true
    /// when a file was created.
    pub fn ensure_default_template(&self) -> Result<bool, BuildError> {
        std::fs::create_dir_all(&self.dir)?;
        let has_any = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .any(|name| is_template_file(&name));
        if has_any {
            return Ok(false);
        }

        let path = self.dir.join(DEFAULT_TEMPLATE);
        default_template().save(&path)?;
        log::info!("Created default template {}", path.display());
        Ok(true)
    }
}

fn is_template_file(name: &str) -> bool {
    name.to_lowercase().ends_with(".pptx") && !name.starts_with("~$")
}

fn validate_name(filename: &str) -> Result<(), BuildError> {
    let invalid = filename.is_empty()
        || filename.contains(['/', '\\'])
        || filename.contains("..")
        || !is_template_file(filename);
    if invalid {
        return Err(BuildError::InvalidTemplateName(filename.to_string()));
    }
    Ok(())
}
