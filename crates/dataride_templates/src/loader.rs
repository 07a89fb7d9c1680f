//! Template and defaults store.
//!
//! A template root holds three directories:
//!
//! - `infra_templates/<type>.tf` - raw template text per type
//! - `infra_defaults/<type>.yaml` - default fields per type
//! - `extra_assets/<asset>/` - asset sources

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::value::{parse_mapping, ConfigMap};

pub const TEMPLATES_DIR: &str = "infra_templates";
pub const DEFAULTS_DIR: &str = "infra_defaults";
pub const ASSETS_DIR: &str = "extra_assets";
pub const TEMPLATE_EXTENSION: &str = "tf";

/// Loads templates, defaults and asset sources from a template root.
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    root: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the raw template text for a type. A missing template is an error.
    pub fn load_template(&self, name: &str) -> TemplateResult<String> {
        check_name(name)?;
        let path = self
            .root
            .join(TEMPLATES_DIR)
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION));

        if !path.is_file() {
            return Err(TemplateError::NotFound(format!("{} ({:?})", name, path)));
        }

        debug!("Loading template from {:?}", path);
        Ok(fs::read_to_string(path)?)
    }

    /// Load the defaults for a type.
    ///
    /// A missing or empty defaults file means there is nothing to merge.
    pub fn load_defaults(&self, name: &str) -> TemplateResult<Option<ConfigMap>> {
        check_name(name)?;
        let path = self.root.join(DEFAULTS_DIR).join(format!("{}.yaml", name));

        if !path.is_file() {
            debug!("No defaults for {}", name);
            return Ok(None);
        }

        debug!("Loading defaults from {:?}", path);
        let content = fs::read_to_string(&path)?;
        let defaults = parse_mapping(&content, &path)?;
        Ok((!defaults.is_empty()).then_some(defaults))
    }

    /// Source directory of an extra asset.
    pub fn asset_dir(&self, name: &str) -> TemplateResult<PathBuf> {
        check_name(name)?;
        let path = self.root.join(ASSETS_DIR).join(name);
        if !path.is_dir() {
            return Err(TemplateError::NotFound(format!("asset {} ({:?})", name, path)));
        }
        Ok(path)
    }

    /// Load a text file belonging to an extra asset.
    pub fn load_asset_file(&self, asset: &str, file: &str) -> TemplateResult<String> {
        let path = self.asset_dir(asset)?.join(file);
        if !path.is_file() {
            return Err(TemplateError::NotFound(format!("{}/{} ({:?})", asset, file, path)));
        }
        debug!("Loading asset file from {:?}", path);
        Ok(fs::read_to_string(path)?)
    }

    /// Validate the template root directory structure.
    pub fn validate(&self) -> Vec<String> {
        [TEMPLATES_DIR, DEFAULTS_DIR, ASSETS_DIR]
            .iter()
            .filter(|dir| !self.root.join(dir).is_dir())
            .map(|dir| format!("Missing {}/ directory in {:?}", dir, self.root))
            .collect()
    }
}

/// Type names come from user config and become file names.
fn check_name(name: &str) -> TemplateResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(TemplateError::InvalidName(name.to_string()))
    }
}
