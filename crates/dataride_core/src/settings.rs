//! Generator settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::naming::NamingStrategy;

/// Default external formatter binary.
pub const DEFAULT_FORMATTER: &str = "terraform";

/// Settings shared by every generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Directory holding `infra_templates/`, `infra_defaults/` and `extra_assets/`
    pub templates_root: PathBuf,
    /// Naming strategy for resources without an explicit `resource_name`
    pub naming: NamingStrategy,
    /// Formatter binary invoked after generation
    pub formatter: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            templates_root: PathBuf::from("."),
            naming: NamingStrategy::default(),
            formatter: DEFAULT_FORMATTER.to_string(),
        }
    }
}

impl GeneratorSettings {
    pub fn with_templates_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.templates_root = root.into();
        self
    }

    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_formatter(mut self, binary: impl Into<String>) -> Self {
        self.formatter = binary.into();
        self
    }
}
