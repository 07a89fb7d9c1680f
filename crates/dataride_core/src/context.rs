//! Generation context handed to every component.

use dataride_templates::{TemplateLoader, TemplateRenderer};

use crate::formatter::TerraformFormatter;
use crate::naming::NamingStrategy;
use crate::settings::GeneratorSettings;

/// Stores, renderer and run-wide settings.
#[derive(Debug)]
pub struct GenerationContext {
    pub loader: TemplateLoader,
    pub renderer: TemplateRenderer,
    pub formatter: TerraformFormatter,
    pub naming: NamingStrategy,
}

impl GenerationContext {
    pub fn new(settings: &GeneratorSettings) -> Self {
        Self {
            loader: TemplateLoader::new(&settings.templates_root),
            renderer: TemplateRenderer::new(),
            formatter: TerraformFormatter::new().with_binary(&settings.formatter),
            naming: settings.naming,
        }
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new(&GeneratorSettings::default())
    }
}
