//! Terraform resources.

use tracing::debug;

use dataride_templates::{apply_defaults, ConfigMap, ConfigValue};

use crate::config::check_output_name;
use crate::context::GenerationContext;
use crate::error::{InfraError, InfraResult};
use crate::naming::NameGenerator;
use crate::variable::{default_stats, extract_variables, Variable};

/// Module that receives resources declaring none.
pub const DEFAULT_MODULE: &str = "main";

/// Reserved field naming the owning module.
pub const MODULE_FIELD: &str = "_module";

/// Reserved field enabling conditional templating.
pub const JINJA_FIELD: &str = "_jinja";

/// Field holding the resource instance name.
pub const NAME_FIELD: &str = "resource_name";

/// One rendered infrastructure unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Type identifier, e.g. `aws_s3_bucket`
    pub name: String,
    /// Merged config, with variable fields resolved
    pub config: ConfigMap,
    pub module: String,
    pub jinja: bool,
    pub variables: Vec<Variable>,
    pub template_filled: String,
}

impl Resource {
    /// Merge defaults, extract variables and render the template of `name`.
    pub fn new(
        name: &str,
        config: ConfigMap,
        ctx: &GenerationContext,
        names: &mut NameGenerator,
    ) -> InfraResult<Self> {
        let entity = format!("resource {}", name);

        debug!("Running resource config check for {}", name);
        if config.is_empty() {
            return Err(InfraError::configuration(entity, "resource config is empty"));
        }

        let mut config = apply_defaults(&ctx.loader, name, config)?;
        if config.get(NAME_FIELD).map_or(true, ConfigValue::is_null) {
            config.insert(NAME_FIELD.to_string(), names.generate(name).into());
        }

        let module = match config.get(MODULE_FIELD) {
            None | Some(ConfigValue::Null) => DEFAULT_MODULE.to_string(),
            Some(ConfigValue::String(module)) => {
                check_output_name(&entity, module)?;
                module.clone()
            }
            Some(other) => {
                return Err(InfraError::configuration(
                    entity,
                    format!("`{}` must be a module name, found {}", MODULE_FIELD, other.kind()),
                ))
            }
        };
        config.insert(MODULE_FIELD.to_string(), module.as_str().into());

        let jinja = match config.get(JINJA_FIELD) {
            None | Some(ConfigValue::Null) => false,
            Some(ConfigValue::Bool(jinja)) => *jinja,
            Some(other) => {
                return Err(InfraError::configuration(
                    entity,
                    format!("`{}` must be a boolean, found {}", JINJA_FIELD, other.kind()),
                ))
            }
        };

        let variables = extract_variables(&config, ctx).map_err(|e| e.in_entity(&entity))?;

        let mut template = ctx.loader.load_template(name)?;
        if jinja {
            template = ctx.renderer.render_jinja(name, &template, &config)?;
        }
        let template_filled = ctx
            .renderer
            .fill_template_values(&template, &config)
            .map_err(|e| InfraError::from(e).in_entity(&entity))?;

        for variable in &variables {
            config.insert(variable.target.clone(), variable.to_config_value());
        }

        let resource = Self {
            name: name.to_string(),
            config,
            module,
            jinja,
            variables,
            template_filled,
        };
        resource.log_stats();

        Ok(resource)
    }

    /// Terraform instance name from `resource_name`.
    pub fn instance_name(&self) -> &str {
        self.config
            .get(NAME_FIELD)
            .and_then(ConfigValue::as_str)
            .unwrap_or_default()
    }

    pub fn log_stats(&self) {
        let (with_default, no_default) = default_stats(&self.variables);
        debug!(
            "Resource ({}) variables: with default values - {}, no default values - {}",
            self.name, with_default, no_default
        );
    }
}
