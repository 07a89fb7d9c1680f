//! Terraform variable declarations.

use std::fmt;

use tracing::debug;

use dataride_templates::{
    apply_defaults, ConfigMap, ConfigValue, IS_VARIABLE_FIELD, TYPE_FIELD,
};

use crate::context::GenerationContext;
use crate::error::{InfraError, InfraResult};

/// Template and defaults name of variable declarations.
pub const VARIABLE_TEMPLATE: &str = "_config_variable";

const TARGET_FIELD: &str = "target";
const NAME_FIELD: &str = "name";
const DEFAULT_VALUE_FIELD: &str = "default_value";
const DESCRIPTION_FIELD: &str = "description";

/// A single parameterized field and its rendered declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Field name the owner binds this variable to
    pub target: String,
    /// Declared variable name
    pub name: String,
    pub var_type: String,
    pub default_value: ConfigValue,
    pub description: String,
    pub config: ConfigMap,
    pub template_filled: String,
}

impl Variable {
    pub fn new(target: &str, config: ConfigMap, ctx: &GenerationContext) -> InfraResult<Self> {
        let entity = format!("variable {}", target);

        let var_type = match config.get(TYPE_FIELD) {
            Some(ConfigValue::String(t)) if !t.is_empty() => t.clone(),
            _ => {
                return Err(InfraError::configuration(
                    entity,
                    format!("missing required field `{}`", TYPE_FIELD),
                ))
            }
        };

        let mut config = apply_defaults(&ctx.loader, VARIABLE_TEMPLATE, config)?;
        config.insert(TARGET_FIELD.to_string(), target.into());
        config.insert(IS_VARIABLE_FIELD.to_string(), true.into());

        let name = config
            .get(NAME_FIELD)
            .and_then(ConfigValue::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(target)
            .to_string();
        config.insert(NAME_FIELD.to_string(), name.clone().into());

        let default_value = config.get(DEFAULT_VALUE_FIELD).cloned().unwrap_or_default();
        let description = config
            .get(DESCRIPTION_FIELD)
            .and_then(ConfigValue::as_str)
            .unwrap_or_default()
            .to_string();

        let template = ctx.loader.load_template(VARIABLE_TEMPLATE)?;
        let rendered = ctx.renderer.render_jinja(VARIABLE_TEMPLATE, &template, &config)?;
        let template_filled = ctx
            .renderer
            .fill_template_values(&rendered, &config)
            .map_err(|e| InfraError::from(e).in_entity(&entity))?;

        debug!("Variable {} declared for field {}", name, target);

        Ok(Self {
            target: target.to_string(),
            name,
            var_type,
            default_value,
            description,
            config,
            template_filled,
        })
    }

    pub fn has_default(&self) -> bool {
        !self.default_value.is_null()
    }

    /// Resolved config, tagged as a variable.
    pub fn to_config_value(&self) -> ConfigValue {
        ConfigValue::Variable(self.config.clone())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.template_filled)
    }
}

/// Build a [`Variable`] for every variable-shaped field, in field order.
pub fn extract_variables(fields: &ConfigMap, ctx: &GenerationContext) -> InfraResult<Vec<Variable>> {
    fields
        .iter()
        .filter_map(|(field, value)| match value {
            ConfigValue::Variable(config) => Some(Variable::new(field, config.clone(), ctx)),
            _ => None,
        })
        .collect()
}

/// Count variables with and without a default value.
pub fn default_stats(variables: &[Variable]) -> (usize, usize) {
    let with_default = variables.iter().filter(|v| v.has_default()).count();
    (with_default, variables.len() - with_default)
}
