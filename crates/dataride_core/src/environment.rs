//! Deployment environments.

use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use dataride_templates::{apply_defaults, ConfigMap, ConfigValue};

use crate::context::GenerationContext;
use crate::error::{InfraError, InfraResult};
use crate::module::{Module, ModuleSummary};
use crate::provider::Provider;
use crate::scaffold::OutputScaffold;
use crate::variable::{default_stats, extract_variables, Variable};

/// Template and defaults name of environment root code.
pub const ENVIRONMENT_TEMPLATE: &str = "_config_environment";

/// Section declaring environment-level variables.
pub const VARIABLES_FIELD: &str = "variables";

/// A deployment context referencing every module and provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub name: String,
    pub config: ConfigMap,
    pub variables: Vec<Variable>,
    pub template: String,
    pub main_tf: String,
    pub var_tf: String,
}

#[derive(Serialize)]
struct EnvironmentContext<'a> {
    modules: IndexMap<&'a str, ModuleSummary>,
    providers: &'a [Provider],
    env: &'a ConfigMap,
}

impl Environment {
    pub fn new(name: &str, config: ConfigMap, ctx: &GenerationContext) -> InfraResult<Self> {
        let entity = format!("environment {}", name);
        let config = apply_defaults(&ctx.loader, ENVIRONMENT_TEMPLATE, config)?;

        let mut variables: Vec<Variable> = Vec::new();
        match config.get(VARIABLES_FIELD) {
            None | Some(ConfigValue::Null) => {}
            Some(ConfigValue::Map(entries)) => {
                for (target, value) in entries {
                    let Some(fields) = value.as_map() else {
                        return Err(InfraError::configuration(
                            &entity,
                            format!("variable `{}` must be a mapping, found {}", target, value.kind()),
                        ));
                    };
                    let variable = Variable::new(target, fields.clone(), ctx)
                        .map_err(|e| e.in_entity(&entity))?;
                    variables.push(variable);
                }
            }
            Some(other) => {
                return Err(InfraError::configuration(
                    &entity,
                    format!("`{}` must be a mapping, found {}", VARIABLES_FIELD, other.kind()),
                ))
            }
        }

        for variable in extract_variables(&config, ctx).map_err(|e| e.in_entity(&entity))? {
            if !variables.iter().any(|known| known.name == variable.name) {
                variables.push(variable);
            }
        }

        let template = ctx.loader.load_template(ENVIRONMENT_TEMPLATE)?;

        let mut environment = Self {
            name: name.to_string(),
            config,
            variables,
            template,
            main_tf: String::new(),
            var_tf: String::new(),
        };
        environment.update_config();

        Ok(environment)
    }

    /// Render the root code once every module is final.
    pub fn extend_environment_data(
        &mut self,
        providers: &[Provider],
        modules: &IndexMap<String, Module>,
        ctx: &GenerationContext,
    ) -> InfraResult<()> {
        self.var_tf = self
            .variables
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n");

        let context = EnvironmentContext {
            modules: modules
                .iter()
                .map(|(name, module)| (name.as_str(), module.summary()))
                .collect(),
            providers,
            env: &self.config,
        };
        self.main_tf = ctx
            .renderer
            .render_jinja(ENVIRONMENT_TEMPLATE, &self.template, &context)?;

        self.update_config();
        self.log_stats();
        Ok(())
    }

    pub fn variables_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    fn update_config(&mut self) {
        self.config.insert("name".to_string(), self.name.as_str().into());
        self.config.insert("main.tf".to_string(), self.main_tf.as_str().into());
        self.config.insert("var.tf".to_string(), self.var_tf.as_str().into());
        self.config.insert(
            "variables_names".to_string(),
            self.variables_names()
                .into_iter()
                .map(ConfigValue::from)
                .collect::<Vec<_>>()
                .into(),
        );

        let mut declared = match self.config.get(VARIABLES_FIELD) {
            Some(ConfigValue::Map(declared)) => declared.clone(),
            _ => ConfigMap::new(),
        };
        for variable in &self.variables {
            declared.insert(variable.target.clone(), variable.to_config_value());
        }
        self.config
            .insert(VARIABLES_FIELD.to_string(), ConfigValue::Map(declared));
    }

    /// Write `<name>/main.tf` and, when non-empty, `var.tf`.
    pub fn save(&self, scaffold: &OutputScaffold) -> InfraResult<()> {
        debug!("Saving environment: {}", self.name);
        scaffold.write_unit(Path::new(&self.name), &self.main_tf, &self.var_tf)?;
        Ok(())
    }

    pub fn log_stats(&self) {
        let (with_default, no_default) = default_stats(&self.variables);
        debug!(
            "Environment ({}) variables: with default values - {}, no default values - {}",
            self.name, with_default, no_default
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{NameGenerator, NamingStrategy};
    use crate::resource::Resource;
    use crate::testing::{fixture_context, write_template};

    fn map(content: &str) -> ConfigMap {
        dataride_templates::parse_mapping(content, Path::new("environment.yaml")).unwrap()
    }

    #[test]
    fn test_null_config_gets_defaults() {
        let (_root, ctx) = fixture_context();
        let environment = Environment::new("dev", ConfigMap::new(), &ctx).unwrap();

        assert!(environment.variables.is_empty());
        assert_eq!(environment.config.get("name"), Some(&ConfigValue::from("dev")));
        assert!(environment.config.contains_key("variables"));
    }

    #[test]
    fn test_variables_section_declares_variables() {
        let (_root, ctx) = fixture_context();
        let environment = Environment::new(
            "prod",
            map("variables:\n  region:\n    type: string\n    default_value: eu-west-1\n  db_password:\n    type: string\n"),
            &ctx,
        )
        .unwrap();

        assert_eq!(environment.variables_names(), vec!["region", "db_password"]);
        let variables = environment.config.get("variables").unwrap().as_map().unwrap();
        assert!(variables.get("region").unwrap().is_variable());
    }

    #[test]
    fn test_variable_without_type_names_environment() {
        let (_root, ctx) = fixture_context();
        let err = Environment::new("prod", map("variables:\n  region:\n    default_value: x\n"), &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("environment prod"));
    }

    #[test]
    fn test_root_code_references_modules_and_providers() {
        let (root, ctx) = fixture_context();
        write_template(root.path(), "test_bucket", "bucket <region>");

        let resource = Resource::new(
            "test_bucket",
            map("region:\n  is_variable: true\n  type: string\n"),
            &ctx,
            &mut NameGenerator::new(NamingStrategy::Sequential),
        )
        .unwrap();
        let mut module = Module::new("main", ConfigMap::new());
        module.add_resource(resource);
        module.extend_module_data();
        let modules: IndexMap<String, Module> = [("main".to_string(), module)].into_iter().collect();

        let providers = vec![Provider {
            name: "aws".to_string(),
            params: map("region: eu-west-1\n"),
        }];

        let mut environment = Environment::new(
            "dev",
            map("variables:\n  region:\n    type: string\n    default_value: eu-west-1\n"),
            &ctx,
        )
        .unwrap();
        environment
            .extend_environment_data(&providers, &modules, &ctx)
            .unwrap();

        assert!(environment.main_tf.contains("provider \"aws\""));
        assert!(environment.main_tf.contains("module \"main\""));
        assert!(environment.main_tf.contains("source = \"../modules/main\""));
        assert!(environment.main_tf.contains("region = var.region"));
        assert!(environment.var_tf.contains("variable \"region\""));
        assert_eq!(
            environment.config.get("main.tf"),
            Some(&ConfigValue::from(environment.main_tf.as_str()))
        );
    }
}
