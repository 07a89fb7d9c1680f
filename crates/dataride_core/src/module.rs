//! Terraform modules.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use dataride_templates::ConfigMap;

use crate::error::InfraResult;
use crate::resource::Resource;
use crate::scaffold::{OutputScaffold, MODULES_DIR};
use crate::variable::{default_stats, Variable};

/// A named bucket of resources.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    /// Fields declared for the module in the `modules` section
    pub config: ConfigMap,
    pub main_tf: String,
    pub var_tf: String,
    pub resources: Vec<Resource>,
    /// Unique by name, first writer wins
    pub variables: Vec<Variable>,
}

impl Module {
    pub fn new(name: impl Into<String>, config: ConfigMap) -> Self {
        Self {
            name: name.into(),
            config,
            main_tf: String::new(),
            var_tf: String::new(),
            resources: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Attach a resource, appending its code and merging its variables.
    pub fn add_resource(&mut self, resource: Resource) {
        self.main_tf.push_str(&resource.template_filled);
        self.main_tf.push_str("\n\n");

        for variable in &resource.variables {
            if self.variables.iter().any(|known| known.name == variable.name) {
                debug!(
                    "Module {}: variable {} already declared, skipping",
                    self.name, variable.name
                );
                continue;
            }
            self.variables.push(variable.clone());
        }

        self.resources.push(resource);
    }

    /// Render the variable declarations from the unique variable set.
    pub fn extend_module_data(&mut self) {
        self.var_tf = self
            .variables
            .iter()
            .map(|variable| format!("{}\n\n", variable))
            .collect();

        let (with_default, no_default) = default_stats(&self.variables);
        debug!(
            "Module ({}) variables: with default values - {}, no default values - {}",
            self.name, with_default, no_default
        );
    }

    pub fn variables_names(&self) -> Vec<String> {
        self.variables.iter().map(|v| v.name.clone()).collect()
    }

    pub fn vars_with_def(&self) -> Vec<&Variable> {
        self.variables.iter().filter(|v| v.has_default()).collect()
    }

    pub fn vars_no_def(&self) -> Vec<&Variable> {
        self.variables.iter().filter(|v| !v.has_default()).collect()
    }

    pub fn summary(&self) -> ModuleSummary {
        ModuleSummary {
            name: self.name.clone(),
            main_tf: self.main_tf.clone(),
            var_tf: self.var_tf.clone(),
            variables: self.variables.iter().map(|v| v.config.clone()).collect(),
            variables_names: self.variables_names(),
            vars_with_def: self.vars_with_def().iter().map(|v| v.name.clone()).collect(),
            vars_no_def: self.vars_no_def().iter().map(|v| v.name.clone()).collect(),
            resources: self
                .resources
                .iter()
                .map(|r| r.instance_name().to_string())
                .collect(),
            config: self.config.clone(),
        }
    }

    /// Write `modules/<name>/main.tf` and, when non-empty, `var.tf`.
    pub fn save(&self, scaffold: &OutputScaffold) -> InfraResult<()> {
        debug!("Saving module: {}", self.name);
        scaffold.write_unit(&Path::new(MODULES_DIR).join(&self.name), &self.main_tf, &self.var_tf)?;
        Ok(())
    }
}

/// Serialisable view of a finalized module, used as render context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub name: String,
    pub main_tf: String,
    pub var_tf: String,
    pub variables: Vec<ConfigMap>,
    pub variables_names: Vec<String>,
    pub vars_with_def: Vec<String>,
    pub vars_no_def: Vec<String>,
    /// Instance names of the attached resources
    pub resources: Vec<String>,
    pub config: ConfigMap,
}
