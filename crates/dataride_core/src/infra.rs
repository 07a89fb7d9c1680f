//! Infrastructure aggregate and phase orchestration.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{info, warn};

use dataride_templates::{ConfigMap, ConfigValue};

use crate::asset::{Asset, ACTION_REQUIRED};
use crate::config::{load_config, InfraConfig, ResourceEntry};
use crate::context::GenerationContext;
use crate::environment::Environment;
use crate::error::InfraResult;
use crate::formatter::FormatOutcome;
use crate::manifest::{InfraManifest, MANIFEST_FILE};
use crate::module::Module;
use crate::naming::NameGenerator;
use crate::resource::{Resource, MODULE_FIELD, NAME_FIELD};
use crate::scaffold::OutputScaffold;

/// Root aggregate of one generation run.
///
/// Phases run in the order modules, resources, environments, extra assets.
/// Each phase rebuilds its collections from the input config.
#[derive(Debug)]
pub struct Infra {
    config: InfraConfig,
    destination: PathBuf,
    context: GenerationContext,
    module_resources: Vec<Resource>,
    top_level_resources: Vec<Resource>,
    modules: IndexMap<String, Module>,
    environments: Vec<Environment>,
    extra_assets: Vec<Asset>,
    manifest: InfraManifest,
}

impl Infra {
    /// Validate providers and normalise the raw input config.
    pub fn new(
        raw: ConfigMap,
        destination: impl Into<PathBuf>,
        context: GenerationContext,
    ) -> InfraResult<Self> {
        info!("Running main config file check");
        let config = InfraConfig::load(raw, &context.loader)?;
        info!("Config check passed");

        let manifest = InfraManifest::new(config.providers.clone(), config.extra.clone());

        Ok(Self {
            config,
            destination: destination.into(),
            context,
            module_resources: Vec::new(),
            top_level_resources: Vec::new(),
            modules: IndexMap::new(),
            environments: Vec::new(),
            extra_assets: Vec::new(),
            manifest,
        })
    }

    /// Load the input config from `path`.
    pub fn from_file(
        path: &Path,
        destination: impl Into<PathBuf>,
        context: GenerationContext,
    ) -> InfraResult<Self> {
        Self::new(load_config(path)?, destination, context)
    }

    /// Build the resources declared inside the `modules` section.
    pub fn process_modules(&mut self) -> InfraResult<()> {
        info!("Processing {} modules", self.config.modules.len());

        let mut names = self.name_generator();
        let mut resources = Vec::new();
        for (module_name, entry) in &self.config.modules {
            for resource in &entry.resources {
                let mut config = resource.config.clone();
                config.insert(MODULE_FIELD.to_string(), module_name.as_str().into());
                resources.push(Resource::new(
                    &resource.resource_type,
                    config,
                    &self.context,
                    &mut names,
                )?);
            }
        }

        self.module_resources = resources;
        self.assemble_modules();
        Ok(())
    }

    /// Build the resources of the top-level `resources` section.
    pub fn process_resources(&mut self) -> InfraResult<()> {
        info!("Processing {} resources", self.config.resources.len());

        let mut names = self.name_generator();
        for resource in &self.module_resources {
            names.reserve(resource.instance_name());
        }

        let resources = self
            .config
            .resources
            .iter()
            .map(|entry| {
                Resource::new(&entry.resource_type, entry.config.clone(), &self.context, &mut names)
            })
            .collect::<InfraResult<Vec<_>>>()?;

        self.top_level_resources = resources;
        self.assemble_modules();
        Ok(())
    }

    /// Build every environment against the finalized modules.
    pub fn process_environments(&mut self) -> InfraResult<()> {
        info!("Processing {} environments", self.config.environments.len());
        if self.config.environments.is_empty() {
            warn!("No environments declared, only modules will be generated");
        }

        let mut environments = Vec::with_capacity(self.config.environments.len());
        for (name, config) in &self.config.environments {
            let mut environment = Environment::new(name, config.clone(), &self.context)?;
            environment.extend_environment_data(&self.config.providers, &self.modules, &self.context)?;
            environments.push(environment);
        }

        self.environments = environments;
        self.manifest.record_environments(&self.environments);
        Ok(())
    }

    /// Build the extra assets. `action_required` always exists and comes last.
    pub fn process_extra_assets(&mut self) -> InfraResult<()> {
        let mut assets_config = self.config.extra_assets.clone();
        let action_required = assets_config.shift_remove(ACTION_REQUIRED).unwrap_or_default();
        assets_config.insert(ACTION_REQUIRED.to_string(), action_required);

        info!("Processing {} extra assets", assets_config.len());
        self.manifest.record_extra_assets(&assets_config);

        let mut assets = Vec::with_capacity(assets_config.len());
        for (name, config) in &assets_config {
            assets.push(Asset::from_name(name, config, &self.manifest, &self.context)?);
        }

        self.extra_assets = assets;
        Ok(())
    }

    /// Run every phase in order.
    pub fn process_all(&mut self) -> InfraResult<()> {
        self.process_modules()?;
        self.process_resources()?;
        self.process_environments()?;
        self.process_extra_assets()
    }

    /// Write modules, environments and assets under the destination.
    pub fn save(&self) -> InfraResult<()> {
        info!("Saving the infrastructure setup to {:?}", self.destination);

        let scaffold = OutputScaffold::new(&self.destination);
        scaffold.create_structure()?;

        for module in self.modules.values() {
            module.save(&scaffold)?;
        }
        for environment in &self.environments {
            environment.save(&scaffold)?;
        }
        for asset in &self.extra_assets {
            asset.save(&self.destination)?;
        }

        info!(
            "Saved {} modules, {} environments and {} extra assets",
            self.modules.len(),
            self.environments.len(),
            self.extra_assets.len()
        );
        Ok(())
    }

    /// Run the external formatter over the destination when `fmt` is set.
    pub fn format_code(&self, fmt: bool) -> FormatOutcome {
        if !fmt {
            return FormatOutcome::Skipped;
        }
        self.context.formatter.fmt(&self.destination)
    }

    /// Persist the manifest as `<destination>/manifest.yaml`.
    pub fn write_manifest(&self) -> InfraResult<PathBuf> {
        let path = self.destination.join(MANIFEST_FILE);
        fs::write(&path, self.manifest.to_yaml()?)?;
        info!("Manifest written to {:?}", path);
        Ok(path)
    }

    pub fn config(&self) -> &InfraConfig {
        &self.config
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Module-declared resources, then top-level ones.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.module_resources.iter().chain(&self.top_level_resources)
    }

    pub fn modules(&self) -> &IndexMap<String, Module> {
        &self.modules
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn extra_assets(&self) -> &[Asset] {
        &self.extra_assets
    }

    pub fn manifest(&self) -> &InfraManifest {
        &self.manifest
    }

    /// Fresh generator with every explicit instance name reserved.
    fn name_generator(&self) -> NameGenerator {
        let mut names = NameGenerator::new(self.context.naming);
        let entries = self
            .config
            .modules
            .values()
            .flat_map(|module| &module.resources)
            .chain(&self.config.resources);
        for name in entries.filter_map(explicit_name) {
            names.reserve(name);
        }
        names
    }

    /// Rebuild module buckets: declared modules first, then ones first
    /// referenced by a resource.
    fn assemble_modules(&mut self) {
        let mut modules: IndexMap<String, Module> = self
            .config
            .modules
            .iter()
            .map(|(name, entry)| (name.clone(), Module::new(name, entry.fields.clone())))
            .collect();

        for resource in self.module_resources.iter().chain(&self.top_level_resources) {
            modules
                .entry(resource.module.clone())
                .or_insert_with(|| Module::new(&resource.module, ConfigMap::new()))
                .add_resource(resource.clone());
        }

        for module in modules.values_mut() {
            module.extend_module_data();
        }

        self.modules = modules;
        self.manifest
            .record_resources(self.module_resources.iter().chain(&self.top_level_resources));
        self.manifest.record_modules(&self.modules);
    }
}

fn explicit_name(entry: &ResourceEntry) -> Option<&str> {
    entry.config.get(NAME_FIELD).and_then(ConfigValue::as_str)
}
