//! Input configuration loading and normalisation.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use dataride_templates::{merge_defaults, parse_mapping, ConfigMap, ConfigValue, TemplateLoader};

use crate::error::{InfraError, InfraResult};
use crate::manifest::COMPUTED_KEYS;
use crate::provider::Provider;

/// Defaults merged into the whole input config.
pub const INFRA_DEFAULTS: &str = "_config_infra";

const PROVIDERS_SECTION: &str = "providers";
const RESOURCES_SECTION: &str = "resources";
const MODULES_SECTION: &str = "modules";
const ENVIRONMENTS_SECTION: &str = "environments";
const EXTRA_ASSETS_SECTION: &str = "extra_assets";

/// Load an input config file. The root must be a mapping.
pub fn load_config(path: &Path) -> InfraResult<ConfigMap> {
    debug!("Loading config from {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| {
        InfraError::configuration(path.display().to_string(), format!("cannot read config: {}", e))
    })?;

    parse_mapping(&content, path)
        .map_err(|e| InfraError::configuration(path.display().to_string(), e.to_string()))
}

/// One `{type: config}` entry of a resource list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub resource_type: String,
    pub config: ConfigMap,
}

impl ResourceEntry {
    fn parse(entry: &ConfigValue, section: &str) -> InfraResult<Self> {
        let map = match entry {
            ConfigValue::Map(map) if map.len() == 1 => map,
            _ => {
                return Err(InfraError::configuration(
                    section,
                    "each resource must be a single-key mapping",
                ))
            }
        };

        let Some((resource_type, config)) = map.first() else {
            return Err(InfraError::configuration(section, "empty resource entry"));
        };

        let config = match config {
            ConfigValue::Null => ConfigMap::new(),
            ConfigValue::Map(config) => config.clone(),
            other => {
                return Err(InfraError::configuration(
                    format!("resource {}", resource_type),
                    format!("expected a mapping, found {}", other.kind()),
                ))
            }
        };

        Ok(Self {
            resource_type: resource_type.clone(),
            config,
        })
    }

    fn parse_list(section_value: Option<&ConfigValue>, section: &str) -> InfraResult<Vec<Self>> {
        match section_value {
            None | Some(ConfigValue::Null) => Ok(Vec::new()),
            Some(ConfigValue::List(entries)) => entries
                .iter()
                .map(|entry| Self::parse(entry, section))
                .collect(),
            Some(other) => Err(InfraError::configuration(
                section,
                format!("expected a list, found {}", other.kind()),
            )),
        }
    }
}

/// One entry of the `modules` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleEntry {
    /// Resources declared inside the module
    pub resources: Vec<ResourceEntry>,
    /// Every other module field
    pub fields: ConfigMap,
}

/// Normalised input config.
#[derive(Debug, Clone, Default)]
pub struct InfraConfig {
    pub providers: Vec<Provider>,
    pub resources: Vec<ResourceEntry>,
    pub modules: IndexMap<String, ModuleEntry>,
    pub environments: IndexMap<String, ConfigMap>,
    pub extra_assets: IndexMap<String, ConfigMap>,
    /// Top-level keys outside the known sections
    pub extra: ConfigMap,
}

impl InfraConfig {
    /// Merge infra-level defaults into `raw` and normalise it.
    pub fn load(raw: ConfigMap, loader: &TemplateLoader) -> InfraResult<Self> {
        let raw = match loader.load_defaults(INFRA_DEFAULTS)? {
            Some(defaults) => merge_defaults(raw, &defaults),
            None => raw,
        };
        Self::from_map(raw)
    }

    /// Normalise a raw config. Missing or null sections become empty.
    pub fn from_map(mut raw: ConfigMap) -> InfraResult<Self> {
        let providers = Provider::parse_all(raw.get(PROVIDERS_SECTION))?;
        let resources = ResourceEntry::parse_list(raw.get(RESOURCES_SECTION), RESOURCES_SECTION)?;

        let mut modules = IndexMap::new();
        for (name, value) in section_entries(raw.get(MODULES_SECTION), MODULES_SECTION)? {
            let entity = format!("module {}", name);
            check_output_name(&entity, name)?;
            let mut fields = entry_fields(value, &entity)?;
            let resources = ResourceEntry::parse_list(fields.get(RESOURCES_SECTION), &entity)?;
            fields.shift_remove(RESOURCES_SECTION);
            modules.insert(name.clone(), ModuleEntry { resources, fields });
        }

        let mut environments = IndexMap::new();
        for (name, value) in section_entries(raw.get(ENVIRONMENTS_SECTION), ENVIRONMENTS_SECTION)? {
            let entity = format!("environment {}", name);
            check_output_name(&entity, name)?;
            environments.insert(name.clone(), entry_fields(value, &entity)?);
        }

        let mut extra_assets = IndexMap::new();
        for (name, value) in section_entries(raw.get(EXTRA_ASSETS_SECTION), EXTRA_ASSETS_SECTION)? {
            extra_assets.insert(name.clone(), entry_fields(value, &format!("extra asset {}", name))?);
        }

        for section in [
            PROVIDERS_SECTION,
            RESOURCES_SECTION,
            MODULES_SECTION,
            ENVIRONMENTS_SECTION,
            EXTRA_ASSETS_SECTION,
        ] {
            raw.shift_remove(section);
        }

        for key in COMPUTED_KEYS {
            if raw.shift_remove(*key).is_some() {
                warn!("Ignoring top-level key `{}`, it is computed during generation", key);
            }
        }

        debug!(
            "Config normalised: {} providers, {} resources, {} modules, {} environments, {} extra assets",
            providers.len(),
            resources.len(),
            modules.len(),
            environments.len(),
            extra_assets.len()
        );

        Ok(Self {
            providers,
            resources,
            modules,
            environments,
            extra_assets,
            extra: raw,
        })
    }
}

/// Module and environment names become directories under the destination.
pub(crate) fn check_output_name(entity: &str, name: &str) -> InfraResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(InfraError::configuration(
            entity,
            "name must be non-empty and use only letters, digits, `_` or `-`",
        ))
    }
}

fn section_entries<'a>(
    value: Option<&'a ConfigValue>,
    section: &str,
) -> InfraResult<Vec<(&'a String, &'a ConfigValue)>> {
    match value {
        None | Some(ConfigValue::Null) => Ok(Vec::new()),
        Some(ConfigValue::Map(map)) => Ok(map.iter().collect()),
        Some(other) => Err(InfraError::configuration(
            section,
            format!("expected a mapping, found {}", other.kind()),
        )),
    }
}

fn entry_fields(value: &ConfigValue, entity: &str) -> InfraResult<ConfigMap> {
    match value {
        ConfigValue::Null => Ok(ConfigMap::new()),
        ConfigValue::Map(map) => Ok(map.clone()),
        other => Err(InfraError::configuration(
            entity,
            format!("expected a mapping, found {}", other.kind()),
        )),
    }
}
