//! Accumulated generation manifest.
//!
//! Every phase of [`crate::Infra`] folds its results in here. The manifest is
//! the render context of the `action_required` document and can be persisted
//! as `manifest.yaml`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value as JsonValue;

use dataride_templates::ConfigMap;

use crate::environment::Environment;
use crate::error::InfraResult;
use crate::module::{Module, ModuleSummary};
use crate::provider::Provider;
use crate::resource::Resource;

/// File name of the persisted manifest.
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Computed manifest keys that extra top-level config keys may not shadow.
pub const COMPUTED_KEYS: &[&str] = &["generated_at", "resource_types", "extra_asset_names"];

/// Merged config of one generated resource, serialised as `{type: config}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub resource_type: String,
    pub config: ConfigMap,
}

impl Serialize for ResourceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.resource_type, &self.config)?;
        map.end()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InfraManifest {
    pub generated_at: DateTime<Utc>,
    pub providers: Vec<Provider>,
    pub resources: Vec<ResourceRecord>,
    /// Sorted, unique
    pub resource_types: Vec<String>,
    pub modules: IndexMap<String, ModuleSummary>,
    pub environments: IndexMap<String, ConfigMap>,
    pub extra_assets: IndexMap<String, ConfigMap>,
    /// Sorted, unique
    pub extra_asset_names: Vec<String>,
    #[serde(flatten)]
    pub extra: ConfigMap,
}

impl InfraManifest {
    pub fn new(providers: Vec<Provider>, extra: ConfigMap) -> Self {
        Self {
            generated_at: Utc::now(),
            providers,
            resources: Vec::new(),
            resource_types: Vec::new(),
            modules: IndexMap::new(),
            environments: IndexMap::new(),
            extra_assets: IndexMap::new(),
            extra_asset_names: Vec::new(),
            extra,
        }
    }

    pub fn record_resources<'a>(&mut self, resources: impl IntoIterator<Item = &'a Resource>) {
        self.resources = resources
            .into_iter()
            .map(|resource| ResourceRecord {
                resource_type: resource.name.clone(),
                config: resource.config.clone(),
            })
            .collect();

        self.resource_types = self
            .resources
            .iter()
            .map(|record| record.resource_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
    }

    pub fn record_modules(&mut self, modules: &IndexMap<String, Module>) {
        self.modules = modules
            .iter()
            .map(|(name, module)| (name.clone(), module.summary()))
            .collect();
    }

    pub fn record_environments(&mut self, environments: &[Environment]) {
        self.environments = environments
            .iter()
            .map(|environment| (environment.name.clone(), environment.config.clone()))
            .collect();
    }

    pub fn record_extra_assets(&mut self, extra_assets: &IndexMap<String, ConfigMap>) {
        self.extra_assets = extra_assets.clone();
        self.extra_asset_names = extra_assets
            .keys()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
    }

    pub fn to_yaml(&self) -> InfraResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// `base` overlaid with the manifest. Manifest keys win.
    pub fn render_context(&self, base: &ConfigMap) -> InfraResult<JsonValue> {
        let mut context = match serde_json::to_value(base)? {
            JsonValue::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        if let JsonValue::Object(manifest) = serde_json::to_value(self)? {
            context.extend(manifest);
        }
        Ok(JsonValue::Object(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataride_templates::ConfigValue;

    fn record(resource_type: &str) -> Resource {
        Resource {
            name: resource_type.to_string(),
            config: ConfigMap::new(),
            module: "main".to_string(),
            jinja: false,
            variables: Vec::new(),
            template_filled: String::new(),
        }
    }

    #[test]
    fn test_resource_types_sorted_unique() {
        let mut manifest = InfraManifest::new(Vec::new(), ConfigMap::new());
        let resources = vec![record("aws_s3_bucket"), record("aws_glue_crawler"), record("aws_s3_bucket")];
        manifest.record_resources(&resources);

        assert_eq!(manifest.resources.len(), 3);
        assert_eq!(manifest.resource_types, vec!["aws_glue_crawler", "aws_s3_bucket"]);
    }

    #[test]
    fn test_recording_replaces_previous_state() {
        let mut manifest = InfraManifest::new(Vec::new(), ConfigMap::new());
        manifest.record_resources(&vec![record("aws_s3_bucket"), record("aws_s3_bucket")]);
        manifest.record_resources(&vec![record("aws_glue_crawler")]);

        assert_eq!(manifest.resources.len(), 1);
        assert_eq!(manifest.resource_types, vec!["aws_glue_crawler"]);
    }

    #[test]
    fn test_render_context_prefers_manifest() {
        let mut manifest = InfraManifest::new(Vec::new(), ConfigMap::new());
        let mut assets = IndexMap::new();
        assets.insert("action_required".to_string(), ConfigMap::new());
        manifest.record_extra_assets(&assets);

        let mut base = ConfigMap::new();
        base.insert("owner".to_string(), ConfigValue::from("data-team"));
        base.insert("extra_asset_names".to_string(), ConfigValue::from("overridden"));

        let context = manifest.render_context(&base).unwrap();
        assert_eq!(context["owner"], "data-team");
        assert_eq!(context["extra_asset_names"][0], "action_required");
    }

    #[test]
    fn test_yaml_output_flattens_extra_keys() {
        let mut extra = ConfigMap::new();
        extra.insert("project".to_string(), ConfigValue::from("lakehouse"));
        let manifest = InfraManifest::new(Vec::new(), extra);

        let yaml = manifest.to_yaml().unwrap();
        assert!(yaml.contains("project: lakehouse"));
        assert!(yaml.contains("generated_at:"));
    }
}
