//! Provider declarations and validation.

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use dataride_templates::{ConfigMap, ConfigValue};

use crate::error::{InfraError, InfraResult};

/// Well-known cloud providers with extra validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azure",
            CloudProvider::Gcp => "gcp",
        }
    }

    /// Recognise a Terraform provider name.
    pub fn from_provider_name(name: &str) -> Option<Self> {
        match name {
            "aws" => Some(CloudProvider::Aws),
            "azurerm" => Some(CloudProvider::Azure),
            "google" => Some(CloudProvider::Gcp),
            _ => None,
        }
    }

    /// Get the Terraform provider name.
    pub fn provider_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "aws",
            CloudProvider::Azure => "azurerm",
            CloudProvider::Gcp => "google",
        }
    }

    /// Fields every declaration of this provider must carry.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CloudProvider::Aws => &["region"],
            CloudProvider::Azure | CloudProvider::Gcp => &[],
        }
    }
}

impl std::fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the `providers` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub name: String,
    pub params: ConfigMap,
}

impl Provider {
    pub fn cloud(&self) -> Option<CloudProvider> {
        CloudProvider::from_provider_name(&self.name)
    }

    /// Parse and validate the `providers` section.
    ///
    /// Each entry must be a single-key mapping, names must be unique and
    /// well-known clouds must carry their required fields.
    pub fn parse_all(section: Option<&ConfigValue>) -> InfraResult<Vec<Provider>> {
        debug!("Running provider checks");

        let entries = match section {
            None | Some(ConfigValue::Null) => return Ok(Vec::new()),
            Some(ConfigValue::List(entries)) => entries,
            Some(other) => {
                return Err(InfraError::configuration(
                    "providers",
                    format!("expected a list, found {}", other.kind()),
                ))
            }
        };

        let mut seen = HashSet::new();
        let mut providers = Vec::with_capacity(entries.len());

        for entry in entries {
            let provider = Self::parse_entry(entry)?;

            if !seen.insert(provider.name.clone()) {
                return Err(InfraError::configuration(
                    format!("provider {}", provider.name),
                    "provider has been duplicated",
                ));
            }

            if let Some(cloud) = provider.cloud() {
                for field in cloud.required_fields() {
                    if provider.params.get(*field).map_or(true, ConfigValue::is_null) {
                        return Err(InfraError::configuration(
                            format!("provider {}", provider.name),
                            format!("missing required field `{}`", field),
                        ));
                    }
                }
            }

            providers.push(provider);
        }

        debug!("Provider checks passed ({} providers)", providers.len());
        Ok(providers)
    }

    fn parse_entry(entry: &ConfigValue) -> InfraResult<Provider> {
        let map = match entry {
            ConfigValue::Map(map) if map.len() == 1 => map,
            _ => {
                return Err(InfraError::configuration(
                    "providers",
                    "each provider must be a single-key mapping",
                ))
            }
        };

        let Some((name, params)) = map.first() else {
            return Err(InfraError::configuration("providers", "empty provider entry"));
        };

        let params = match params {
            ConfigValue::Null => ConfigMap::new(),
            ConfigValue::Map(params) => params.clone(),
            other => {
                return Err(InfraError::configuration(
                    format!("provider {}", name),
                    format!("expected a mapping of parameters, found {}", other.kind()),
                ))
            }
        };

        Ok(Provider {
            name: name.clone(),
            params,
        })
    }
}

/// Serialises back to the single-key `{name: params}` input shape.
impl Serialize for Provider {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.params)?;
        map.end()
    }
}
