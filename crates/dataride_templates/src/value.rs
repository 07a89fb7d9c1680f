//! Tagged configuration values.
//!
//! Every YAML value is classified once while loading, so later stages match on
//! [`ConfigValue`] instead of inspecting raw YAML. A mapping carrying
//! `is_variable: true` becomes [`ConfigValue::Variable`].

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;
use serde_yaml::Value as YamlValue;

use crate::error::{TemplateError, TemplateResult};

/// Insertion-ordered field mapping.
pub type ConfigMap = IndexMap<String, ConfigValue>;

/// Marker key for declared variables.
pub const IS_VARIABLE_FIELD: &str = "is_variable";

/// Key holding a variable's declared name.
pub const VARIABLE_NAME_FIELD: &str = "name";

/// A configuration value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<ConfigValue>),
    /// Mapping with `is_variable: true`.
    Variable(ConfigMap),
    Map(ConfigMap),
}

impl ConfigValue {
    /// Classify a parsed YAML value.
    pub fn from_yaml(value: YamlValue) -> Result<Self, String> {
        Ok(match value {
            YamlValue::Null => Self::Null,
            YamlValue::Bool(b) => Self::Bool(b),
            YamlValue::Number(n) => Self::Number(number_from_yaml(&n)?),
            YamlValue::String(s) => Self::String(s),
            YamlValue::Sequence(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::from_yaml)
                    .collect::<Result<_, _>>()?,
            ),
            YamlValue::Mapping(mapping) => Self::from_map(map_from_yaml(mapping)?),
            YamlValue::Tagged(tagged) => {
                return Err(format!("unsupported YAML tag {}", tagged.tag));
            }
        })
    }

    /// Wrap a mapping, tagging it as a variable when it carries the marker.
    pub fn from_map(map: ConfigMap) -> Self {
        if matches!(map.get(IS_VARIABLE_FIELD), Some(ConfigValue::Bool(true))) {
            Self::Variable(map)
        } else {
            Self::Map(map)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Fields of a plain or variable mapping.
    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            Self::Map(map) | Self::Variable(map) => Some(map),
            _ => None,
        }
    }

    /// Truthiness in the loose sense used by config checks.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
            Self::String(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Variable(map) | Self::Map(map) => !map.is_empty(),
        }
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Variable(_) => "variable",
            Self::Map(_) => "mapping",
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        Self::List(value)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            other => write!(f, "<{}>", other.kind()),
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Variable(fields) | Self::Map(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Declared name of a variable mapping bound to `field`.
///
/// Falls back to the field name when `name` is missing or empty.
pub fn variable_name<'a>(field: &'a str, fields: &'a ConfigMap) -> &'a str {
    fields
        .get(VARIABLE_NAME_FIELD)
        .and_then(ConfigValue::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(field)
}

/// Parse a YAML document whose root must be a mapping.
///
/// An empty document yields an empty mapping.
pub fn parse_mapping(content: &str, path: &Path) -> TemplateResult<ConfigMap> {
    let invalid = |message: String| TemplateError::InvalidConfig {
        path: path.to_path_buf(),
        message,
    };

    if content.trim().is_empty() {
        return Ok(ConfigMap::new());
    }

    let value: YamlValue = serde_yaml::from_str(content)?;
    match value {
        YamlValue::Null => Ok(ConfigMap::new()),
        YamlValue::Mapping(mapping) => map_from_yaml(mapping).map_err(invalid),
        other => Err(invalid(format!(
            "expected a mapping at document root, found {}",
            yaml_kind(&other)
        ))),
    }
}

fn map_from_yaml(mapping: serde_yaml::Mapping) -> Result<ConfigMap, String> {
    let mut map = ConfigMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            YamlValue::String(s) => s,
            YamlValue::Number(n) => n.to_string(),
            YamlValue::Bool(b) => b.to_string(),
            other => return Err(format!("unsupported mapping key of kind {}", yaml_kind(&other))),
        };
        map.insert(key, ConfigValue::from_yaml(value)?);
    }
    Ok(map)
}

fn number_from_yaml(number: &serde_yaml::Number) -> Result<Number, String> {
    if let Some(i) = number.as_i64() {
        Ok(Number::from(i))
    } else if let Some(u) = number.as_u64() {
        Ok(Number::from(u))
    } else {
        number
            .as_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| format!("non-finite number {}", number))
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "bool",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ConfigMap {
        parse_mapping(content, Path::new("test.yaml")).unwrap()
    }

    #[test]
    fn test_variable_mapping_is_tagged() {
        let map = parse(
            r#"
bucket_name:
  is_variable: true
  type: string
tags:
  team: data
"#,
        );

        assert!(map["bucket_name"].is_variable());
        assert!(matches!(map["tags"], ConfigValue::Map(_)));
    }

    #[test]
    fn test_is_variable_false_stays_map() {
        let map = parse("field:\n  is_variable: false\n  type: string\n");
        assert!(!map["field"].is_variable());
    }

    #[test]
    fn test_order_is_preserved() {
        let map = parse("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_document_is_empty_map() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        let err = parse_mapping("- a\n- b\n", Path::new("list.yaml")).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidConfig { .. }));
    }

    #[test]
    fn test_variable_name_fallback() {
        let map = parse("v:\n  is_variable: true\n  type: string\n  name: \"\"\n");
        let fields = map["v"].as_map().unwrap();
        assert_eq!(variable_name("v", fields), "v");
    }
}
