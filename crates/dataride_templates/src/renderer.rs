//! Two-phase template rendering.
//!
//! Phase one runs Jinja-compatible conditional templating. Phase two replaces
//! `<field>` placeholders with typed Terraform literals.

use minijinja::{Environment, Error, ErrorKind, Value};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::value::{variable_name, ConfigMap, ConfigValue};

/// Field whose string value is a Terraform type expression.
pub const TYPE_FIELD: &str = "type";

/// Template renderer shared by every generated entity.
pub struct TemplateRenderer {
    environment: Environment<'static>,
    placeholder_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("placeholder_pattern", &self.placeholder_pattern.as_str())
            .finish()
    }
}

impl TemplateRenderer {
    /// Create a new template renderer.
    pub fn new() -> Self {
        let mut environment = Environment::new();
        environment.add_function("raise_error", raise_error);
        environment.add_function("intersection", intersection);
        environment.add_filter("any", any);

        Self {
            environment,
            // Match <field_name> pattern
            placeholder_pattern: Regex::new(r"<([A-Za-z_][A-Za-z0-9_]*)>")
                .expect("placeholder pattern is valid"),
        }
    }

    /// Phase one: render conditional template syntax against `context`.
    pub fn render_jinja<S: Serialize>(
        &self,
        name: &str,
        template: &str,
        context: S,
    ) -> TemplateResult<String> {
        debug!("Rendering template {}", name);
        self.environment
            .render_str(template, context)
            .map_err(|e| TemplateError::RenderingFailed {
                template: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Phase two: replace every `<field>` placeholder using the typed rules.
    ///
    /// Placeholders whose field is absent or null are left untouched.
    pub fn fill_template_values(&self, template: &str, values: &ConfigMap) -> TemplateResult<String> {
        let mut output = String::with_capacity(template.len());
        let mut last = 0;

        for caps in self.placeholder_pattern.captures_iter(template) {
            let (Some(whole), Some(field)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            output.push_str(&template[last..whole.start()]);
            match render_field(field.as_str(), values.get(field.as_str()))? {
                Some(rendered) => output.push_str(&rendered),
                None => output.push_str(whole.as_str()),
            }
            last = whole.end();
        }

        output.push_str(&template[last..]);
        Ok(output)
    }

    /// Placeholders still present in `text`, in order of appearance.
    pub fn unresolved_placeholders(&self, text: &str) -> Vec<String> {
        self.placeholder_pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}

fn render_field(field: &str, value: Option<&ConfigValue>) -> TemplateResult<Option<String>> {
    match value {
        None | Some(ConfigValue::Null) => Ok(None),
        Some(ConfigValue::String(s)) if field == TYPE_FIELD => Ok(Some(s.to_lowercase())),
        Some(ConfigValue::List(items)) => {
            let rendered = items
                .iter()
                .map(|item| render_scalar(field, item))
                .collect::<TemplateResult<Vec<_>>>()?;
            Ok(Some(format!("[{}]", rendered.join(", "))))
        }
        Some(other) => render_scalar(field, other).map(Some),
    }
}

fn render_scalar(field: &str, value: &ConfigValue) -> TemplateResult<String> {
    match value {
        ConfigValue::Bool(b) => Ok(b.to_string()),
        ConfigValue::Variable(fields) => Ok(format!("var.{}", variable_name(field, fields))),
        ConfigValue::String(s) => Ok(match s.strip_prefix('_') {
            Some(raw) => raw.to_string(),
            None => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }),
        ConfigValue::Number(n) => Ok(n.to_string()),
        other => Err(TemplateError::UnsupportedValue {
            field: field.to_string(),
            found: other.kind().to_string(),
        }),
    }
}

/// `raise_error(message)`: abort rendering with `message`.
fn raise_error(message: String) -> Result<Value, Error> {
    Err(Error::new(ErrorKind::InvalidOperation, message))
}

/// `intersection(a, b)`: items of `a` also in `b`, de-duplicated, in `a`'s order.
fn intersection(left: Vec<Value>, right: Vec<Value>) -> Vec<Value> {
    let mut common: Vec<Value> = Vec::new();
    for item in left {
        if right.contains(&item) && !common.contains(&item) {
            common.push(item);
        }
    }
    common
}

fn any(values: Vec<Value>) -> bool {
    values.iter().any(Value::is_true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::value::parse_mapping;

    fn values(content: &str) -> ConfigMap {
        parse_mapping(content, Path::new("values.yaml")).unwrap()
    }

    #[test]
    fn test_typed_substitution() {
        let renderer = TemplateRenderer::new();
        let vals = values("enabled: true\nlabel: prod\nraw_expr: _some.ref\ncount: 3\nratio: 0.5\n");

        let filled = renderer
            .fill_template_values("<enabled> <label> <raw_expr> <count> <ratio>", &vals)
            .unwrap();
        assert_eq!(filled, "true \"prod\" some.ref 3 0.5");
    }

    #[test]
    fn test_quoted_strings_are_escaped() {
        let renderer = TemplateRenderer::new();
        let vals = values("label: 'say \"hi\"'\npath: 'C:\\data'\n");

        let filled = renderer.fill_template_values("<label> <path>", &vals).unwrap();
        assert_eq!(filled, r#""say \"hi\"" "C:\\data""#);
    }

    #[test]
    fn test_list_substitution() {
        let renderer = TemplateRenderer::new();
        let vals = values("zones: [a, _local.zone, 2, false]\nempty: []\n");

        let filled = renderer.fill_template_values("<zones> <empty>", &vals).unwrap();
        assert_eq!(filled, "[\"a\", local.zone, 2, false] []");
    }

    #[test]
    fn test_variable_reference() {
        let renderer = TemplateRenderer::new();
        let vals = values(
            "bucket_name:\n  is_variable: true\n  type: string\n  name: raw_bucket\nregion:\n  is_variable: true\n  type: string\n",
        );

        let filled = renderer.fill_template_values("<bucket_name> <region>", &vals).unwrap();
        assert_eq!(filled, "var.raw_bucket var.region");
    }

    #[test]
    fn test_type_field_is_unquoted() {
        let renderer = TemplateRenderer::new();
        let vals = values("type: List(String)\n");
        assert_eq!(renderer.fill_template_values("type = <type>", &vals).unwrap(), "type = list(string)");
    }

    #[test]
    fn test_null_and_missing_are_left_untouched() {
        let renderer = TemplateRenderer::new();
        let vals = values("schedule: null\n");

        let filled = renderer.fill_template_values("<schedule> <unknown>", &vals).unwrap();
        assert_eq!(filled, "<schedule> <unknown>");
        assert_eq!(renderer.unresolved_placeholders(&filled), vec!["schedule", "unknown"]);
    }

    #[test]
    fn test_nested_mapping_is_rejected() {
        let renderer = TemplateRenderer::new();
        let vals = values("tags:\n  team: data\n");

        let err = renderer.fill_template_values("tags = <tags>", &vals).unwrap_err();
        match err {
            TemplateError::UnsupportedValue { field, found } => {
                assert_eq!(field, "tags");
                assert_eq!(found, "mapping");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_heredoc_markers_are_not_placeholders() {
        let renderer = TemplateRenderer::new();
        let text = "policy = <<EOF\n{}\nEOF";
        assert!(renderer.unresolved_placeholders(text).is_empty());
    }

    #[test]
    fn test_jinja_helpers() {
        let renderer = TemplateRenderer::new();
        let ctx = values("features: [glue, s3, athena]\nflags: [false, true]\n");

        let rendered = renderer
            .render_jinja(
                "helpers",
                "{{ intersection(features, ['s3', 'glue', 'emr']) | join(',') }} {{ flags | any }}",
                &ctx,
            )
            .unwrap();
        assert_eq!(rendered, "glue,s3 true");
    }

    #[test]
    fn test_raise_error_aborts_rendering() {
        let renderer = TemplateRenderer::new();
        let err = renderer
            .render_jinja("guard", "{{ raise_error('bucket_name is required') }}", &ConfigMap::new())
            .unwrap_err();

        assert!(matches!(err, TemplateError::RenderingFailed { .. }));
        assert!(err.to_string().contains("bucket_name is required"));
    }

    #[test]
    fn test_jinja_keeps_placeholders() {
        let renderer = TemplateRenderer::new();
        let ctx = values("versioning: true\n");

        let rendered = renderer
            .render_jinja("bucket", "bucket = <bucket_name>{% if versioning %} versioned{% endif %}", &ctx)
            .unwrap();
        assert_eq!(rendered, "bucket = <bucket_name> versioned");
    }
}
