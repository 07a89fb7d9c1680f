//! Scratch template roots for unit tests.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use dataride_templates::{ASSETS_DIR, DEFAULTS_DIR, TEMPLATES_DIR};

use crate::context::GenerationContext;
use crate::naming::NamingStrategy;
use crate::settings::GeneratorSettings;

const VARIABLE_TEMPLATE: &str = r#"variable <name> {
  type = <type>
{%- if description %}
  description = <description>
{%- endif %}
{%- if default_value is defined and default_value is not none %}
  default = <default_value>
{%- endif %}
}
"#;

const VARIABLE_DEFAULTS: &str = "name: null\ndefault_value: null\ndescription: \"\"\n";

const ENVIRONMENT_TEMPLATE: &str = r#"{% for provider in providers %}{% for name, params in provider|items %}provider "{{ name }}" {}
{% endfor %}{% endfor %}
{%- for name, module in modules|items %}
module "{{ name }}" {
  source = "../modules/{{ name }}"
{%- for var in module.variables_names %}{% if var in env.variables_names %}
  {{ var }} = var.{{ var }}
{%- endif %}{% endfor %}
}
{% endfor %}"#;

const ENVIRONMENT_DEFAULTS: &str = "variables: {}\n";

const ACTION_REQUIRED: &str = r#"# Action required
{% for name in extra_asset_names %}- {{ name }}
{% endfor %}{% if owner %}owner: {{ owner }}{% endif %}
"#;

/// Template root with variable, environment and asset fixtures, plus a
/// sequential-naming context pointing at it.
pub fn fixture_context() -> (TempDir, GenerationContext) {
    let root = TempDir::new().unwrap();

    write_template(root.path(), "_config_variable", VARIABLE_TEMPLATE);
    write_defaults(root.path(), "_config_variable", VARIABLE_DEFAULTS);
    write_template(root.path(), "_config_environment", ENVIRONMENT_TEMPLATE);
    write_defaults(root.path(), "_config_environment", ENVIRONMENT_DEFAULTS);

    let action_required = root.path().join(ASSETS_DIR).join("action_required");
    fs::create_dir_all(&action_required).unwrap();
    fs::write(action_required.join("action_required.md"), ACTION_REQUIRED).unwrap();

    let airflow = root.path().join(ASSETS_DIR).join("airflow_local").join("dags");
    fs::create_dir_all(&airflow).unwrap();
    fs::write(airflow.join("example.py"), "# dag\n").unwrap();

    let settings = GeneratorSettings::default()
        .with_templates_root(root.path())
        .with_naming(NamingStrategy::Sequential);
    let ctx = GenerationContext::new(&settings);

    (root, ctx)
}

pub fn write_template(root: &Path, name: &str, content: &str) {
    let dir = root.join(TEMPLATES_DIR);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.tf", name)), content).unwrap();
}

pub fn write_defaults(root: &Path, name: &str, content: &str) {
    let dir = root.join(DEFAULTS_DIR);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{}.yaml", name)), content).unwrap();
}
