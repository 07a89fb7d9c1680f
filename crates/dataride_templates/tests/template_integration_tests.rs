//! Integration tests for the shipped template root.

use std::fs;
use std::path::{Path, PathBuf};

use dataride_templates::{
    apply_defaults, parse_mapping, ConfigMap, ConfigValue, TemplateError, TemplateLoader,
    TemplateRenderer, TEMPLATES_DIR,
};
use tempfile::tempdir;

fn templates_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn config(content: &str) -> ConfigMap {
    parse_mapping(content, Path::new("inline.yaml")).unwrap()
}

#[test]
fn test_shipped_root_is_complete() {
    let loader = TemplateLoader::new(templates_root());
    assert!(loader.validate().is_empty(), "{:?}", loader.validate());

    for name in ["_config_variable", "_config_environment"] {
        assert!(loader.load_template(name).is_ok(), "Missing template {}", name);
    }
    for asset in ["action_required", "airflow_local", "mageai_local"] {
        assert!(loader.asset_dir(asset).is_ok(), "Missing asset {}", asset);
    }
}

#[test]
fn test_every_template_has_defaults() {
    let root = templates_root();
    let loader = TemplateLoader::new(&root);

    for entry in fs::read_dir(root.join(TEMPLATES_DIR)).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_stem().unwrap().to_str().unwrap().to_string();
        let defaults = loader.load_defaults(&name).unwrap();
        assert!(defaults.is_some(), "No defaults for {}", name);
    }
}

#[test]
fn test_variable_declaration() {
    let loader = TemplateLoader::new(templates_root());
    let renderer = TemplateRenderer::new();

    let mut variable = apply_defaults(
        &loader,
        "_config_variable",
        config("is_variable: true\ntype: String\ndefault_value: abc\n"),
    )
    .unwrap();
    variable.insert("name".to_string(), ConfigValue::from("bucket_name"));

    let template = loader.load_template("_config_variable").unwrap();
    let rendered = renderer.render_jinja("_config_variable", &template, &variable).unwrap();
    let filled = renderer.fill_template_values(&rendered, &variable).unwrap();

    assert_eq!(
        filled,
        "variable \"bucket_name\" {\n  type = string\n  default = \"abc\"\n}"
    );
}

#[test]
fn test_bucket_template_with_versioning() {
    let loader = TemplateLoader::new(templates_root());
    let renderer = TemplateRenderer::new();

    let values = apply_defaults(
        &loader,
        "aws_s3_bucket",
        config("resource_name: raw\nbucket_name: dataride-raw\nobject_lock_enabled: true\n"),
    )
    .unwrap();

    let template = loader.load_template("aws_s3_bucket").unwrap();
    let rendered = renderer.render_jinja("aws_s3_bucket", &template, &values).unwrap();
    let filled = renderer.fill_template_values(&rendered, &values).unwrap();

    assert!(filled.starts_with("resource \"aws_s3_bucket\" \"raw\""));
    assert!(filled.contains("object_lock_enabled = true"));
    assert!(filled.contains("resource \"aws_s3_bucket_versioning\" \"raw\""));
    assert!(renderer.unresolved_placeholders(&filled).is_empty());
}

#[test]
fn test_bucket_template_requires_name() {
    let loader = TemplateLoader::new(templates_root());
    let renderer = TemplateRenderer::new();

    let values = apply_defaults(&loader, "aws_s3_bucket", config("resource_name: raw\n")).unwrap();
    let template = loader.load_template("aws_s3_bucket").unwrap();

    let err = renderer
        .render_jinja("aws_s3_bucket", &template, &values)
        .unwrap_err();
    assert!(matches!(err, TemplateError::RenderingFailed { .. }));
    assert!(err.to_string().contains("requires bucket_name"));
}

#[test]
fn test_log_exports_are_filtered() {
    let loader = TemplateLoader::new(templates_root());
    let renderer = TemplateRenderer::new();

    let values = apply_defaults(
        &loader,
        "aws_db_instance",
        config("resource_name: db\nengine: mysql\nlog_exports: [error, postgresql, error, slowquery]\n"),
    )
    .unwrap();
    let template = loader.load_template("aws_db_instance").unwrap();
    let rendered = renderer.render_jinja("aws_db_instance", &template, &values).unwrap();

    assert!(rendered.contains("enabled_cloudwatch_logs_exports = [\"error\",\"slowquery\"]"));
}

#[test]
fn test_custom_root() {
    let temp = tempdir().unwrap();
    let templates = temp.path().join(TEMPLATES_DIR);
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("custom.tf"), "value = <value>").unwrap();

    let loader = TemplateLoader::new(temp.path());
    let renderer = TemplateRenderer::new();

    let values = apply_defaults(&loader, "custom", config("value: 3\n")).unwrap();
    let filled = renderer
        .fill_template_values(&loader.load_template("custom").unwrap(), &values)
        .unwrap();

    assert_eq!(filled, "value = 3");
    assert_eq!(loader.validate().len(), 2);
}
