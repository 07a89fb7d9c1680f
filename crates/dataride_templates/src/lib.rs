//! # dataride_templates
//!
//! Template store, default merging and two-phase rendering for dataride.
//!
//! Every generated entity is built from a per-type template and a per-type
//! defaults file:
//!
//! - [`TemplateLoader`] reads `infra_templates/`, `infra_defaults/` and `extra_assets/`
//! - [`merge_defaults`] fills missing fields, input wins
//! - [`TemplateRenderer`] runs conditional templating, then typed `<field>` substitution
//!
//! ## Example
//!
//! ```rust,no_run
//! use dataride_templates::{apply_defaults, TemplateLoader, TemplateRenderer, ConfigMap};
//!
//! let loader = TemplateLoader::new(".");
//! let renderer = TemplateRenderer::new();
//!
//! let config = apply_defaults(&loader, "aws_s3_bucket", ConfigMap::new()).unwrap();
//! let template = loader.load_template("aws_s3_bucket").unwrap();
//! let rendered = renderer.render_jinja("aws_s3_bucket", &template, &config).unwrap();
//! let filled = renderer.fill_template_values(&rendered, &config).unwrap();
//! assert!(renderer.unresolved_placeholders(&filled).is_empty());
//! ```

pub mod defaults;
pub mod error;
pub mod loader;
pub mod renderer;
pub mod value;

pub use defaults::{apply_defaults, merge_defaults};
pub use error::{TemplateError, TemplateResult};
pub use loader::{TemplateLoader, ASSETS_DIR, DEFAULTS_DIR, TEMPLATES_DIR};
pub use renderer::{TemplateRenderer, TYPE_FIELD};
pub use value::{parse_mapping, variable_name, ConfigMap, ConfigValue, IS_VARIABLE_FIELD};
