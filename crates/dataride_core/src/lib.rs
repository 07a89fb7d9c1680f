//! # dataride_core
//!
//! Configuration composition and Terraform synthesis for dataride.
//!
//! A YAML description of a data platform is turned into Terraform modules,
//! environments and onboarding assets:
//!
//! - [`Resource`] merges defaults, extracts [`Variable`]s and renders its template
//! - [`Module`] aggregates resources and de-duplicates their variables
//! - [`Environment`] renders root code referencing every module and provider
//! - [`Asset`] covers post-generation documents and bootstrap trees
//! - [`Infra`] orchestrates the phases and folds results into an [`InfraManifest`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use dataride_core::{GenerationContext, GeneratorSettings, Infra, NamingStrategy};
//!
//! let settings = GeneratorSettings::default()
//!     .with_templates_root(".")
//!     .with_naming(NamingStrategy::Sequential);
//!
//! let mut infra = Infra::from_file(
//!     Path::new("platform.yaml"),
//!     "./generated",
//!     GenerationContext::new(&settings),
//! )
//! .unwrap();
//!
//! infra.process_all().unwrap();
//! infra.save().unwrap();
//! infra.format_code(true);
//! ```

pub mod asset;
pub mod config;
pub mod context;
pub mod environment;
pub mod error;
pub mod formatter;
pub mod infra;
pub mod manifest;
pub mod module;
pub mod naming;
pub mod provider;
pub mod resource;
pub mod scaffold;
pub mod settings;
pub mod variable;

#[cfg(test)]
mod testing;

pub use asset::{Asset, ACTION_REQUIRED, STATIC_ASSETS};
pub use config::{load_config, InfraConfig, ModuleEntry, ResourceEntry};
pub use context::GenerationContext;
pub use environment::Environment;
pub use error::{ErrorKind, InfraError, InfraResult};
pub use formatter::{FormatOutcome, TerraformFormatter, TerraformResult};
pub use infra::Infra;
pub use manifest::{InfraManifest, ResourceRecord, MANIFEST_FILE};
pub use module::{Module, ModuleSummary};
pub use naming::{NameGenerator, NamingStrategy};
pub use provider::{CloudProvider, Provider};
pub use resource::{Resource, DEFAULT_MODULE};
pub use scaffold::OutputScaffold;
pub use settings::GeneratorSettings;
pub use variable::Variable;
