//! Post-generation assets.

use std::fs;
use std::path::{Path, PathBuf};

use fs_extra::dir::CopyOptions;
use tracing::{debug, info};

use dataride_templates::ConfigMap;

use crate::context::GenerationContext;
use crate::error::{InfraError, InfraResult};
use crate::manifest::InfraManifest;

/// Follow-up documentation asset, always generated last.
pub const ACTION_REQUIRED: &str = "action_required";

/// Assets copied verbatim from the template root.
pub const STATIC_ASSETS: &[&str] = &["airflow_local", "mageai_local"];

/// An extra asset written next to the generated code.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// Rendered `action_required.md`
    ActionRequired { rendered: String },
    /// Bootstrap directory tree copied as `<destination>/<name>`
    StaticCopy { name: String, source: PathBuf },
}

impl Asset {
    /// Build the asset registered under `name`.
    pub fn from_name(
        name: &str,
        config: &ConfigMap,
        manifest: &InfraManifest,
        ctx: &GenerationContext,
    ) -> InfraResult<Self> {
        match name {
            ACTION_REQUIRED => {
                let template = ctx
                    .loader
                    .load_asset_file(ACTION_REQUIRED, &format!("{}.md", ACTION_REQUIRED))?;
                let context = manifest.render_context(config)?;
                let rendered = ctx.renderer.render_jinja(ACTION_REQUIRED, &template, &context)?;
                Ok(Self::ActionRequired { rendered })
            }
            name if STATIC_ASSETS.contains(&name) => Ok(Self::StaticCopy {
                name: name.to_string(),
                source: ctx.loader.asset_dir(name)?,
            }),
            other => Err(InfraError::configuration(
                format!("extra asset {}", other),
                format!("unknown extra asset, expected one of {}, {}", ACTION_REQUIRED, STATIC_ASSETS.join(", ")),
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ActionRequired { .. } => ACTION_REQUIRED,
            Self::StaticCopy { name, .. } => name,
        }
    }

    pub fn save(&self, destination: &Path) -> InfraResult<()> {
        match self {
            Self::ActionRequired { rendered } => {
                let path = destination.join(format!("{}.md", ACTION_REQUIRED));
                if path.exists() {
                    return Err(InfraError::DestinationConflict(path));
                }
                info!("Preparing {}", path.display());
                fs::write(path, rendered)?;
            }
            Self::StaticCopy { name, source } => {
                let target = destination.join(name);
                if target.exists() {
                    return Err(InfraError::DestinationConflict(target));
                }
                info!("Preparing {} local environment", name);
                debug!("Copying {:?} to {:?}", source, target);
                fs_extra::dir::copy(source, destination, &CopyOptions::new())?;
            }
        }
        Ok(())
    }
}
