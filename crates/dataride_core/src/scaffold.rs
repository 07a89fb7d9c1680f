//! Output directory scaffolding.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{InfraError, InfraResult};

pub const MODULES_DIR: &str = "modules";
pub const MAIN_TF: &str = "main.tf";
pub const VAR_TF: &str = "var.tf";

/// Writes generated code under a destination directory.
///
/// Every directory is created exclusively: an existing target is a
/// [`InfraError::DestinationConflict`] and nothing already written is rolled back.
#[derive(Debug, Clone)]
pub struct OutputScaffold {
    destination: PathBuf,
}

impl OutputScaffold {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Create the destination and its `modules/` directory.
    pub fn create_structure(&self) -> InfraResult<()> {
        info!("Creating output structure at {:?}", self.destination);

        if self.destination.exists() {
            return Err(InfraError::DestinationConflict(self.destination.clone()));
        }

        if let Some(parent) = self.destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        create_dir_exclusive(&self.destination)?;
        create_dir_exclusive(&self.destination.join(MODULES_DIR))?;
        Ok(())
    }

    /// Write `main.tf` and, when non-empty, `var.tf` into a new directory
    /// relative to the destination.
    pub fn write_unit(&self, relative: &Path, main_tf: &str, var_tf: &str) -> InfraResult<PathBuf> {
        let dir = self.destination.join(relative);
        create_dir_exclusive(&dir)?;

        fs::write(dir.join(MAIN_TF), main_tf)?;
        if !var_tf.is_empty() {
            fs::write(dir.join(VAR_TF), var_tf)?;
        }

        Ok(dir)
    }
}

fn create_dir_exclusive(path: &Path) -> InfraResult<()> {
    match fs::create_dir(path) {
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Err(InfraError::DestinationConflict(path.to_path_buf()))
        }
        other => Ok(other?),
    }
}
