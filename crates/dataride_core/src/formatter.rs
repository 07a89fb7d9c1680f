//! Best-effort Terraform formatting.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::settings::DEFAULT_FORMATTER;

/// Result of a Terraform invocation.
#[derive(Debug)]
pub struct TerraformResult {
    pub success: bool,
    pub output: String,
    pub exit_code: i32,
}

/// What happened when formatting was requested.
#[derive(Debug)]
pub enum FormatOutcome {
    /// Formatting disabled, or nothing to format
    Skipped,
    Formatted(TerraformResult),
    /// The formatter could not run or reported an error
    Failed(String),
}

impl FormatOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Runs `terraform fmt` over generated code.
#[derive(Debug, Clone)]
pub struct TerraformFormatter {
    binary: String,
}

impl Default for TerraformFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerraformFormatter {
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_FORMATTER.to_string(),
        }
    }

    /// Set a custom formatter binary.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Format every `.tf` file under `working_dir`. Failures are logged, never raised.
    pub fn fmt(&self, working_dir: &Path) -> FormatOutcome {
        let files = count_tf_files(working_dir);
        if files == 0 {
            debug!("No Terraform files under {:?}, skipping fmt", working_dir);
            return FormatOutcome::Skipped;
        }

        info!("Running terraform fmt in {:?} ({} files)", working_dir, files);
        match self.run_command(working_dir, &["fmt", "-recursive", "-list=false"]) {
            Ok(result) if result.success => FormatOutcome::Formatted(result),
            Ok(result) => {
                warn!(
                    "terraform fmt exited with code {}: {}",
                    result.exit_code,
                    result.output.trim()
                );
                FormatOutcome::Failed(format!("exit code {}: {}", result.exit_code, result.output.trim()))
            }
            Err(e) => {
                warn!("Could not run {}: {}", self.binary, e);
                FormatOutcome::Failed(format!("{}: {}", self.binary, e))
            }
        }
    }

    fn run_command(&self, target: &Path, args: &[&str]) -> std::io::Result<TerraformResult> {
        debug!("Executing {} {:?} {:?}", self.binary, args, target);

        let output = Command::new(&self.binary).args(args).arg(target).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(TerraformResult {
            success: output.status.success(),
            output: combined,
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

fn count_tf_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().map_or(false, |ext| ext == "tf"))
        .count()
}
