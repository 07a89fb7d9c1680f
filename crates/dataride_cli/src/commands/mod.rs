//! CLI command definitions.

use clap::{Parser, Subcommand};

pub mod create;

/// dataride - declarative data platform infrastructure generator
#[derive(Parser)]
#[command(name = "dataride")]
#[command(version, about = "dataride - generate Terraform code for a data platform from YAML")]
#[command(long_about = r#"
dataride turns a YAML description of a data platform into Terraform modules,
environments and onboarding documents.

WORKFLOWS:
  create        → Generate the infrastructure code into a new directory

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Template error
  5 - Destination conflict
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate infrastructure code from a config file
    Create(create::CreateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::parse_from(["dataride", "-v", "create", "-c", "platform.yaml", "-d", "out"]);
        assert!(cli.verbose);
        let Commands::Create(args) = cli.command;
        assert_eq!(args.config_path.to_str(), Some("platform.yaml"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["dataride", "-v", "-q", "create", "-c", "a.yaml", "-d", "out"]);
        assert!(result.is_err());
    }
}
