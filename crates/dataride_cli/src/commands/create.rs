//! Create command - Generate infrastructure code from a config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, ValueEnum};
use tracing::{info, warn};

use dataride_core::{FormatOutcome, GenerationContext, GeneratorSettings, Infra, NamingStrategy};
use dataride_templates::TemplateLoader;

/// Naming strategy for resources without `resource_name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    /// `<type>_<random number>`
    Random,
    /// `<type>_<k>`, deterministic across runs
    Sequential,
}

impl From<NamingArg> for NamingStrategy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Random => NamingStrategy::Random,
            NamingArg::Sequential => NamingStrategy::Sequential,
        }
    }
}

#[derive(Args)]
pub struct CreateArgs {
    /// Path to the YAML config file
    #[arg(short = 'c', long = "config")]
    pub config_path: PathBuf,

    /// Directory to generate into (must not exist)
    #[arg(short, long)]
    pub destination: PathBuf,

    /// Run `terraform fmt` over the generated code
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub fmt: bool,

    /// Directory holding infra_templates/, infra_defaults/ and extra_assets/
    #[arg(long, env = "DATARIDE_TEMPLATES", default_value = ".")]
    pub templates_root: PathBuf,

    /// Naming strategy for resources without `resource_name`
    #[arg(long, value_enum, default_value_t = NamingArg::Random)]
    pub naming: NamingArg,

    /// Also write manifest.yaml into the destination
    #[arg(long)]
    pub write_manifest: bool,
}

pub fn execute(args: CreateArgs, quiet: bool) -> Result<()> {
    info!("Generating infrastructure from {:?}", args.config_path);

    let loader = TemplateLoader::new(&args.templates_root);
    for problem in loader.validate() {
        warn!("{}", problem);
    }

    let settings = GeneratorSettings::default()
        .with_templates_root(&args.templates_root)
        .with_naming(args.naming.into());

    let mut infra = Infra::from_file(
        &args.config_path,
        &args.destination,
        GenerationContext::new(&settings),
    )
    .context("Failed to load infrastructure config")?;

    infra.process_modules().context("Failed to process modules")?;
    infra.process_resources().context("Failed to process resources")?;
    infra
        .process_environments()
        .context("Failed to process environments")?;
    infra
        .process_extra_assets()
        .context("Failed to process extra assets")?;

    infra.save().context("Failed to save infrastructure code")?;

    if args.write_manifest {
        infra.write_manifest().context("Failed to write manifest")?;
    }

    let formatted = match infra.format_code(args.fmt) {
        FormatOutcome::Formatted(_) => "formatted",
        FormatOutcome::Skipped => "not formatted",
        FormatOutcome::Failed(_) => "formatting failed",
    };

    if !quiet {
        println!("✅ Infrastructure generated successfully!");
        println!();
        println!("Location: {:?}", infra.destination());
        println!(
            "Modules: {}, resources: {}, environments: {}, extra assets: {} ({})",
            infra.modules().len(),
            infra.resources().count(),
            infra.environments().len(),
            infra.extra_assets().len(),
            formatted
        );
        println!();
        println!("Next steps:");
        println!("  Read {:?}", infra.destination().join("action_required.md"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn create_args(argv: &[&str]) -> CreateArgs {
        let mut full = vec!["dataride", "create"];
        full.extend_from_slice(argv);
        let Commands::Create(args) = Cli::parse_from(full).command;
        args
    }

    #[test]
    fn test_defaults() {
        let args = create_args(&["-c", "platform.yaml", "-d", "out"]);
        assert!(args.fmt);
        assert_eq!(args.naming, NamingArg::Random);
        assert!(!args.write_manifest);
    }

    #[test]
    fn test_fmt_can_be_disabled() {
        let args = create_args(&["-c", "platform.yaml", "-d", "out", "--fmt", "false", "--naming", "sequential"]);
        assert!(!args.fmt);
        assert_eq!(NamingStrategy::from(args.naming), NamingStrategy::Sequential);
    }

    #[test]
    fn test_execute_generates_tree() {
        let temp = tempfile::tempdir().unwrap();
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = temp.path().join("platform.yaml");
        std::fs::write(
            &config,
            "providers:\n  - aws:\n      region: eu-west-1\nresources:\n  - aws_glue_catalog_database:\n      resource_name: lake\nenvironments:\n  dev:\n",
        )
        .unwrap();

        let args = CreateArgs {
            config_path: config,
            destination: temp.path().join("out"),
            fmt: false,
            templates_root: root,
            naming: NamingArg::Sequential,
            write_manifest: true,
        };
        execute(args, true).unwrap();

        assert!(temp.path().join("out/modules/main/main.tf").is_file());
        assert!(temp.path().join("out/dev/main.tf").is_file());
        assert!(temp.path().join("out/manifest.yaml").is_file());
    }
}
