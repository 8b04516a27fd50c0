use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tailwind theme resolver - merges project theme overrides into a base theme
#[derive(Parser, Debug)]
#[command(name = "tailwind-theme")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Resolve(args) => args.verbose,
            Commands::Check(args) => args.verbose,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a config against a base theme and print the resolved theme
    Resolve(ResolveArgs),
    /// Validate the shape of one or more config files
    Check(CheckArgs),
}

/// Arguments for the resolve command
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// Project configuration file
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        required = true,
        help = "Config file (.js, .cjs, .mjs, .json, .yaml or .yml)"
    )]
    pub config: PathBuf,

    /// Preset configs layered underneath the project config
    #[arg(
        short = 'p',
        long = "preset",
        value_name = "PATH",
        num_args = 0..,
        help = "Preset config files, applied in order before the project config"
    )]
    pub presets: Vec<PathBuf>,

    /// Base theme file
    #[arg(
        short = 'b',
        long = "base",
        value_name = "PATH",
        help = "Base theme (JSON or YAML); defaults to the bundled Tailwind theme"
    )]
    pub base: Option<PathBuf>,

    /// Output path for the resolved theme
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Where to write the resolved theme JSON (stdout when omitted)"
    )]
    pub output: Option<PathBuf>,

    /// Output manifest file path (JSON)
    #[arg(
        short = 'm',
        long = "manifest",
        value_name = "PATH",
        help = "Where to write the resolution manifest JSON"
    )]
    pub manifest: Option<PathBuf>,

    /// Compact JSON output
    #[arg(
        long = "minify",
        default_value_t = false,
        help = "Write compact JSON instead of pretty-printed JSON"
    )]
    pub minify: bool,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Config files to validate
    #[arg(value_name = "CONFIG", required = true, num_args = 1..)]
    pub configs: Vec<PathBuf>,

    /// Number of parallel threads to use
    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "NUM",
        help = "Number of parallel threads to use (defaults to number of CPU cores)"
    )]
    pub jobs: Option<usize>,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,
}

impl ResolveArgs {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(output), Some(manifest)) = (&self.output, &self.manifest) {
            if output == manifest {
                return Err("Output and manifest paths must be different".to_string());
            }
        }

        if self.presets.contains(&self.config) {
            return Err(format!(
                "{} is given both as config and as preset",
                self.config.display()
            ));
        }

        Ok(())
    }
}

impl CheckArgs {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.configs.is_empty() {
            return Err("At least one config file must be provided".to_string());
        }

        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err("Number of jobs must be at least 1".to_string());
            }
        }

        Ok(())
    }
}
