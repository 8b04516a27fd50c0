#![recursion_limit = "256"]

pub mod args;
pub mod config;
pub mod errors;
#[cfg(feature = "js")]
pub mod js_config;
pub mod logging;
pub mod manifest;
pub mod resolver;
pub mod theme;

pub use args::{CheckArgs, Cli, Commands, ResolveArgs};
pub use config::{ColorValue, ExtendSpec, ThemeConfig, ThemeSpec};
pub use errors::{Result, ThemeError};
pub use manifest::{ManifestBuilder, ResolutionManifest};
pub use resolver::{
    resolve_theme, resolve_with_changes, ChangeKind, Resolution, ThemeChange, ThemeResolver,
};
pub use theme::{BaseTheme, ResolvedTheme, Theme};

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of the resolve command
#[derive(Debug)]
pub struct ResolveOutcome {
    /// Config after layering presets
    pub config: ThemeConfig,
    pub resolution: Resolution,
    pub manifest: ResolutionManifest,
    /// Serialized resolved theme, pretty or compact per `--minify`
    pub theme_json: String,
}

/// Outcome of checking one config file
#[derive(Debug)]
pub struct CheckReport {
    pub path: PathBuf,
    pub result: Result<ThemeConfig>,
}

impl CheckReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Load presets and config, resolve against the base theme and write the
/// requested outputs. The resolved theme is only written when `output` is set;
/// callers print `theme_json` otherwise.
pub fn resolve(args: &ResolveArgs) -> Result<ResolveOutcome> {
    args.validate().map_err(ThemeError::InvalidInput)?;

    let mut config = ThemeConfig::default();
    for preset in &args.presets {
        debug!(preset = %preset.display(), "layering preset");
        config = config.merge(ThemeConfig::from_file(preset)?);
    }
    config = config.merge(ThemeConfig::from_file(&args.config)?);

    let base = match &args.base {
        Some(path) => Theme::from_file(path)?,
        None => Theme::tailwind_default(),
    };
    info!(
        config = %args.config.display(),
        presets = args.presets.len(),
        base_sections = base.len(),
        "resolving theme"
    );

    let resolution = ThemeResolver::new(base).resolve(&config)?;

    let mut builder = ManifestBuilder::new()
        .with_config_source(args.config.display().to_string())
        .with_presets(args.presets.iter().map(|p| p.display().to_string()).collect())
        .with_config(&config)
        .with_resolution(&resolution);
    if let Some(base) = &args.base {
        builder = builder.with_base_theme(base.display().to_string());
    }
    let manifest = builder.build();

    let theme_json = if args.minify {
        resolution.theme.to_compact_json()?
    } else {
        resolution.theme.to_pretty_json()?
    };

    if let Some(output) = &args.output {
        write_output(output, &theme_json)?;
    }
    if let Some(path) = &args.manifest {
        let manifest_json = if args.minify {
            manifest.to_compact_json()?
        } else {
            manifest.to_pretty_json()?
        };
        write_output(path, &manifest_json)?;
    }

    info!(
        changes = resolution.changes.len(),
        changed = resolution.changed_paths().len(),
        "theme resolved"
    );

    Ok(ResolveOutcome {
        config,
        resolution,
        manifest,
        theme_json,
    })
}

/// Load and validate every config in parallel. Per-file failures are
/// reported, not propagated.
pub fn check(args: &CheckArgs) -> Result<Vec<CheckReport>> {
    use rayon::prelude::*;

    args.validate().map_err(ThemeError::InvalidInput)?;

    let run = || {
        args.configs
            .par_iter()
            .map(|path| {
                let result = ThemeConfig::load(path);
                if let Err(e) = &result {
                    warn!(path = %path.display(), error = %e, "config rejected");
                }
                CheckReport {
                    path: path.clone(),
                    result,
                }
            })
            .collect::<Vec<_>>()
    };

    let reports = match args.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| ThemeError::InvalidInput(format!("Failed to build thread pool: {}", e)))?
            .install(run),
        None => run(),
    };

    Ok(reports)
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    write_atomic(path, content).map_err(|e| ThemeError::OutputError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Write file atomically by writing to temp file then renaming. The temp
/// file is removed if any step fails.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = std::fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&temp_path, path)
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}
