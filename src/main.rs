use anyhow::Context;
use clap::Parser;
use tailwind_theme::logging::init_logging;
use tailwind_theme::{check, resolve, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose()).context("Failed to set up logging")?;

    match cli.command {
        Commands::Resolve(args) => {
            let outcome = resolve(&args)
                .with_context(|| format!("Failed to resolve {}", args.config.display()))?;

            if args.output.is_none() {
                println!("{}", outcome.theme_json);
            } else {
                eprintln!("Resolved theme written");
                eprintln!("  - {} sections", outcome.resolution.theme.len());
                eprintln!("  - {} paths changed", outcome.resolution.changed_paths().len());
            }
            Ok(())
        }
        Commands::Check(args) => {
            let reports = check(&args)?;
            let mut failed = 0;
            for report in &reports {
                match &report.result {
                    Ok(_) => println!("ok    {}", report.path.display()),
                    Err(e) => {
                        failed += 1;
                        println!("error {}: {}", report.path.display(), e);
                    }
                }
            }

            if failed > 0 {
                eprintln!("{} of {} configs failed", failed, reports.len());
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
