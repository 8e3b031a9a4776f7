//! SurrealQL schema generator CLI.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, WrapErr};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use surql_compiler::{Generator, GeneratorConfig};

mod ui;

#[derive(Parser)]
#[command(name = "surqlgen")]
#[command(version, about = "Compile data model manifests to SurrealQL schema definitions")]
struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate SDL and print it or write it to a file
    Generate {
        /// Manifest describing models and tables
        #[arg(short, long, default_value = "surql.json")]
        manifest: PathBuf,

        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a manifest without writing anything
    Check {
        /// Manifest describing models and tables
        #[arg(short, long, default_value = "surql.json")]
        manifest: PathBuf,
    },

    /// Regenerate the output file whenever the manifest changes
    Watch {
        /// Manifest describing models and tables
        #[arg(short, long, default_value = "surql.json")]
        manifest: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Generate { manifest, output } => generate(manifest, output),
        Commands::Check { manifest } => check(manifest),
        Commands::Watch { manifest, output } => watch(manifest, output),
    }
}

/// Logs go to stderr so SDL printed on stdout stays clean.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("surql_compiler={level},surqlgen={level}")));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn generate(manifest: PathBuf, output: Option<PathBuf>) -> miette::Result<()> {
    let to_stdout = output.is_none();
    let generator = Generator::new(GeneratorConfig {
        manifest_path: manifest,
        out_path: output,
    });

    let start = Instant::now();
    let result = generator.generate()?;

    if to_stdout {
        println!("{}", result.sdl);
    } else if let Some(out_path) = &generator.config().out_path {
        ui::success(&format!(
            "Wrote {} table(s), {} field(s) to {}",
            result.tables,
            result.fields,
            out_path.display()
        ));
        ui::timing("Generated", start.elapsed().as_millis());
    }
    Ok(())
}

fn check(manifest: PathBuf) -> miette::Result<()> {
    let spinner = ui::spinner(&format!("Checking {}", manifest.display()));
    let generator = Generator::new(GeneratorConfig {
        manifest_path: manifest,
        out_path: None,
    });

    match generator.check() {
        Ok(result) => {
            spinner.finish_and_clear();
            ui::looking_good();
            ui::summary(result.tables, result.analyzers, result.fields);
            Ok(())
        }
        Err(err) => {
            spinner.finish_and_clear();
            ui::nope_header();
            Err(err.into())
        }
    }
}

fn watch(manifest: PathBuf, output: PathBuf) -> miette::Result<()> {
    let generator = Generator::new(GeneratorConfig {
        manifest_path: manifest.clone(),
        out_path: Some(output),
    });

    ui::info(&format!("Watching {}", manifest.display()));
    regenerate(&generator);

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)
        .into_diagnostic()
        .wrap_err("Failed to create file watcher")?;

    // Watch the directory so editors that replace the file are still seen.
    let watch_dir = watch_dir(&manifest);
    debouncer
        .watcher()
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to watch {}", watch_dir.display()))?;

    let file_name = manifest.file_name().map(|n| n.to_os_string());
    for result in rx {
        match result {
            Ok(events) => {
                let touched = events
                    .iter()
                    .any(|event| event.path.file_name().map(|n| n.to_os_string()) == file_name);
                if touched {
                    regenerate(&generator);
                } else {
                    debug!(events = events.len(), "ignoring unrelated changes");
                }
            }
            Err(err) => ui::error(&format!("Watch error: {}", err)),
        }
    }

    ui::dim("Stopping watch mode.");
    Ok(())
}

fn watch_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Runs one generation, reporting failures without stopping the watch loop.
fn regenerate(generator: &Generator) {
    let spinner = ui::spinner("Generating schema...");
    let start = Instant::now();
    match generator.generate() {
        Ok(result) => {
            spinner.finish_and_clear();
            ui::success(&format!(
                "Generated {} table(s), {} field(s) in {}ms",
                result.tables,
                result.fields,
                start.elapsed().as_millis()
            ));
        }
        Err(err) => {
            spinner.finish_and_clear();
            let report: miette::Report = err.into();
            ui::error(&format!("{:?}", report));
        }
    }
}
