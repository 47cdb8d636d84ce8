use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::engine::{json_to_val, val_to_json, Block, Driver, Val};
use crate::snapshot::Envelope;

#[derive(Parser)]
#[command(name = "continuable")]
#[command(about = "Continuable - run block programs as resumable state machines", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start a program and run it to its first suspension
    Run {
        /// Program file (JSON block tree)
        program: PathBuf,

        /// Resume with this value (JSON) after each suspension; repeatable
        #[arg(short = 'r', long = "resume")]
        resume: Vec<String>,

        /// Write a snapshot of the final state here
        #[arg(short = 's', long = "save")]
        save: Option<PathBuf>,
    },

    /// Resume a snapshot with a value
    Resume {
        /// Snapshot file
        snapshot: PathBuf,

        /// Value (JSON) returned from the pending suspend call
        #[arg(default_value = "null")]
        value: String,

        /// Write the new snapshot here (defaults to overwriting the input).
        /// A completed program leaves a snapshot that cannot be resumed again.
        #[arg(short = 's', long = "save")]
        save: Option<PathBuf>,
    },

    /// Show snapshot metadata
    Inspect {
        /// Snapshot file
        snapshot: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

/// Internal function that handles CLI commands
fn run_cli_with_args(cli: Cli) -> Result<()> {
    // Load configuration before executing any command so config errors show first
    let config = Config::load_from(cli.config.as_deref())?;
    init_logging(&config);

    match cli.command {
        Commands::Run {
            program,
            resume,
            save,
        } => {
            let source = std::fs::read_to_string(&program)
                .with_context(|| format!("Failed to read program {}", program.display()))?;
            let block: Block = serde_json::from_str(&source)
                .with_context(|| format!("Failed to parse program {}", program.display()))?;

            let mut driver = Driver::with_settings(block, config.engine.clone());
            println!("Driver: {}", driver.id());

            step(&mut driver, Val::Null)?;
            for value in resume {
                if !driver.is_resumable() {
                    bail!("Program completed before all resume values were used");
                }
                step(&mut driver, parse_value(&value)?)?;
            }

            if let Some(path) = save {
                save_snapshot(&driver, &path)?;
            }
        }

        Commands::Resume {
            snapshot,
            value,
            save,
        } => {
            let bytes = std::fs::read(&snapshot)
                .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
            let mut driver = Driver::from_bytes(&bytes).context("Failed to restore snapshot")?;

            if !driver.is_resumable() {
                bail!("Snapshot {} holds a completed program", snapshot.display());
            }
            step(&mut driver, parse_value(&value)?)?;

            save_snapshot(&driver, save.as_deref().unwrap_or(&snapshot))?;
        }

        Commands::Inspect { snapshot } => {
            let bytes = std::fs::read(&snapshot)
                .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
            let envelope = Envelope::decode(&bytes).context("Invalid snapshot")?;

            println!("Driver: {}", envelope.driver_id);
            println!("Format: {}", envelope.format);
            println!("Created: {}", envelope.created_at);
            println!("Digest: {}", envelope.digest);
            println!("Resumable: {}", envelope.is_resumable()?);
            println!("State size: {} bytes", envelope.state.len());
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // A subscriber may already be installed by an embedding application
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_value(raw: &str) -> Result<Val> {
    let json: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("Invalid JSON value: {}", raw))?;
    Ok(json_to_val(&json))
}

/// Run one suspend-to-resume interval and report it
fn step(driver: &mut Driver, value: Val) -> Result<()> {
    let result = driver.run(value).context("Program failed")?;
    let rendered = serde_json::to_string(&val_to_json(&result))?;

    if driver.is_resumable() {
        println!("Suspended: {}", rendered);
    } else {
        println!("Completed: {}", rendered);
    }
    Ok(())
}

/// Write the driver's state to `path`. A completed driver replaces any
/// suspended snapshot there with one that cannot be resumed.
fn save_snapshot(driver: &Driver, path: &Path) -> Result<()> {
    let bytes = driver.to_bytes().context("Failed to serialize driver")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;

    if driver.is_resumable() {
        println!("✓ Snapshot saved: {}", path.display());
    } else {
        println!(
            "✓ Program completed, final snapshot saved: {}",
            path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const PROGRAM: &str = r#"{
        "t": "Return",
        "value": {
            "t": "Binary",
            "op": "Add",
            "lhs": {
                "t": "Call",
                "callee": { "t": "Local", "name": "suspend" },
                "args": [{ "t": "Const", "v": { "t": "Num", "v": 1 } }]
            },
            "rhs": { "t": "Const", "v": { "t": "Num", "v": 1 } }
        }
    }"#;

    fn temp_path(ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("continuable-cli-{}.{}", Uuid::new_v4(), ext))
    }

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("continuable")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("3").unwrap(), Val::Num(3.0));
        assert_eq!(parse_value("\"hi\"").unwrap(), Val::from("hi"));
        assert!(parse_value("not json").is_err());
    }

    #[test]
    fn test_run_save_then_resume() {
        let program = temp_path("json");
        let snapshot = temp_path("snapshot");
        std::fs::write(&program, PROGRAM).unwrap();

        run_cli_from_args(args(&[
            "run",
            program.to_str().unwrap(),
            "--save",
            snapshot.to_str().unwrap(),
        ]))
        .unwrap();

        let bytes = std::fs::read(&snapshot).unwrap();
        assert!(Envelope::decode(&bytes).unwrap().is_resumable().unwrap());

        run_cli_from_args(args(&["inspect", snapshot.to_str().unwrap()])).unwrap();
        run_cli_from_args(args(&["resume", snapshot.to_str().unwrap(), "41"])).unwrap();

        // The finished program replaces the suspended snapshot
        let after = std::fs::read(&snapshot).unwrap();
        let envelope = Envelope::decode(&after).unwrap();
        assert!(!envelope.is_resumable().unwrap());

        // so the step it completed cannot be replayed
        let replay = run_cli_from_args(args(&["resume", snapshot.to_str().unwrap(), "41"]));
        assert!(replay.is_err());

        std::fs::remove_file(&program).ok();
        std::fs::remove_file(&snapshot).ok();
    }

    #[test]
    fn test_resume_to_new_path_keeps_input() {
        let program = temp_path("json");
        let snapshot = temp_path("snapshot");
        let finished = temp_path("snapshot");
        std::fs::write(&program, PROGRAM).unwrap();

        run_cli_from_args(args(&[
            "run",
            program.to_str().unwrap(),
            "--save",
            snapshot.to_str().unwrap(),
        ]))
        .unwrap();
        run_cli_from_args(args(&[
            "resume",
            snapshot.to_str().unwrap(),
            "1",
            "--save",
            finished.to_str().unwrap(),
        ]))
        .unwrap();

        let input = Envelope::decode(&std::fs::read(&snapshot).unwrap()).unwrap();
        let output = Envelope::decode(&std::fs::read(&finished).unwrap()).unwrap();
        assert!(input.is_resumable().unwrap());
        assert!(!output.is_resumable().unwrap());
        assert_eq!(input.driver_id, output.driver_id);

        for path in [&program, &snapshot, &finished] {
            std::fs::remove_file(path).ok();
        }
    }

    #[test]
    fn test_run_with_too_many_resume_values_fails() {
        let program = temp_path("json");
        std::fs::write(&program, PROGRAM).unwrap();

        let result = run_cli_from_args(args(&[
            "run",
            program.to_str().unwrap(),
            "-r",
            "1",
            "-r",
            "2",
        ]));
        std::fs::remove_file(&program).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_program_fails() {
        let program = temp_path("json");
        assert!(run_cli_from_args(args(&["run", program.to_str().unwrap()])).is_err());
    }
}
