//! Randoop CLI - Command-line interface for the operation model
//!
//! Provides subcommands for enumerating operations, validating persisted
//! operations, and rendering or executing persisted sequences.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use randoop::junit::JUnitWriter;
use randoop::sequence::LoggingVisitor;
use randoop::{ClassCatalog, RandoopConfig, Sequence, Session};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "randoop")]
#[command(about = "Typed operations and sequence execution for random test generation", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the operations of a class
    Ops {
        /// Binary class name
        class: String,
    },

    /// Parse every operation line of a file and check it round-trips
    Check {
        /// File with one `TAG : description` per line
        file: PathBuf,
    },

    /// Print a persisted sequence as Java code
    Code {
        /// Persisted sequence file
        file: PathBuf,
    },

    /// Execute a persisted sequence and print each outcome
    Run {
        /// Persisted sequence file
        file: PathBuf,
    },

    /// Execute persisted sequences and print a JUnit test class
    Junit {
        /// Persisted sequence files, one test each
        files: Vec<PathBuf>,

        /// Name of the generated class
        #[arg(long, default_value = "RegressionTest")]
        class_name: String,

        /// Package of the generated class
        #[arg(long)]
        package: Option<String>,
    },

    /// Write the default configuration
    InitConfig {
        /// Destination file
        path: PathBuf,
    },
}

fn read_sequence(session: &Session, path: &Path) -> Result<Sequence> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    session
        .parse_sequence(&text)
        .with_context(|| format!("Failed to parse sequence in {:?}", path))
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RandoopConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => RandoopConfig::default(),
    };
    let session = Session::new(ClassCatalog::new().snapshot(), config);

    match cli.command {
        Commands::Ops { class } => {
            let operations = session.operations_for_class(&class);
            if operations.is_empty() {
                bail!("No operations for class {}", class);
            }
            for op in operations {
                if op.operation().is_parsable() {
                    println!("{}", op.to_parsable_string());
                } else {
                    println!("{}", op);
                }
            }
        }

        Commands::Check { file } => {
            let text = fs::read_to_string(&file).with_context(|| format!("Failed to read {:?}", file))?;
            let parser = session.parser();
            let mut failures = 0;
            for (number, line) in text.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match parser.parse(line) {
                    Ok(op) => parser.check_round_trip(&op)?,
                    Err(err) => {
                        failures += 1;
                        println!("{}:{}: {}", file.display(), number + 1, err);
                    }
                }
            }
            if failures > 0 {
                bail!("{} malformed operations", failures);
            }
            println!("All operations parsed");
        }

        Commands::Code { file } => {
            let sequence = read_sequence(&session, &file)?;
            print!("{}", sequence.to_code_string(session.config().inline_literals));
        }

        Commands::Run { file } => {
            let sequence = read_sequence(&session, &file)?;
            let executed = session.execute(sequence, &mut LoggingVisitor)?;
            for (index, outcome) in executed.results().iter().enumerate() {
                println!("  {}: {}", index, outcome);
            }
            if executed.has_non_executed_statements() {
                println!(
                    "Stopped after {} of {} statements",
                    executed.executed_size(),
                    executed.sequence().len()
                );
            }
        }

        Commands::Junit {
            files,
            class_name,
            package,
        } => {
            let mut tests = Vec::with_capacity(files.len());
            for file in &files {
                let sequence = read_sequence(&session, file)?;
                tests.push(session.execute(sequence, &mut LoggingVisitor)?);
            }
            let mut writer = JUnitWriter::new(class_name)
                .with_inline_literals(session.config().inline_literals);
            if let Some(package) = package {
                writer = writer.with_package(package);
            }
            print!("{}", writer.render(&tests));
        }

        Commands::InitConfig { path } => {
            RandoopConfig::default().save(&path)?;
            println!("Wrote default configuration to {:?}", path);
        }
    }

    Ok(())
}
