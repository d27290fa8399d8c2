use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::engine::Engine;
use crate::expr::Val;
use crate::types::Event;

#[derive(Parser)]
#[command(name = "textree")]
#[command(about = "Textree - executes directives embedded in tree event streams", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (overrides config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a JSON-lines event stream
    Run {
        /// Input file (default: stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// JSON object whose entries seed the variable scope
        #[arg(long = "vars")]
        vars: Option<PathBuf>,

        /// Directive prefix (overrides config)
        #[arg(long = "prefix")]
        prefix: Option<String>,
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

fn run_cli_with_args(cli: Cli) -> Result<()> {
    let prefix = match &cli.command {
        Commands::Run { prefix, .. } => prefix.clone(),
        Commands::Config => None,
    };

    // Eagerly load and validate configuration before touching any stream
    let config = Config::builder()
        .config_path(cli.config)
        .log_level(cli.log_level)
        .directive_prefix(prefix)
        .build()
        .context("Failed to load configuration")?;

    init_logging(&config);

    match cli.command {
        Commands::Run {
            input, output, vars, ..
        } => run_stream(&config, input.as_deref(), output.as_deref(), vars.as_deref()),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run_stream(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    vars: Option<&Path>,
) -> Result<()> {
    let mut engine = Engine::new(config.engine.clone());
    if let Some(path) = vars {
        seed_scope(&mut engine, path)?;
    }

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut count = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("Invalid event on line {}", idx + 1))?;
        engine
            .submit(event)
            .with_context(|| format!("Processing failed at line {}", idx + 1))?;
        count += write_events(&mut writer, engine.take_output())?;
    }

    engine.finish().context("Input ended early")?;
    count += write_events(&mut writer, engine.take_output())?;
    writer.flush()?;

    info!(events = count, "stream processed");
    Ok(())
}

fn write_events(writer: &mut dyn Write, events: Vec<Event>) -> Result<usize> {
    let count = events.len();
    for event in events {
        serde_json::to_writer(&mut *writer, &event)?;
        writeln!(writer)?;
    }
    Ok(count)
}

fn seed_scope(engine: &mut Engine, path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let vars: JsonValue = serde_json::from_str(&source)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let JsonValue::Object(entries) = vars else {
        return Err(anyhow!("{} must contain a JSON object", path.display()));
    };
    for (name, value) in &entries {
        debug!(%name, "seeding variable");
        engine.scope_mut().set(name.clone(), Val::from(value));
    }
    Ok(())
}
