//! Command-line front end for the Husk `.d.ts` parser.
//!
//! Set the `HUSK_DTS_LOG` environment variable to enable tracing:
//!
//! ```bash
//! HUSK_DTS_LOG=debug husk-dts parse index.d.ts
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use husk_dts_parser::{
    classify, package_ident, parse_with_config, render_diagnostics, ParseOutput, ParserConfig,
    SourceId,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "husk-dts", version, about = "Inspect TypeScript declaration files")]
struct Cli {
    /// Parser limits file (TOML with a `[parser]` table)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a `.d.ts` file and print its AST as JSON
    Parse {
        file: PathBuf,
        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },
    /// Parse a `.d.ts` file and print its global, package and module buckets
    Classify { file: PathBuf },
    /// Print the binding identifier for a package specifier
    Ident { specifier: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HUSK_DTS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ParserConfig::load_from_path(path)?,
        None => ParserConfig::default(),
    };

    match cli.command {
        Command::Parse { file, compact } => {
            let out = parse_file(&file, config)?;
            let json = if compact {
                serde_json::to_string(&out)?
            } else {
                serde_json::to_string_pretty(&out)?
            };
            println!("{json}");
            Ok(exit_code(&out))
        }
        Command::Classify { file } => {
            let out = parse_file(&file, config)?;
            let classes = classify(&out.module);
            println!("{}", serde_json::to_string_pretty(&classes)?);
            Ok(exit_code(&out))
        }
        Command::Ident { specifier } => {
            println!("{}", package_ident(&specifier));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Read and parse `path`, rendering any diagnostics to stderr.
fn parse_file(path: &Path, config: ParserConfig) -> Result<ParseOutput> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = source.len(), "parsing");

    let out = parse_with_config(&source, SourceId(0), config);
    if !out.diagnostics.is_empty() {
        let name = path.display().to_string();
        eprint!("{}", render_diagnostics(&name, &source, &out.diagnostics));
    }
    Ok(out)
}

fn exit_code(out: &ParseOutput) -> ExitCode {
    if out.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
