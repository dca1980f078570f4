use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use wpd_convert::api::{self, ConvertResponse, NOTHING_FOUND};
use wpd_convert::convert_engine::{ConfigBuilder, ConversionOutcome, ConvertEngine};
use wpd_convert::converter::Converter;
use wpd_convert::tui;

#[derive(Parser)]
#[command(
    name = "wpd-convert",
    version,
    about = "Convert WordPerfect (.wpd) files to Word (.docx) with LibreOffice"
)]
struct Cli {
    /// LibreOffice binary to use instead of searching for one
    #[arg(long, global = true, env = "WPD_CONVERT_SOFFICE")]
    soffice: Option<PathBuf>,

    /// Seconds to wait for each conversion
    #[arg(
        long,
        global = true,
        env = "WPD_CONVERT_TIMEOUT",
        default_value_t = 120,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a file or every .wpd file in a folder
    Convert {
        /// A .wpd file or a folder containing .wpd files
        path: String,

        /// Also search sub-folders
        #[arg(short, long)]
        recursive: bool,

        /// Put output in a "Converted" folder next to each file
        #[arg(short, long, conflicts_with = "dest")]
        organize: bool,

        /// Put all output under this folder
        #[arg(short, long)]
        dest: Option<String>,

        /// Mirror the source folder structure under --dest
        #[arg(long, requires = "dest")]
        retain_structure: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open the interactive terminal UI
    Tui {
        /// Pre-fill the source path
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit 1 like other invalid options; 2 is kept for failed files.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Some(Commands::Convert { path, recursive, organize, dest, retain_structure, json }) => {
            init_logging();
            let converter = Converter::locate(cli.soffice.as_deref())?.with_timeout(timeout);
            tracing::info!("Using converter {}", converter.program().display());

            if json {
                let opts = api::ConvertOptions {
                    recursive,
                    dest_type: match (&dest, organize) {
                        (Some(_), _) => api::DestType::Custom,
                        (None, true) => api::DestType::Converted,
                        (None, false) => api::DestType::Same,
                    },
                    dest_path: dest.unwrap_or_default(),
                    preserve: retain_structure,
                };
                let response = api::convert_request(&path, &opts, &converter).await;
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(exit_code_for(&response));
            }

            let config = ConfigBuilder::new()
                .source(api::expand_path(&path))
                .recursive(recursive)
                .organize(organize)
                .destination(dest.as_deref().map(api::expand_path))
                .preserve_structure(retain_structure)
                .build()
                .context("Invalid options")?;

            convert_cli(ConvertEngine::new(config, converter)).await
        }
        Some(Commands::Tui { path }) => {
            run_tui(path, cli.soffice, timeout).await?;
            Ok(ExitCode::SUCCESS)
        }
        None => {
            run_tui(None, cli.soffice, timeout).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

async fn run_tui(path: Option<String>, soffice: Option<PathBuf>, timeout: Duration) -> Result<()> {
    // A missing converter is reported inside the UI, not before it opens.
    let converter = Converter::locate(soffice.as_deref())
        .map(|c| c.with_timeout(timeout))
        .map_err(|e| e.to_string());
    tui::run_tui(path, converter).await
}

fn exit_code_for(response: &ConvertResponse) -> ExitCode {
    if response.stats.failed > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

async fn convert_cli(engine: ConvertEngine) -> Result<ExitCode> {
    println!("WordPerfect → Word Converter");
    println!("============================");

    let files = engine.scan();
    let total = files.len();
    if total == 0 {
        println!("{NOTHING_FOUND}");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Converting {total} file(s)...\n");

    let report = engine
        .convert_files(&files, |index, result| {
            let name = result
                .source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let prefix = format!("[{}/{}] → {}", index + 1, total, name);
            match &result.outcome {
                ConversionOutcome::Converted => println!("{prefix}  ✓"),
                ConversionOutcome::Skipped => println!("{prefix}  (skipped, already converted)"),
                ConversionOutcome::Failed(e) => {
                    println!("{prefix}  failed");
                    println!("    {e}");
                }
            }
        })
        .await;

    let stats = report.stats;
    println!();
    println!("============================");
    println!(
        "Summary: {} total, {} converted, {} skipped, {} failed",
        stats.total, stats.successful, stats.skipped, stats.failed
    );

    if stats.failed == 0 && stats.successful + stats.skipped == stats.total {
        println!("✓ All files converted successfully!");
        Ok(ExitCode::SUCCESS)
    } else if stats.successful + stats.skipped > 0 {
        println!("⚠ Some files were converted, but there were errors with others.");
        Ok(ExitCode::from(2))
    } else {
        println!("✗ No files were converted.");
        Ok(ExitCode::from(2))
    }
}
