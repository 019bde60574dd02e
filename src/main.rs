mod batch;
mod error;
mod export;
mod fetch;
mod parser;
mod record;
mod settings;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use settings::Settings;

#[derive(Parser)]
#[command(name = "oath_scraper", about = "Oaths in Archaic and Classical Greece: page scraper and extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract records from a cached page or a directory of pages, as NDJSON
    Extract {
        /// An .html file or a directory of them
        path: PathBuf,
        /// Write NDJSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write a flattened CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Download oath pages into the cache directory
    Fetch {
        #[arg(long)]
        start: u32,
        #[arg(long)]
        end: u32,
        #[arg(long, default_value = "oaths")]
        dir: PathBuf,
    },
    /// Flatten NDJSON records into one CSV row per oath
    Oaths {
        /// NDJSON input (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long, default_value = "oaths.csv")]
        output: PathBuf,
    },
    /// Unique swearers and swearees from NDJSON records
    Agents {
        /// NDJSON input (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long, default_value = "agents.csv")]
        output: PathBuf,
    },
    /// Count every field label across pages and flag the ones without a handler
    Fields {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { path, output, csv } => {
            let pages = batch::collect_pages(&path)?;
            if pages.is_empty() {
                println!("No .html pages under {}", path.display());
                return Ok(());
            }
            info!("Extracting {} pages", pages.len());
            let (records, summary) = batch::extract_pages(&pages);

            match output {
                Some(p) => export::write_ndjson(&records, BufWriter::new(create(&p)?))?,
                None => export::write_ndjson(&records, io::stdout().lock())?,
            }
            if let Some(p) = csv {
                let rows = records
                    .iter()
                    .map(|r| export::to_object(r).map(|o| export::flatten_oath(&o)))
                    .collect::<Result<Vec<_>, _>>()?;
                export::write_csv(&rows, BufWriter::new(create(&p)?))?;
                info!("Wrote {} rows to {}", rows.len(), p.display());
            }
            eprintln!(
                "Done: {} pages, {} records, {} skipped, {} diagnostics.",
                summary.total, summary.extracted, summary.skipped, summary.diagnostics
            );
        }
        Commands::Fetch { start, end, dir } => {
            let settings = Settings::load().context("Failed to load OATHS_* settings")?;
            info!(?settings, "Fetching oaths {}..={}", start, end);
            let stats = fetch::fetch_range(&settings, start, end, &dir).await?;
            println!(
                "Done: {} pages ({} downloaded, {} cached, {} failed).",
                stats.total, stats.fetched, stats.cached, stats.failed
            );
        }
        Commands::Oaths { input, output } => {
            let oaths = read_input(input.as_deref())?;
            let rows: Vec<_> = oaths.iter().map(export::flatten_oath).collect();
            export::write_csv(&rows, BufWriter::new(create(&output)?))?;
            println!("Wrote {} oaths to {}", rows.len(), output.display());
        }
        Commands::Agents { input, output } => {
            let oaths = read_input(input.as_deref())?;
            let agents = export::collect_agents(&oaths);
            export::write_csv(&export::object_rows(&agents), BufWriter::new(create(&output)?))?;
            println!("Wrote {} agents to {}", agents.len(), output.display());
        }
        Commands::Fields { path } => {
            let pages = batch::collect_pages(&path)?;
            let census = batch::field_census(&pages);
            let mut out = io::stdout().lock();
            writeln!(out, "{:<28} | {:>6} | handler", "field", "pages")?;
            writeln!(out, "{}", "-".repeat(48))?;
            for (key, count, known) in &census {
                let mark = if *known { "yes" } else { "NO" };
                writeln!(out, "{:<28} | {:>6} | {}", key, count, mark)?;
            }
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("Failed to create {}", path.display()))
}

fn read_input(input: Option<&Path>) -> anyhow::Result<Vec<export::JsonObject>> {
    let objects = match input {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("Failed to open {}", p.display()))?;
            export::read_ndjson(BufReader::new(file))?
        }
        None => export::read_ndjson(io::stdin().lock())?,
    };
    Ok(objects)
}
