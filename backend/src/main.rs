//! Workforce CLI - employee directory with bulk import
//!
//! ```bash
//! workforce import --xml staff.xml --csv staff.csv --feed https://...   # import and report
//! workforce stats --csv staff.csv                                     # statistics as JSON
//! workforce serve --port 3000                                         # HTTP API
//! ```
//!
//! Sources given on the command line replace the ones from the environment
//! (`WORKFORCE_CSV_FILE`, `WORKFORCE_XML_FILE`, `WORKFORCE_FEED_URL`).

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use workforce::api::{AppState, EmployeeDto};
use workforce::config::parse_delimiter;
use workforce::{
    telemetry, AppConfig, EmployeeRepository, FeedClient, ImportPipeline, ImportSummary,
    StatisticsAggregator,
};

#[derive(Parser)]
#[command(name = "workforce")]
#[command(about = "Employee directory with CSV, XML and remote-feed bulk import", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import sources (XML, then CSV, then feed) and print a report
    Import {
        #[command(flatten)]
        sources: SourceArgs,

        /// Write the resulting directory as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import sources and print the statistics as JSON
    Stats {
        #[command(flatten)]
        sources: SourceArgs,
    },

    /// Start HTTP server, seeded from the configured sources
    Serve {
        /// Port to listen on (default: WORKFORCE_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Args, Default)]
struct SourceArgs {
    /// Delimited file (repeatable)
    #[arg(long = "csv", value_name = "FILE")]
    csv: Vec<PathBuf>,

    /// XML file (repeatable)
    #[arg(long = "xml", value_name = "FILE")]
    xml: Vec<PathBuf>,

    /// Remote feed URL
    #[arg(long, value_name = "URL")]
    feed: Option<String>,

    /// CSV delimiter: one character, 'tab', or 'auto' to detect it
    #[arg(short, long)]
    delimiter: Option<String>,

    /// XML element holding one employee
    #[arg(long)]
    record_tag: Option<String>,
}

impl SourceArgs {
    fn is_empty(&self) -> bool {
        self.csv.is_empty() && self.xml.is_empty() && self.feed.is_none()
    }

    /// Fall back to the configured sources when none were given.
    fn or_configured(mut self, config: &AppConfig) -> Self {
        if self.is_empty() {
            self.csv.extend(config.csv_file.clone());
            self.xml.extend(config.xml_file.clone());
            self.feed = config.feed_url.clone();
        }
        self
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    telemetry::init(&config.log_filter)?;

    match cli.command {
        Commands::Import { sources, output } => {
            apply_overrides(&mut config, &sources)?;
            let sources = sources.or_configured(&config);
            cmd_import(&config, &sources, output.as_deref()).await
        }
        Commands::Stats { sources } => {
            apply_overrides(&mut config, &sources)?;
            let sources = sources.or_configured(&config);
            cmd_stats(&config, &sources).await
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.port);
            let sources = SourceArgs::default().or_configured(&config);
            cmd_serve(&config, &sources, port).await
        }
    }
}

fn apply_overrides(config: &mut AppConfig, sources: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(delimiter) = &sources.delimiter {
        config.import.delimiter = parse_delimiter("--delimiter", delimiter)?;
    }
    if let Some(tag) = &sources.record_tag {
        config.import.record_tag = tag.clone();
    }
    Ok(())
}

/// Run every batch into a fresh repository: XML, then CSV, then feed.
async fn load_repository(
    config: &AppConfig,
    sources: &SourceArgs,
) -> (EmployeeRepository, Vec<(String, ImportSummary)>) {
    let mut repository = EmployeeRepository::new();
    let mut summaries = Vec::new();

    {
        let mut pipeline = ImportPipeline::with_options(&mut repository, config.import.clone());

        for path in &sources.xml {
            summaries.push((path.display().to_string(), pipeline.import_xml_file(path)));
        }
        for path in &sources.csv {
            summaries.push((path.display().to_string(), pipeline.import_csv_file(path)));
        }
        if let Some(url) = &sources.feed {
            let client = FeedClient::new(url.clone()).with_timeout(config.feed_timeout);
            summaries.push((url.clone(), pipeline.import_feed(&client).await));
        }
    }

    (repository, summaries)
}

async fn cmd_import(
    config: &AppConfig,
    sources: &SourceArgs,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if sources.is_empty() {
        return Err("no sources given (use --csv, --xml or --feed)".into());
    }

    let (repository, summaries) = load_repository(config, sources).await;

    for (source, summary) in &summaries {
        println!("{}", source);
        println!("  {}", summary);
        for error in summary.errors() {
            println!("    - {}", error);
        }
    }

    println!();
    println!("Directory: {} employees", repository.len());
    let aggregator = StatisticsAggregator::from_repository(&repository);
    for (company, stats) in aggregator.per_company() {
        println!("  {}: {}", company, stats);
    }
    println!("  Average salary: {:.2}", aggregator.average_salary(None));
    if let Some(top) = repository.highest_paid() {
        println!("  Highest paid: {} ({:.2})", top, top.salary);
    }

    if let Some(path) = output {
        let employees: Vec<EmployeeDto> = repository
            .list_all()
            .into_iter()
            .map(EmployeeDto::from)
            .collect();
        let json = serde_json::to_string_pretty(&employees)?;
        fs::write(path, json)?;
        eprintln!("Directory written to: {}", path.display());
    }

    Ok(())
}

async fn cmd_stats(config: &AppConfig, sources: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (repository, _) = load_repository(config, sources).await;
    let aggregator = StatisticsAggregator::from_repository(&repository);

    let report = json!({
        "employeeCount": repository.len(),
        "averageSalary": aggregator.average_salary(None),
        "companies": aggregator.per_company(),
        "positions": repository.count_by_job_title(),
        "status": repository.status_counts(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn cmd_serve(config: &AppConfig, sources: &SourceArgs, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let (repository, summaries) = load_repository(config, sources).await;
    for (source, summary) in &summaries {
        eprintln!("Seeded from {}: {}", source, summary);
    }

    let state = AppState::new(repository)
        .with_options(config.import.clone())
        .with_feed(config.feed_client());
    workforce::server::start_server(state, port).await
}
