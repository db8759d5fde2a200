use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod detail;
mod error;
mod filter;
mod models;
mod recent;
mod report;
mod source;
mod tally;
#[cfg(test)]
mod testing;
mod view;

use config::Config;
use filter::FilterPatch;
use source::{CsvSource, RecordSource};
use view::DashboardView;

#[derive(Parser)]
#[command(name = "enrollment-dashboard")]
#[command(about = "Admin dashboard for student enrollment applications", long_about = None)]
struct Cli {
    /// Read records from a CSV file instead of Postgres
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive substring of the student's name
    #[arg(long)]
    query: Option<String>,
    /// Strand: STEM, ABM, TVL-ICT, HUMSS or any
    #[arg(long)]
    track: Option<String>,
    /// Grade level as shown in the roster
    #[arg(long)]
    level: Option<String>,
    /// Term label, matched exactly
    #[arg(long)]
    term: Option<String>,
}

impl From<FilterArgs> for FilterPatch {
    fn from(args: FilterArgs) -> Self {
        FilterPatch {
            query: args.query,
            track: args.track,
            level: args.level,
            term: args.term,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load demo applications
    Seed,
    /// Import applications from a CSV file
    Import {
        #[arg(long = "from")]
        path: PathBuf,
    },
    /// Counts by strand and status plus recent applications
    Summary,
    /// List students matching the given filters
    Roster {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
    /// Show the detail card for one roster entry
    Show {
        /// Roster index as printed by `roster`
        index: usize,
    },
    /// Write the full dashboard as markdown
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);
    let config = Config::from_env()?;

    match (cli.command, cli.csv) {
        (Commands::InitDb, _) => {
            db::init_db(&connect(&config).await?).await?;
            println!("Schema ready.");
        }
        (Commands::Seed, _) => {
            db::seed(&connect(&config).await?).await?;
            println!("Seed data inserted.");
        }
        (Commands::Import { path }, _) => {
            let inserted = db::import_csv(&connect(&config).await?, &path).await?;
            println!("Inserted {inserted} applications from {}.", path.display());
        }
        (command, Some(path)) => {
            info!(path = %path.display(), "using CSV record source");
            run_view(&CsvSource::new(path), command, &config).await?;
        }
        (command, None) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect_lazy(config.database_url()?)
                .context("invalid DATABASE_URL")?;
            let source = db::PgRecordSource::new(pool);
            run_view(&source, command, &config).await?;
        }
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let builder = tracing_subscriber::fmt().with_writer(std::io::stderr);
    if debug {
        builder.with_max_level(tracing::Level::DEBUG).init();
    } else {
        builder
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url()?)
        .await
        .context("failed to connect to Postgres")
}

async fn run_view<S: RecordSource>(
    source: &S,
    command: Commands,
    config: &Config,
) -> anyhow::Result<()> {
    let mut view = DashboardView::new(config.recent_limit);
    view.reload(source).await;

    match command {
        Commands::Summary => {
            print!("{}", report::build_summary(&view));
        }
        Commands::Roster { filters, format } => {
            view.set_filter(filters.into())?;
            match format {
                OutputFormat::Markdown => {
                    let mut output = String::new();
                    report::render_roster(&mut output, &view);
                    print!("{output}");
                }
                OutputFormat::Json => println!("{}", report::roster_json(&view)?),
            }
        }
        Commands::Show { index } => {
            if view.roster().is_unavailable() {
                let mut output = String::new();
                report::render_roster(&mut output, &view);
                print!("{output}");
                return Ok(());
            }
            view.select(index)?;
            let mut output = String::new();
            report::render_detail(&mut output, view.detail());
            print!("{output}");
            view.dismiss();
        }
        Commands::Report { filters, out } => {
            view.set_filter(filters.into())?;
            let dashboard = report::build_report(&view, chrono::Utc::now());
            std::fs::write(&out, dashboard)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Dashboard written to {}.", out.display());
        }
        Commands::InitDb | Commands::Seed | Commands::Import { .. } => {
            anyhow::bail!("database commands do not render a view")
        }
    }

    Ok(())
}
