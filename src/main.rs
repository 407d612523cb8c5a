use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hr_kpi_engine::churn::{build_training_set, score_employees, top_at_risk, write_training_set};
use hr_kpi_engine::config::ConfigLoader;
use hr_kpi_engine::dashboard::{AppState, DEFAULT_TOP_LIMIT, create_router};
use hr_kpi_engine::pipeline::{load_churn_model, run_pipeline};
use hr_kpi_engine::records::RecordStore;

/// Monthly HR KPI aggregation, churn scoring and dashboard data API.
#[derive(Parser, Debug)]
#[command(name = "hr-kpi", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregates the input records into the monthly metrics table.
    Aggregate {
        /// Configuration directory holding pipeline.yaml.
        #[arg(short, long, env = "HR_KPI_CONFIG")]
        config: PathBuf,
        /// Writes the table here instead of the configured path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Exports churn features and labels for an external trainer.
    Features {
        #[arg(short, long, env = "HR_KPI_CONFIG")]
        config: PathBuf,
        /// Reference date for tenure and age (YYYY-MM-DD).
        #[arg(long)]
        as_of: NaiveDate,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Prints the employees most likely to leave.
    Score {
        #[arg(short, long, env = "HR_KPI_CONFIG")]
        config: PathBuf,
        /// Reference date for tenure and age; defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(short, long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
    /// Serves the dashboard data API.
    Serve {
        #[arg(short, long, env = "HR_KPI_CONFIG")]
        config: PathBuf,
        /// Reference date for churn scores; defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Overrides dashboard.bind from pipeline.yaml.
        #[arg(short, long)]
        bind: Option<String>,
    },
}

fn load_config(dir: &Path) -> Result<ConfigLoader> {
    ConfigLoader::load(dir).with_context(|| format!("loading configuration from {}", dir.display()))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate { config, output } => {
            let config = load_config(&config)?;
            let run = run_pipeline(&config, output.as_deref()).context("aggregation failed")?;
            println!(
                "Wrote {} months to {}",
                run.report.rows.len(),
                run.metrics_path.display()
            );
            for warning in &run.report.audit_trace.warnings {
                println!("  warning [{}]: {}", warning.code, warning.message);
            }
        }
        Commands::Features {
            config,
            as_of,
            output,
        } => {
            let config = load_config(&config)?;
            let schema = config.require_feature_schema()?;
            let store = RecordStore::load(&config)?;
            let set = build_training_set(store.employees(), as_of, schema)
                .context("building churn features")?;
            write_training_set(&set, &output)?;
            println!(
                "Wrote {} rows ({} leavers, schema {}) to {}",
                set.rows.len(),
                set.leavers(),
                set.schema_version,
                output.display()
            );
        }
        Commands::Score {
            config,
            as_of,
            limit,
        } => {
            let config = load_config(&config)?;
            let as_of = as_of.unwrap_or_else(today);
            let schema = config.require_feature_schema()?;
            let model = load_churn_model(&config)?
                .context("no churn model configured (churn.model in pipeline.yaml)")?;
            let store = RecordStore::load(&config)?;
            let scores = score_employees(store.employees(), as_of, schema, &model)?;

            println!("Top {} churn risks as of {}:", limit, as_of);
            for score in top_at_risk(&scores, limit) {
                println!(
                    "  {:>8}  {:<12} {:<12} {:<10} {:<10} {:>10}  {:.3}",
                    score.employee_id,
                    score.first_name,
                    score.last_name,
                    score.department,
                    score.contract,
                    score.salary,
                    score.probability
                );
            }
        }
        Commands::Serve {
            config,
            as_of,
            bind,
        } => {
            let config = load_config(&config)?;
            let as_of = as_of.unwrap_or_else(today);
            let bind = bind.unwrap_or_else(|| config.dashboard().bind.clone());

            let state = AppState::from_config(&config, as_of).context("preparing dashboard data")?;
            let router = create_router(state);

            let listener = TcpListener::bind(&bind)
                .await
                .with_context(|| format!("binding {}", bind))?;
            info!(bind = %bind, as_of = %as_of, "Dashboard data API listening");
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
