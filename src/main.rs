//! `dashboard` - print customer dashboard KPIs and chart specs as JSON.

mod cli;

use cli::{Cli, Command};
use customer_dashboard::config::Config;
use customer_dashboard::dashboard::Dashboard;
use customer_dashboard::error::{DashboardError, Result};
use customer_dashboard::logging;
use serde::Serialize;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.verbose);

    if let Err(e) = run(&cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let command = cli.command()?;

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let connection = cli::resolve_connection(cli, &config)?.ok_or_else(|| {
        DashboardError::config(
            "No database connection configured. Use --help for usage information.",
        )
    })?;
    info!("Connection: {}", connection.display_string());

    let dashboard = Dashboard::connect(&connection).await?;

    let outcome = match command {
        Command::Report(report) => dashboard
            .run(report)
            .await
            .and_then(|output| print_json(&output, cli.pretty)),
        Command::All => dashboard
            .run_all()
            .await
            .and_then(|all| print_json(&all, cli.pretty)),
        Command::CheckSchema => dashboard.check_schema().await.and_then(|schema| {
            info!(tables = schema.tables.len(), "Schema has every required column");
            print_json(&schema, cli.pretty)
        }),
    };

    dashboard.close().await?;
    outcome
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
