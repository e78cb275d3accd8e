use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, warn};

mod cohort;
mod dataset;
mod excel;
mod models;
mod report;
mod risk;

use dataset::GeneratorConfig;
use models::Order;

#[derive(Parser)]
#[command(name = "cohort-churn-report")]
#[command(about = "Customer cohort retention and churn risk reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a deterministic synthetic order history
    Generate {
        #[arg(long, default_value = dataset::DEFAULT_ORDERS_FILE)]
        out: PathBuf,
        #[arg(long, default_value_t = 500)]
        users: u64,
        #[arg(long, default_value_t = 5000)]
        orders: u64,
        #[arg(long, default_value_t = dataset::DEFAULT_SEED)]
        seed: u64,
    },
    /// Compute the cohort churn risk report from an order history CSV
    Analyze {
        #[arg(long, default_value = dataset::DEFAULT_ORDERS_FILE)]
        orders: PathBuf,
        #[arg(long, default_value = "cohort_churn_risk_report.csv")]
        out: PathBuf,
        #[arg(long, default_value = "formatted_churn_risk_report.xlsx")]
        xlsx: PathBuf,
        /// Skip the styled spreadsheet export
        #[arg(long)]
        skip_xlsx: bool,
        /// Seed used if a synthetic dataset has to be generated
        #[arg(long, default_value_t = dataset::DEFAULT_SEED)]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            out,
            users,
            orders,
            seed,
        } => {
            let config = GeneratorConfig {
                users,
                orders,
                seed,
                ..GeneratorConfig::default()
            };
            let generated = dataset::generate_orders(&config);
            dataset::write_orders(&out, &generated)?;
            println!(
                "Wrote {} synthetic orders to {}.",
                generated.len(),
                out.display()
            );
        }
        Commands::Analyze {
            orders,
            out,
            xlsx,
            skip_xlsx,
            seed,
        } => {
            let history = load_or_generate(&orders, seed)?;
            let matrix = cohort::build_matrix(&history);
            if matrix.is_empty() {
                println!("No orders in {}; nothing to report.", orders.display());
                return Ok(());
            }
            info!("{} orders across {} cohorts", history.len(), matrix.len());
            if matrix.max_offset() < 2 {
                warn!("less than 3 months of history; month-2 churn cannot be assessed yet");
            }

            let rows = risk::assess(&matrix);
            print!("{}", report::render_console(&rows));

            report::write_csv(&rows, &out)?;
            println!("Churn risk report saved to {}.", out.display());

            if !skip_xlsx {
                match excel::export_styled_xlsx(&rows, &xlsx) {
                    Ok(()) => {
                        println!("Formatted spreadsheet saved to {}.", xlsx.display());
                    }
                    Err(err) => {
                        warn!("spreadsheet export failed, continuing without it: {err}");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load the order history, generating and persisting a synthetic one when the
/// well-known default file is the one missing. An explicitly chosen path that
/// does not exist is an error.
fn load_or_generate(path: &Path, seed: u64) -> anyhow::Result<Vec<Order>> {
    if !path.exists() && path.as_os_str() == dataset::DEFAULT_ORDERS_FILE {
        println!(
            "{} not found, generating a synthetic dataset...",
            path.display()
        );
        let generated = dataset::generate_orders(&GeneratorConfig {
            seed,
            ..GeneratorConfig::default()
        });
        dataset::write_orders(path, &generated)?;
        return Ok(generated);
    }
    dataset::load_orders(path)
}
