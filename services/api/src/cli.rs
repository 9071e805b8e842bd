use crate::estimate::{run_estimate, run_price_list, EstimateArgs, PriceListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use tenant_changes::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Tenant Changes",
    about = "Price tenant change requests and run the review service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Price a JSON list of change items and print the estimate
    Estimate(EstimateArgs),
    /// Print the price list entries for a branch
    PriceList(PriceListArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the public base URL used in client links
    #[arg(long)]
    pub(crate) public_url: Option<String>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Estimate(args) => run_estimate(args),
        Command::PriceList(args) => run_price_list(args),
    }
}
