use anyhow::Context;
use clap::Parser;
use weather_collector::cli::{run, Cli};
use weather_collector::logging::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref()).context("failed to initialise logging")?;
    run(cli).context("weather-collector failed")
}
