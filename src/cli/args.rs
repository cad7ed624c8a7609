use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weather-collector")]
#[command(about = "Collect daily weather summaries into CSV and aggregate them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Hide the progress bar")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch daily summaries for every city and day into one CSV file
    Collect {
        #[arg(short, long, help = "TOML configuration file")]
        config: Option<PathBuf>,

        #[arg(short, long, help = "Output CSV file [default: data/weather_data.csv]")]
        output: Option<PathBuf>,

        #[arg(long, help = "First day, YYYY-MM-DD")]
        start: Option<String>,

        #[arg(long, help = "Last day (inclusive), YYYY-MM-DD")]
        end: Option<String>,

        #[arg(long = "city", help = "City to collect, repeat for several")]
        cities: Vec<String>,

        #[arg(long, help = "Route requests through the configured proxy")]
        use_proxy: bool,

        #[arg(long, help = "Minimum delay between requests in milliseconds")]
        delay_ms: Option<u64>,

        #[arg(short, long, help = "Overwrite an existing output without asking")]
        yes: bool,

        #[arg(
            long,
            conflicts_with = "yes",
            help = "Append to an existing output instead of overwriting it"
        )]
        resume: bool,
    },

    /// Merge every per-run CSV file into one aggregated file
    Aggregate {
        #[arg(short, long, help = "TOML configuration file")]
        config: Option<PathBuf>,

        #[arg(short, long, help = "Directory holding the per-run CSV files [default: data]")]
        input_dir: Option<PathBuf>,

        #[arg(short, long, help = "File name pattern [default: weather_data_*.csv]")]
        pattern: Option<String>,

        #[arg(
            short,
            long,
            help = "Aggregated output file [default: data/weather_data_aggregated.csv]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Overwrite an existing output without asking")]
        yes: bool,
    },

    /// Report duplicate rows of a CSV file and write a deduplicated copy
    CheckDuplicates {
        #[arg(short, long)]
        file: PathBuf,
    },
}
