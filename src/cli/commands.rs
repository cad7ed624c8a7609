use crate::api::OpenWeatherClient;
use crate::cli::args::{Cli, Commands};
use crate::config::{AggregatorConfig, CollectorConfig};
use crate::error::{PipelineError, Result};
use crate::processors::{Aggregator, Collector, DuplicateChecker};
use crate::utils::confirm::{AlwaysConfirm, Confirm, StdinConfirm};
use chrono::NaiveDate;
use tracing::info;
use validator::Validate;

pub fn run(cli: Cli) -> Result<()> {
    let show_progress = !cli.quiet;

    let outcome = match cli.command {
        Commands::Collect {
            config,
            output,
            start,
            end,
            cities,
            use_proxy,
            delay_ms,
            yes,
            resume,
        } => {
            let mut settings = CollectorConfig::load(config.as_deref())?;
            if let Some(output) = output {
                settings.output_file = output;
            }
            if let Some(start) = start {
                settings.start_date = NaiveDate::parse_from_str(&start, "%Y-%m-%d")?;
            }
            if let Some(end) = end {
                settings.end_date = NaiveDate::parse_from_str(&end, "%Y-%m-%d")?;
            }
            if !cities.is_empty() {
                settings.cities = cities;
            }
            if use_proxy {
                settings.use_proxy = true;
            }
            if let Some(delay_ms) = delay_ms {
                settings.request_delay_ms = delay_ms;
            }
            settings.validate()?;

            println!("Collecting daily weather summaries...");
            println!("Cities: {}", settings.cities.join(", "));
            println!("Dates: {} to {}", settings.start_date, settings.end_date);
            println!("Output file: {}", settings.output_file.display());
            if resume {
                println!("Appending to existing output if present");
            }

            let client = OpenWeatherClient::from_config(&settings)?;
            let collector = Collector::new(client, &settings)?
                .with_progress(show_progress)
                .with_resume(resume);

            collector
                .run(&mut *confirmation(yes))
                .map(|summary| println!("\n{}", summary.summary()))
        }

        Commands::Aggregate {
            config,
            input_dir,
            pattern,
            output,
            yes,
        } => {
            let mut settings = AggregatorConfig::load(config.as_deref())?;
            if let Some(input_dir) = input_dir {
                settings.input_dir = input_dir;
            }
            if let Some(pattern) = pattern {
                settings.input_pattern = pattern;
            }
            if let Some(output) = output {
                settings.aggregated_file = output;
            }
            settings.validate()?;

            println!(
                "Aggregating {} in {} into a single CSV...",
                settings.input_pattern,
                settings.input_dir.display()
            );

            Aggregator::new(&settings)
                .run(&mut *confirmation(yes))
                .map(|summary| {
                    println!("\n{}", summary.summary());
                    if summary.date_formats.has_warnings() {
                        println!(
                            "*** Warning: Incorrect date format found. Manual checking is required. ***"
                        );
                    }
                })
        }

        Commands::CheckDuplicates { file } => {
            println!("Checking duplicates in {}", file.display());
            let report = DuplicateChecker::new().check(&file)?;
            println!("{}", report.summary());
            Ok(())
        }
    };

    match outcome {
        Err(PipelineError::Cancelled) => {
            info!("Operation cancelled by user");
            println!("Operation cancelled.");
            Ok(())
        }
        other => other,
    }
}

fn confirmation(assume_yes: bool) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(StdinConfirm)
    }
}
