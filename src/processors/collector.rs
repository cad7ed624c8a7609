use crate::api::{RateLimiter, WeatherProvider};
use crate::config::CollectorConfig;
use crate::error::{PipelineError, Result};
use crate::models::{Coordinates, DateRange};
use crate::utils::confirm::Confirm;
use crate::utils::constants::CITY_NAME_COLUMN;
use crate::utils::progress::ProgressReporter;
use crate::writers::SchemaReconcilingWriter;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub output_file: PathBuf,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub header_rewrites: usize,
    pub unresolved_cities: Vec<String>,
    pub empty_lookups: Vec<(String, NaiveDate)>,
}

impl CollectionSummary {
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Collection Report ===\n");
        summary.push_str(&format!("Rows written: {}\n", self.rows_written));
        summary.push_str(&format!("Columns: {}\n", self.columns.len()));
        summary.push_str(&format!("Header rewrites: {}\n", self.header_rewrites));

        if !self.unresolved_cities.is_empty() {
            summary.push_str(&format!(
                "Cities without coordinates: {}\n",
                self.unresolved_cities.join(", ")
            ));
        }
        if !self.empty_lookups.is_empty() {
            summary.push_str(&format!("Empty lookups: {}\n", self.empty_lookups.len()));
            for (city, date) in self.empty_lookups.iter().take(10) {
                summary.push_str(&format!("  • {} on {}\n", city, date));
            }
        }

        summary.push_str(&format!("Output file: {}", self.output_file.display()));
        summary
    }
}

/// Fetches one daily summary per (day, city) and appends it to a
/// schema-reconciling CSV file.
///
/// Lookups run strictly one after another with the configured delay between
/// any two of them. Cities that cannot be geocoded and days without data are
/// logged and skipped; any other error ends the run.
pub struct Collector<P: WeatherProvider> {
    provider: P,
    cities: Vec<String>,
    date_range: DateRange,
    output_file: PathBuf,
    limiter: RateLimiter,
    show_progress: bool,
    resume: bool,
}

impl<P: WeatherProvider> Collector<P> {
    pub fn new(provider: P, config: &CollectorConfig) -> Result<Self> {
        Ok(Self {
            provider,
            cities: config.cities.clone(),
            date_range: config.date_range()?,
            output_file: config.output_file.clone(),
            limiter: RateLimiter::new(config.request_delay()),
            show_progress: false,
            resume: false,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Append to an existing output file instead of replacing it.
    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    /// Collect behind an overwrite confirmation for an existing output file.
    /// A resumed run appends and never asks.
    pub fn run(self, confirm: &mut dyn Confirm) -> Result<CollectionSummary> {
        if self.output_file.exists() && !self.resume {
            let prompt = format!(
                "Warning: The file '{}' already exists. Do you want to overwrite it?",
                self.output_file.display()
            );
            if !confirm.confirm(&prompt) {
                return Err(PipelineError::Cancelled);
            }
        }
        self.collect()
    }

    pub fn collect(mut self) -> Result<CollectionSummary> {
        let (located, unresolved_cities) = self.resolve_cities()?;

        let total = (self.date_range.num_days() * located.len()) as u64;
        let progress = ProgressReporter::new(total, "Collecting daily summaries", !self.show_progress);

        let mut writer = if self.resume && self.output_file.exists() {
            let writer = SchemaReconcilingWriter::resume(&self.output_file)?;
            info!(
                output = %self.output_file.display(),
                rows = writer.rows_written(),
                "Resuming into existing file"
            );
            writer
        } else {
            SchemaReconcilingWriter::new(&self.output_file)
        };
        let mut empty_lookups = Vec::new();

        for date in self.date_range.days() {
            for (city, coordinates) in &located {
                progress.set_message(&format!("{} on {}", city, date));

                let provider = &self.provider;
                match self
                    .limiter
                    .call(|| provider.fetch_daily_summary(*coordinates, date))?
                {
                    Some(mut row) => {
                        row.insert(CITY_NAME_COLUMN, city.as_str());
                        let change = writer.write_row(&row)?;

                        if !change.added.is_empty() {
                            info!(columns = %change.added.join(", "), "New column(s) added");
                        }
                        if !change.missing.is_empty() {
                            info!(
                                columns = %change.missing.join(", "),
                                "Some columns are missing, filled with NA"
                            );
                        }
                        debug!(city = %city, %date, "Row appended");
                    }
                    None => {
                        warn!(city = %city, %date, "No weather data found, skipping");
                        empty_lookups.push((city.clone(), date));
                    }
                }

                progress.increment(1);
            }
        }

        progress.finish_with_message("Data collection complete");
        info!(
            output = %self.output_file.display(),
            rows = writer.rows_written(),
            "Data collection complete"
        );

        Ok(CollectionSummary {
            output_file: self.output_file.clone(),
            rows_written: writer.rows_written(),
            columns: writer.header().to_vec(),
            header_rewrites: writer.rewrites(),
            unresolved_cities,
            empty_lookups,
        })
    }

    fn resolve_cities(&mut self) -> Result<(Vec<(String, Coordinates)>, Vec<String>)> {
        let mut located = Vec::with_capacity(self.cities.len());
        let mut unresolved = Vec::new();

        for city in &self.cities {
            let provider = &self.provider;
            match self.limiter.call(|| provider.resolve_coordinates(city))? {
                Some(coordinates) => {
                    info!(city = %city, %coordinates, "Resolved coordinates");
                    located.push((city.clone(), coordinates));
                }
                None => {
                    warn!(city = %city, "No geocoding match, city skipped");
                    unresolved.push(city.clone());
                }
            }
        }

        Ok((located, unresolved))
    }
}
