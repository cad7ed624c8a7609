use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use weather_collector::api::WeatherProvider;
use weather_collector::config::{AggregatorConfig, CollectorConfig};
use weather_collector::models::{Coordinates, Row};
use weather_collector::processors::{Aggregator, Collector, DuplicateChecker};
use weather_collector::readers::CsvTableReader;
use weather_collector::utils::AlwaysConfirm;
use weather_collector::{PipelineError, Result};

/// Serves canned day summaries; `with_humidity` switches on an extra field.
struct CannedProvider {
    with_humidity: bool,
}

impl WeatherProvider for CannedProvider {
    fn resolve_coordinates(&self, city: &str) -> Result<Option<Coordinates>> {
        match city {
            "Shenzhen" => Ok(Some(Coordinates::new(22.54, 114.06)?)),
            "Guangzhou" => Ok(Some(Coordinates::new(23.13, 113.26)?)),
            _ => Ok(None),
        }
    }

    fn fetch_daily_summary(&self, coordinates: Coordinates, date: NaiveDate) -> Result<Option<Row>> {
        let doc = if self.with_humidity {
            serde_json::json!({
                "lat": coordinates.latitude,
                "date": date.format("%Y-%m-%d").to_string(),
                "temperature": {"max": 31.5},
                "humidity": {"afternoon": 70}
            })
        } else {
            serde_json::json!({
                "lat": coordinates.latitude,
                "date": date.format("%Y-%m-%d").to_string(),
                "temperature": {"max": 31.5}
            })
        };
        Ok(Some(weather_collector::processors::flatten_json(&doc)))
    }
}

fn collector_config(dir: &TempDir, file: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> CollectorConfig {
    CollectorConfig {
        cities: vec!["Shenzhen".to_string(), "Guangzhou".to_string()],
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        output_file: dir.path().join(file),
        api_key: "test".to_string(),
        use_proxy: false,
        proxy_url: None,
        request_delay_ms: 0,
        units: "metric".to_string(),
        geocoding_url: String::new(),
        weather_url: String::new(),
    }
}

#[test]
fn test_collect_then_aggregate() -> Result<()> {
    let dir = TempDir::new()?;

    let first = collector_config(&dir, "weather_data_july_a.csv", (2024, 7, 1), (2024, 7, 2));
    let summary = Collector::new(CannedProvider { with_humidity: false }, &first)?
        .run(&mut AlwaysConfirm)?;
    assert_eq!(summary.rows_written, 4);

    // Overlaps the first run on 2024-07-02 with a wider schema.
    let second = collector_config(&dir, "weather_data_july_b.csv", (2024, 7, 2), (2024, 7, 3));
    let summary = Collector::new(CannedProvider { with_humidity: true }, &second)?
        .run(&mut AlwaysConfirm)?;
    assert_eq!(summary.rows_written, 4);
    assert!(summary.columns.contains(&"humidity.afternoon".to_string()));

    let aggregator = Aggregator::new(&AggregatorConfig {
        input_dir: dir.path().to_path_buf(),
        input_pattern: "weather_data_*.csv".to_string(),
        aggregated_file: dir.path().join("weather_data_aggregated.csv"),
    });
    let report = aggregator.run(&mut AlwaysConfirm)?;

    assert_eq!(report.inputs.len(), 2);
    assert_eq!(report.rows_written, 8);
    assert_eq!(
        report.columns,
        vec!["city_name", "date", "humidity.afternoon", "lat", "temperature.max"]
    );
    assert!(!report.date_formats.has_warnings());
    // The 2024-07-02 rows differ in humidity, so nothing is a duplicate.
    assert_eq!(report.duplicates.duplicate_rows, 0);

    let table = CsvTableReader::new().read_table(&report.output_file)?;
    assert_eq!(table.rows.len(), 8);
    assert_eq!(table.rows[0].get("humidity.afternoon"), Some("NA"));
    assert_eq!(table.rows[7].get("humidity.afternoon"), Some("70"));

    // Aggregating again over the same inputs reuses the confirmed overwrite path.
    let again = aggregator.run(&mut AlwaysConfirm)?;
    assert_eq!(again.inputs, report.inputs);
    Ok(())
}

#[test]
fn test_aggregate_requires_city_name() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("weather_data_x.csv"), "date,lat\n2024-07-01,22.5\n")?;

    let aggregator = Aggregator::new(&AggregatorConfig {
        input_dir: dir.path().to_path_buf(),
        input_pattern: "weather_data_*.csv".to_string(),
        aggregated_file: dir.path().join("weather_data_aggregated.csv"),
    });

    let result = aggregator.run(&mut AlwaysConfirm);
    assert!(matches!(result, Err(PipelineError::MissingColumns { .. })));
    assert!(!dir.path().join("weather_data_aggregated.csv").exists());
    Ok(())
}

#[test]
fn test_duplicate_check_on_collected_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("weather_data.csv");
    std::fs::write(
        &path,
        "\u{feff}date,city_name\n2024-07-01,Shenzhen\n2024-07-01,Shenzhen\n",
    )?;

    let checker = DuplicateChecker::new();
    let report = checker.check(&path)?;
    assert_eq!(report.duplicate_rows, 1);

    let report = checker.check(&report.dedup_file.unwrap())?;
    assert_eq!(report.duplicate_rows, 0);
    Ok(())
}
