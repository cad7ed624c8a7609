/// Placeholder written for a column a row has no value for
pub const NA: &str = "NA";

/// Byte-order marker prepended to every CSV file we write
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column names downstream consumers join on
pub const DATE_COLUMN: &str = "date";
pub const CITY_NAME_COLUMN: &str = "city_name";
pub const REQUIRED_COLUMNS: [&str; 2] = [DATE_COLUMN, CITY_NAME_COLUMN];

/// Separator between nested keys of a flattened document
pub const FLATTEN_SEPARATOR: char = '.';

/// OpenWeather endpoints
pub const GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
pub const DAY_SUMMARY_URL: &str = "https://api.openweathermap.org/data/3.0/onecall/day_summary";
pub const DEFAULT_UNITS: &str = "metric";

/// Collection defaults
pub const DEFAULT_CITIES: [&str; 4] = ["Shenzhen", "Shanghai", "Guangzhou", "Beijing"];
pub const DEFAULT_START_DATE: &str = "2024-07-01";
pub const DEFAULT_END_DATE: &str = "2024-07-29";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;
pub const DEFAULT_OUTPUT_FILE: &str = "data/weather_data.csv";

/// Aggregation defaults
pub const DEFAULT_INPUT_DIR: &str = "data";
pub const DEFAULT_INPUT_PATTERN: &str = "weather_data_*.csv";
pub const DEFAULT_AGGREGATED_FILE: &str = "data/weather_data_aggregated.csv";

/// Suffixes for files derived from an output path
pub const BACKUP_SUFFIX: &str = "_old";
pub const DEDUP_SUFFIX: &str = ".dedup";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "WEATHER";
