pub mod aggregator;
pub mod collector;
pub mod date_validator;
pub mod duplicate_checker;
pub mod flattener;

pub use aggregator::{AggregationSummary, Aggregator};
pub use collector::{CollectionSummary, Collector};
pub use date_validator::{is_valid_date_format, DateFormatReport, DateValidator, InvalidDate};
pub use duplicate_checker::{DuplicateChecker, DuplicateReport};
pub use flattener::flatten_json;
