pub mod confirm;
pub mod constants;
pub mod filename;
pub mod progress;

pub use confirm::{AlwaysConfirm, Confirm, StdinConfirm};
pub use constants::*;
pub use filename::{backup_path, dedup_path, normalize_path, parent_dir};
pub use progress::ProgressReporter;
