pub mod csv_writer;

pub use csv_writer::{create_csv, SchemaChange, SchemaReconcilingWriter};
