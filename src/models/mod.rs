pub mod coordinates;
pub mod date_range;
pub mod row;

pub use coordinates::Coordinates;
pub use date_range::DateRange;
pub use row::Row;
