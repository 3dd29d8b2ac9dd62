//! Shaping of the measurement service's JSON responses into tables.

mod envelope;
mod table;

pub use envelope::{ResponseEnvelope, SPARSE_FORMAT};
pub use table::{IndexWarning, ResultTable, RowIndex, TIME_COLUMN};
