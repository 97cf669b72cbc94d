mod csv;
mod duration;
mod json_ld;

use serde::Serialize;

pub use csv::CSV_HEADERS;
pub(crate) use csv::{read_csv, write_csv};
pub use duration::parse_iso_duration;
pub use json_ld::UrlImporter;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RowError {
    /// 1-based row or array position.
    pub row: usize,
    pub message: String,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub errors: Vec<RowError>,
}

impl ImportReport {
    pub(crate) fn fail(&mut self, row: usize, message: impl Into<String>) {
        self.errors.push(RowError {
            row,
            message: message.into(),
        });
    }
}
