mod import;
mod input;
mod parser;
mod rating;
mod repository;
mod root;

pub use import::{CSV_HEADERS, ImportReport, RowError, UrlImporter, parse_iso_duration};
pub use input::{RecipeFilter, RecipeInput};
pub use parser::parse_ingredient_line;
pub use rating::{RateInput, RatingRow, RatingSummary};
pub use repository::{RecipeRow, RecipeView};
pub use root::Command;
