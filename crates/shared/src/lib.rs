mod date;
mod error;
pub mod family;
mod pagination;
pub mod pantry;
pub mod recipe;
mod text;
pub mod user;

pub use date::*;
pub use error::*;
pub use pagination::*;
pub use text::*;

#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    /// Same pool for reads and writes, used by CLI commands and tests.
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}
