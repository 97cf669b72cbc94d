mod password;
mod query;
pub(crate) mod repository;
mod root;

pub use password::{hash_password, verify_password};
pub use query::*;
pub use repository::{FindType, UserRow, UserView};
pub use root::*;
