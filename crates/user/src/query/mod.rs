mod admin;
mod global_stat;

pub use admin::*;
pub use global_stat::*;
