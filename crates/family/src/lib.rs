mod input;
mod repository;
mod root;

pub use input::{MAX_TAGS, MemberInput, clean_list};
pub use repository::MemberRow;
pub use root::Command;
