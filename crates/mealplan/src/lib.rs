mod entry;
mod plan;
mod root;
mod shopping;

pub use entry::{EntryInput, EntryRow};
pub use plan::{MAX_PLAN_DAYS, PlanDetail, PlanInput, PlanRow};
pub use root::Command;
pub use shopping::{PlannedRecipe, ShoppingItem, ShoppingList, aggregate};
