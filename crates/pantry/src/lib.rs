mod ingredient;
mod item;
mod root;

pub use ingredient::{IngredientRow, find_or_create_ingredient, search_ingredients};
pub use item::{AddItemInput, MAX_QUANTITY, PantryFilter, PantryItemRow, UpdateItemInput};
pub use root::Command;
