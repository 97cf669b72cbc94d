mod family_member;
mod ingredient;
mod meal_plan;
mod meal_plan_entry;
mod pantry_item;
mod recipe;
mod recipe_rating;
mod user;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "mealmate",
    "m0001",
    vec_box![],
    vec_box![
        user::CreateTable,
        user::CreateUk1,
        family_member::CreateTable,
        family_member::CreateUk1,
        ingredient::CreateTable,
        ingredient::CreateIdx1,
        pantry_item::CreateTable,
        pantry_item::CreateIdx1,
        pantry_item::CreateIdx2,
        recipe::CreateTable,
        recipe::CreateIdx1,
        recipe_rating::CreateTable,
        meal_plan::CreateTable,
        meal_plan::CreateIdx1,
        meal_plan_entry::CreateTable,
        meal_plan_entry::CreateIdx1,
        meal_plan_entry::CreateIdx2
    ]
);
