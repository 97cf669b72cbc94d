use sea_query::Iden;

#[derive(Iden, Clone, Copy)]
pub enum User {
    Table,
    Id,
    Email,
    Password,
    FullName,
    HouseholdSize,
    Role,
    State,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum FamilyMember {
    Table,
    Id,
    UserId,
    Name,
    Age,
    DietaryPreferences,
    Allergies,
    Dislikes,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Ingredient {
    Table,
    Id,
    Name,
    Category,
    CreatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum PantryItem {
    Table,
    Id,
    UserId,
    IngredientId,
    Quantity,
    Unit,
    ExpiresOn,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum Recipe {
    Table,
    Id,
    UserId,
    Name,
    Description,
    Cuisine,
    MealType,
    PrepTimeMinutes,
    CookTimeMinutes,
    Servings,
    Ingredients,
    Instructions,
    Tags,
    Source,
    SourceUrl,
    IsFavorite,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum RecipeRating {
    Table,
    RecipeId,
    UserId,
    Score,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum MealPlan {
    Table,
    Id,
    UserId,
    Name,
    StartDate,
    EndDate,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden, Clone, Copy)]
pub enum MealPlanEntry {
    Table,
    Id,
    MealPlanId,
    RecipeId,
    Date,
    MealType,
    Servings,
    Notes,
    CreatedAt,
}
