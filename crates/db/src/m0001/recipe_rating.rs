use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Recipe, RecipeRating, User};

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(RecipeRating::Table)
        .col(
            ColumnDef::new(RecipeRating::RecipeId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(RecipeRating::UserId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(RecipeRating::Score)
                .integer()
                .not_null(),
        )
        .col(ColumnDef::new(RecipeRating::Comment).text().null())
        .col(ColumnDef::new(RecipeRating::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(RecipeRating::UpdatedAt).big_integer().not_null())
        .primary_key(
            Index::create()
                .col(RecipeRating::RecipeId)
                .col(RecipeRating::UserId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_rating_recipe")
                .from(RecipeRating::Table, RecipeRating::RecipeId)
                .to(Recipe::Table, Recipe::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_rating_user")
                .from(RecipeRating::Table, RecipeRating::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(RecipeRating::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
