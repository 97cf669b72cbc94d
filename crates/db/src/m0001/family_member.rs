use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{FamilyMember, User};

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(FamilyMember::Table)
        .col(
            ColumnDef::new(FamilyMember::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(FamilyMember::UserId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(FamilyMember::Name)
                .string()
                .not_null()
                .string_len(50),
        )
        .col(ColumnDef::new(FamilyMember::Age).integer().null())
        .col(
            ColumnDef::new(FamilyMember::DietaryPreferences)
                .text()
                .not_null()
                .default("[]"),
        )
        .col(
            ColumnDef::new(FamilyMember::Allergies)
                .text()
                .not_null()
                .default("[]"),
        )
        .col(
            ColumnDef::new(FamilyMember::Dislikes)
                .text()
                .not_null()
                .default("[]"),
        )
        .col(ColumnDef::new(FamilyMember::Notes).text().null())
        .col(ColumnDef::new(FamilyMember::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(FamilyMember::UpdatedAt).big_integer().not_null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_family_member_user")
                .from(FamilyMember::Table, FamilyMember::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(FamilyMember::Table).to_owned()
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

pub struct CreateUk1;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateUk1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(
            r#"CREATE UNIQUE INDEX "uk_family_member_name" on "family_member" ("user_id", "name" COLLATE NOCASE)"#,
        )
        .execute(connection)
        .await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        sqlx::query(r#"DROP INDEX "uk_family_member_name""#)
            .execute(connection)
            .await?;

        Ok(())
    }
}
