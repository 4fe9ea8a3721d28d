use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
    SellerId,
    Title,
    Description,
    Category,
    Price,
    Condition,
    Status,
    ViewCount,
    Images,
    PostDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Items::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Items::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Items::SellerId).string_len(36).not_null())
                    .col(ColumnDef::new(Items::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Items::Description).text().null())
                    .col(
                        ColumnDef::new(Items::Category)
                            .string_len(16)
                            .not_null()
                            .check(Expr::col(Items::Category).is_in([
                                "TEXTBOOK",
                                "ELECTRONICS",
                                "FURNITURE",
                                "APPAREL",
                                "SPORTS",
                            ])),
                    )
                    .col(
                        ColumnDef::new(Items::Price)
                            .double()
                            .not_null()
                            .check(Expr::col(Items::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Items::Condition)
                            .string_len(16)
                            .not_null()
                            .check(Expr::col(Items::Condition).is_in([
                                "NEW",
                                "LIKE_NEW",
                                "GOOD",
                                "FAIR",
                                "POOR",
                            ])),
                    )
                    .col(
                        ColumnDef::new(Items::Status)
                            .string_len(16)
                            .not_null()
                            .default("AVAILABLE")
                            .check(Expr::col(Items::Status).is_in([
                                "AVAILABLE",
                                "RESERVED",
                                "SOLD",
                                "DELETED",
                            ])),
                    )
                    .col(
                        ColumnDef::new(Items::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Items::Images).text().null())
                    .col(ColumnDef::new(Items::PostDate).timestamp().not_null())
                    .col(ColumnDef::new(Items::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Items::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_items_seller_id")
                            .from(Items::Table, Items::SellerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Items::Table).to_owned())
            .await
    }
}
