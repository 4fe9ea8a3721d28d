use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Watchlists {
    Table,
    Id,
    UserId,
    ItemId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Items {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Watchlists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Watchlists::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Watchlists::UserId).string_len(36).not_null())
                    .col(ColumnDef::new(Watchlists::ItemId).string_len(36).not_null())
                    .col(ColumnDef::new(Watchlists::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watchlists_user_id")
                            .from(Watchlists::Table, Watchlists::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_watchlists_item_id")
                            .from(Watchlists::Table, Watchlists::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One bookmark per (user, item)
        manager
            .create_index(
                Index::create()
                    .name("idx_watchlists_user_item")
                    .table(Watchlists::Table)
                    .col(Watchlists::UserId)
                    .col(Watchlists::ItemId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Watchlists::Table).to_owned())
            .await
    }
}
