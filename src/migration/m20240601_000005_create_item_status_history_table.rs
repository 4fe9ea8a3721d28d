use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ItemStatusHistory {
    Table,
    Id,
    ItemId,
    OldStatus,
    NewStatus,
    BuyerId,
    BuyerName,
    ChangedBy,
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
                    .table(ItemStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ItemStatusHistory::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ItemStatusHistory::ItemId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemStatusHistory::OldStatus).string_len(16).null())
                    .col(
                        ColumnDef::new(ItemStatusHistory::NewStatus)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ItemStatusHistory::BuyerId).string_len(36).null())
                    .col(ColumnDef::new(ItemStatusHistory::BuyerName).string_len(100).null())
                    .col(
                        ColumnDef::new(ItemStatusHistory::ChangedBy)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ItemStatusHistory::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_status_history_item_id")
                            .from(ItemStatusHistory::Table, ItemStatusHistory::ItemId)
                            .to(Items::Table, Items::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_status_history_buyer_id")
                            .from(ItemStatusHistory::Table, ItemStatusHistory::BuyerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_status_history_changed_by")
                            .from(ItemStatusHistory::Table, ItemStatusHistory::ChangedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ItemStatusHistory::Table).to_owned())
            .await
    }
}
