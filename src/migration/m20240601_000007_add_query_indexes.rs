use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Items {
    Table,
    SellerId,
    Category,
    Status,
    PostDate,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    RatedUserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_items_seller_id")
                    .table(Items::Table)
                    .col(Items::SellerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_category")
                    .table(Items::Table)
                    .col(Items::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_status")
                    .table(Items::Table)
                    .col(Items::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_items_post_date")
                    .table(Items::Table)
                    .col(Items::PostDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ratings_rated_user_id")
                    .table(Ratings::Table)
                    .col(Ratings::RatedUserId)
                    .to_owned(),
            )
            .await?;

        // One rating per (rater, item); unlinked ratings are unconstrained.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_ratings_rater_item \
                 ON ratings (rater_user_id, item_id) WHERE item_id IS NOT NULL",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        for index in [
            "idx_items_seller_id",
            "idx_items_category",
            "idx_items_status",
            "idx_items_post_date",
            "idx_ratings_rated_user_id",
            "idx_ratings_rater_item",
        ] {
            db.execute_unprepared(&format!("DROP INDEX IF EXISTS {}", index))
                .await?;
        }

        Ok(())
    }
}
