use crate::{
    error::{AppError, AppResult},
    models::{item, watchlist, Item, ItemModel, ItemStatus, Watchlist},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;

pub struct WatchlistService {
    db: DatabaseConnection,
}

impl WatchlistService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Toggle a bookmark on an item. Returns whether the item is now
    /// watched.
    pub async fn toggle(&self, user_id: &str, item_id: &str) -> AppResult<bool> {
        let item = Item::find_by_id(item_id.to_string())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if item.status == ItemStatus::Deleted {
            return Err(AppError::NotFound);
        }

        let existing = Watchlist::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .filter(watchlist::Column::ItemId.eq(item_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(entry) => {
                Watchlist::delete_by_id(entry.id).exec(&self.db).await?;
                Ok(false)
            }
            None => {
                let now = chrono::Utc::now().naive_utc();
                let entry = watchlist::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    user_id: Set(user_id.to_string()),
                    item_id: Set(item_id.to_string()),
                    created_at: Set(now),
                };
                entry.insert(&self.db).await?;
                Ok(true)
            }
        }
    }

    /// A user's watched items, most recently added first. Soft-deleted
    /// items drop out of the page but their entries are kept.
    pub async fn list(
        &self,
        user_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<ItemModel>, u64)> {
        let paginator = Watchlist::find()
            .filter(watchlist::Column::UserId.eq(user_id))
            .order_by_desc(watchlist::Column::CreatedAt)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page.saturating_sub(1)).await?;

        let item_ids: Vec<String> = entries.iter().map(|e| e.item_id.clone()).collect();
        let mut items: HashMap<String, ItemModel> = Item::find()
            .filter(item::Column::Id.is_in(item_ids.clone()))
            .filter(item::Column::Status.ne(ItemStatus::Deleted))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id.clone(), i))
            .collect();

        let ordered = item_ids
            .into_iter()
            .filter_map(|id| items.remove(&id))
            .collect();

        Ok((ordered, total))
    }
}
