use crate::{
    error::{AppError, AppResult},
    models::{
        item, item_status_history, Category, CategoryDetails, Condition as ItemCondition, Item,
        ItemModel, ItemStatus, User,
    },
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sea_orm::sea_query::Expr;

/// Fixed sort vocabulary for search; anything unknown falls back to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Newest,
    PriceAsc,
    PriceDesc,
    Views,
}

impl SortBy {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("views") => Self::Views,
            _ => Self::Newest,
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub categories: Vec<Category>,
    pub conditions: Vec<ItemCondition>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort_by: Option<SortBy>,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Default)]
pub struct ListParams {
    pub category: Option<Category>,
    pub status: Option<ItemStatus>,
    pub seller_id: Option<String>,
    pub page: u64,
    pub page_size: u64,
}

pub struct NewItem {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub price: f64,
    pub condition: ItemCondition,
    pub images: Vec<String>,
    pub details: CategoryDetails,
}

/// Partial update; only populated fields change. A status change appends a
/// history row, with an optional buyer snapshot for SOLD handovers.
#[derive(Debug, Default)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub condition: Option<ItemCondition>,
    pub images: Option<Vec<String>>,
    pub status: Option<ItemStatus>,
    pub buyer_id: Option<String>,
}

pub struct ItemService {
    db: DatabaseConnection,
}

impl ItemService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Keyword/filter/sort search. Soft-deleted listings are always
    /// excluded.
    pub async fn search(&self, params: &SearchParams) -> AppResult<(Vec<ItemModel>, u64)> {
        let mut cond = Condition::all().add(item::Column::Status.ne(ItemStatus::Deleted));

        if let Some(keyword) = params.keyword.as_deref().filter(|k| !k.is_empty()) {
            cond = cond.add(
                Condition::any()
                    .add(item::Column::Title.contains(keyword))
                    .add(item::Column::Description.contains(keyword)),
            );
        }
        if !params.categories.is_empty() {
            cond = cond.add(item::Column::Category.is_in(params.categories.iter().copied()));
        }
        if !params.conditions.is_empty() {
            cond = cond.add(item::Column::Condition.is_in(params.conditions.iter().copied()));
        }
        if let Some(min) = params.min_price {
            cond = cond.add(item::Column::Price.gte(min));
        }
        if let Some(max) = params.max_price {
            cond = cond.add(item::Column::Price.lte(max));
        }

        let query = Item::find().filter(cond);
        let query = match params.sort_by.unwrap_or(SortBy::Newest) {
            SortBy::Newest => query.order_by_desc(item::Column::PostDate),
            SortBy::PriceAsc => query.order_by_asc(item::Column::Price),
            SortBy::PriceDesc => query.order_by_desc(item::Column::Price),
            SortBy::Views => query.order_by_desc(item::Column::ViewCount),
        };

        let paginator = query.paginate(&self.db, params.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Plain listing with category/status/seller filters. Soft-deleted rows
    /// are excluded here too; the contract is symmetric with search.
    pub async fn list(&self, params: &ListParams) -> AppResult<(Vec<ItemModel>, u64)> {
        let mut cond = Condition::all().add(item::Column::Status.ne(ItemStatus::Deleted));

        if let Some(category) = params.category {
            cond = cond.add(item::Column::Category.eq(category));
        }
        if let Some(status) = params.status {
            cond = cond.add(item::Column::Status.eq(status));
        }
        if let Some(seller_id) = &params.seller_id {
            cond = cond.add(item::Column::SellerId.eq(seller_id.clone()));
        }

        let paginator = Item::find()
            .filter(cond)
            .order_by_desc(item::Column::PostDate)
            .paginate(&self.db, params.page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Top-N available listings by view count, ties broken by newest.
    pub async fn featured(&self, limit: u64) -> AppResult<Vec<ItemModel>> {
        let items = Item::find()
            .filter(item::Column::Status.eq(ItemStatus::Available))
            .order_by_desc(item::Column::ViewCount)
            .order_by_desc(item::Column::PostDate)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(items)
    }

    /// Fetch a listing for the public detail view. Soft-deleted rows answer
    /// 404 here, by contract.
    pub async fn get_visible(&self, id: &str) -> AppResult<ItemModel> {
        let item = self.get_by_id(id).await?;
        if item.status == ItemStatus::Deleted {
            return Err(AppError::NotFound);
        }
        Ok(item)
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<ItemModel> {
        Item::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(&self, seller_id: &str, new_item: NewItem) -> AppResult<ItemModel> {
        let now = chrono::Utc::now().naive_utc();
        let images = serde_json::to_string(&new_item.images)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize images: {e}")))?;

        let mut active = item::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            seller_id: Set(seller_id.to_string()),
            title: Set(new_item.title),
            description: Set(new_item.description),
            category: Set(new_item.category),
            price: Set(new_item.price),
            condition: Set(new_item.condition),
            status: Set(ItemStatus::Available),
            view_count: Set(0),
            images: Set(Some(images)),
            post_date: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        new_item.details.apply(&mut active);

        Ok(active.insert(&self.db).await?)
    }

    pub async fn update(
        &self,
        id: &str,
        user_id: &str,
        changes: ItemChanges,
    ) -> AppResult<ItemModel> {
        let existing = self.get_visible(id).await?;
        if existing.seller_id != user_id {
            return Err(AppError::Forbidden);
        }

        let old_status = existing.status;
        let now = chrono::Utc::now().naive_utc();

        let mut active: item::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(condition) = changes.condition {
            active.condition = Set(condition);
        }
        if let Some(images) = changes.images {
            let serialized = serde_json::to_string(&images).map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to serialize images: {e}"))
            })?;
            active.images = Set(Some(serialized));
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }
        active.updated_at = Set(now);

        let updated = active.update(&self.db).await?;

        // Separate statement, not atomic with the update above.
        if let Some(new_status) = changes.status {
            if new_status != old_status {
                self.record_status_change(
                    id,
                    Some(old_status),
                    new_status,
                    changes.buyer_id.as_deref(),
                    user_id,
                )
                .await?;
            }
        }

        Ok(updated)
    }

    /// Soft delete: the row is kept with the DELETED sentinel, which is
    /// terminal.
    pub async fn soft_delete(&self, id: &str, user_id: &str) -> AppResult<()> {
        let existing = self.get_visible(id).await?;
        if existing.seller_id != user_id {
            return Err(AppError::Forbidden);
        }

        let old_status = existing.status;
        let now = chrono::Utc::now().naive_utc();

        let mut active: item::ActiveModel = existing.into();
        active.status = Set(ItemStatus::Deleted);
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        self.record_status_change(id, Some(old_status), ItemStatus::Deleted, None, user_id)
            .await?;

        Ok(())
    }

    /// Store-native atomic increment; concurrent calls never lose updates.
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Item::update_many()
            .col_expr(
                item::Column::ViewCount,
                Expr::col(item::Column::ViewCount).add(1),
            )
            .filter(item::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn record_status_change(
        &self,
        item_id: &str,
        old_status: Option<ItemStatus>,
        new_status: ItemStatus,
        buyer_id: Option<&str>,
        changed_by: &str,
    ) -> AppResult<()> {
        let buyer_name = match buyer_id {
            Some(buyer_id) => User::find_by_id(buyer_id.to_string())
                .one(&self.db)
                .await?
                .and_then(|u| u.name),
            None => None,
        };

        let now = chrono::Utc::now().naive_utc();
        let entry = item_status_history::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            item_id: Set(item_id.to_string()),
            old_status: Set(old_status),
            new_status: Set(new_status),
            buyer_id: Set(buyer_id.map(str::to_string)),
            buyer_name: Set(buyer_name),
            changed_by: Set(changed_by.to_string()),
            created_at: Set(now),
        };
        entry.insert(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_known_values() {
        assert_eq!(SortBy::parse(Some("price_asc")), SortBy::PriceAsc);
        assert_eq!(SortBy::parse(Some("price_desc")), SortBy::PriceDesc);
        assert_eq!(SortBy::parse(Some("views")), SortBy::Views);
        assert_eq!(SortBy::parse(Some("newest")), SortBy::Newest);
    }

    #[test]
    fn sort_defaults_to_newest() {
        assert_eq!(SortBy::parse(None), SortBy::Newest);
        assert_eq!(SortBy::parse(Some("garbage")), SortBy::Newest);
    }
}
