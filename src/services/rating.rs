use crate::{
    error::{AppError, AppResult},
    models::{rating, user, ItemStatus, Rating, RatingModel, User},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::collections::HashMap;

pub struct RatingService {
    db: DatabaseConnection,
}

impl RatingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record feedback about a counterparty, optionally tied to an item.
    /// One rating per (rater, item) pair.
    pub async fn create(
        &self,
        rater_user_id: &str,
        rated_user_id: &str,
        item_id: Option<String>,
        rating_value: i32,
        comment: Option<String>,
    ) -> AppResult<RatingModel> {
        User::find_by_id(rated_user_id.to_string())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(item_id) = &item_id {
            let item = crate::models::Item::find_by_id(item_id.clone())
                .one(&self.db)
                .await?
                .ok_or(AppError::NotFound)?;
            if item.status == ItemStatus::Deleted {
                return Err(AppError::NotFound);
            }

            let already_rated = Rating::find()
                .filter(rating::Column::RaterUserId.eq(rater_user_id))
                .filter(rating::Column::ItemId.eq(item_id.clone()))
                .count(&self.db)
                .await?;
            if already_rated > 0 {
                return Err(AppError::Conflict(
                    "You have already rated this transaction".to_string(),
                ));
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let entry = rating::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            rated_user_id: Set(rated_user_id.to_string()),
            rater_user_id: Set(rater_user_id.to_string()),
            item_id: Set(item_id),
            rating: Set(rating_value),
            comment: Set(comment),
            created_at: Set(now),
        };

        Ok(entry.insert(&self.db).await?)
    }

    /// Ratings received by a user, newest first, with rater display names
    /// batch-fetched for the page.
    pub async fn list_received(
        &self,
        rated_user_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<(Vec<(RatingModel, Option<String>)>, u64)> {
        let paginator = Rating::find()
            .filter(rating::Column::RatedUserId.eq(rated_user_id))
            .order_by_desc(rating::Column::CreatedAt)
            .paginate(&self.db, page_size);

        let total = paginator.num_items().await?;
        let ratings = paginator.fetch_page(page.saturating_sub(1)).await?;

        let rater_ids: Vec<String> = ratings.iter().map(|r| r.rater_user_id.clone()).collect();
        let raters: HashMap<String, Option<String>> = User::find()
            .filter(user::Column::Id.is_in(rater_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let rows = ratings
            .into_iter()
            .map(|r| {
                let name = raters.get(&r.rater_user_id).cloned().flatten();
                (r, name)
            })
            .collect();

        Ok((rows, total))
    }
}
