use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait,
    Statement,
};

/// Derived trust signals shown on profiles: distinct ratings received,
/// their average, and the number of listings the user has sold.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserStats {
    pub rating_count: i64,
    pub average_rating: Option<f64>,
    pub successful_transactions: i64,
}

/// Partial profile update; only populated fields change.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub university: Option<String>,
    pub enrollment_year: Option<i32>,
}

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<UserModel> {
        User::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn stats(&self, user_id: &str) -> AppResult<UserStats> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Sqlite,
                "SELECT COUNT(DISTINCT r.id) AS rating_count, \
                        AVG(r.rating) AS average_rating, \
                        COUNT(DISTINCT CASE WHEN i.status = 'SOLD' THEN i.id END) AS successful_transactions \
                 FROM users u \
                 LEFT JOIN ratings r ON r.rated_user_id = u.id \
                 LEFT JOIN items i ON i.seller_id = u.id \
                 WHERE u.id = ?",
                [user_id.into()],
            ))
            .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(UserStats::default()),
        };

        Ok(UserStats {
            rating_count: row.try_get("", "rating_count")?,
            average_rating: row.try_get("", "average_rating")?,
            successful_transactions: row.try_get("", "successful_transactions")?,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        changes: ProfileChanges,
    ) -> AppResult<UserModel> {
        let existing = self.get_by_id(user_id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(Some(name));
        }
        if let Some(avatar) = changes.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(university) = changes.university {
            active.university = Set(Some(university));
        }
        if let Some(year) = changes.enrollment_year {
            active.enrollment_year = Set(Some(year));
        }
        active.updated_at = Set(now);

        Ok(active.update(&self.db).await?)
    }

    /// Fraction of the fixed optional-field set that is populated, as a
    /// percentage in steps of 20.
    pub fn profile_completeness(user: &UserModel) -> u32 {
        let populated = [
            user.name.is_some(),
            user.avatar.is_some(),
            user.bio.is_some(),
            user.university.is_some(),
            user.enrollment_year.is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count() as u32;

        populated * 20
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberType;

    fn base_user() -> UserModel {
        let now = chrono::Utc::now().naive_utc();
        UserModel {
            id: "u1".to_string(),
            email: "a@uni.edu".to_string(),
            password_hash: String::new(),
            name: None,
            member_type: MemberType::Student,
            verified: true,
            verification_token: None,
            verification_token_expires: None,
            avatar: None,
            bio: None,
            university: None,
            enrollment_year: None,
            student_id: None,
            join_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn completeness_empty_profile() {
        assert_eq!(UserService::profile_completeness(&base_user()), 0);
    }

    #[test]
    fn completeness_counts_each_field_as_twenty() {
        let mut user = base_user();
        user.name = Some("Alice".to_string());
        user.bio = Some("hi".to_string());
        assert_eq!(UserService::profile_completeness(&user), 40);
    }

    #[test]
    fn completeness_full_profile() {
        let mut user = base_user();
        user.name = Some("Alice".to_string());
        user.avatar = Some("/uploads/a.png".to_string());
        user.bio = Some("hi".to_string());
        user.university = Some("State".to_string());
        user.enrollment_year = Some(2022);
        assert_eq!(UserService::profile_completeness(&user), 100);
    }
}
