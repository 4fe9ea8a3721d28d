use crate::{
    error::{AppError, AppResult},
    models::{user, MemberType, User, UserModel},
    services::email::EmailService,
    services::pending::{PendingRegistration, PendingStore},
    utils::{encode_token, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter,
};

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stage a registration in the transient store and send (or log) the
    /// verification token. No user row is written until verification
    /// completes. Returns the temp id handed back to the client.
    pub async fn register_pending(
        &self,
        store: &PendingStore,
        email_service: &EmailService,
        email: &str,
        password: &str,
        member_type: MemberType,
        name: Option<String>,
    ) -> AppResult<String> {
        if self.email_exists(email).await? {
            return Err(AppError::Conflict(
                "This email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let now = chrono::Utc::now().naive_utc();
        let temp_id = uuid::Uuid::new_v4().to_string();
        let token = uuid::Uuid::new_v4().to_string();

        store.insert(PendingRegistration {
            temp_id: temp_id.clone(),
            email: email.to_string(),
            password_hash,
            member_type,
            name,
            verification_token: token.clone(),
            expires_at: now + store.ttl(),
            created_at: now,
        });

        if let Err(e) = email_service.send_verification_email(email, &token).await {
            tracing::warn!("Failed to send verification email: {e}");
        }

        Ok(temp_id)
    }

    /// Convert a transient registration into a durable user row and discard
    /// the transient record. `verified` is false for the skip path.
    async fn promote_pending(
        &self,
        registration: PendingRegistration,
        verified: bool,
    ) -> AppResult<UserModel> {
        if self.email_exists(&registration.email).await? {
            return Err(AppError::Conflict(
                "This email is already registered".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            email: Set(registration.email),
            password_hash: Set(registration.password_hash),
            name: Set(registration.name),
            member_type: Set(registration.member_type),
            verified: Set(verified),
            verification_token: Set(None),
            verification_token_expires: Set(None),
            avatar: Set(None),
            bio: Set(None),
            university: Set(None),
            enrollment_year: Set(None),
            student_id: Set(None),
            join_date: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Verify by temp id or token. The temp id and token paths consume the
    /// transient record; the token path also covers durable users that were
    /// created unverified (the skip flow) and later asked for a new token.
    pub async fn verify(
        &self,
        store: &PendingStore,
        token: Option<&str>,
        temp_id: Option<&str>,
    ) -> AppResult<UserModel> {
        if let Some(temp_id) = temp_id {
            let registration = store.take_by_temp_id(temp_id).ok_or_else(|| {
                AppError::Validation("Invalid or expired verification request".to_string())
            })?;
            return self.promote_pending(registration, true).await;
        }

        let token = token.ok_or_else(|| {
            AppError::Validation("Verification token is required".to_string())
        })?;

        if let Some(registration) = store.take_by_token(token) {
            return self.promote_pending(registration, true).await;
        }

        // Durable-user path: token issued by the resend endpoint.
        let user = User::find()
            .filter(user::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                AppError::Validation("Invalid or expired verification token".to_string())
            })?;

        if let Some(expires) = user.verification_token_expires {
            if chrono::Utc::now().naive_utc() > expires {
                return Err(AppError::Validation(
                    "Invalid or expired verification token".to_string(),
                ));
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.verified = Set(true);
        active.verification_token = Set(None);
        active.verification_token_expires = Set(None);
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Debug step: create the durable user without verification.
    pub async fn skip_verification(
        &self,
        store: &PendingStore,
        temp_id: &str,
    ) -> AppResult<UserModel> {
        let registration = store.take_by_temp_id(temp_id).ok_or_else(|| {
            AppError::Validation("Invalid or expired verification request".to_string())
        })?;
        self.promote_pending(registration, false).await
    }

    /// Issue a fresh verification token for an unverified durable user.
    /// Returns the token so development clients can complete the loop
    /// without a mailbox.
    pub async fn send_verification(
        &self,
        user_id: &str,
        email_service: &EmailService,
    ) -> AppResult<String> {
        let user = self.get_user_by_id(user_id).await?;
        if user.verified {
            return Err(AppError::Validation(
                "Email is already verified".to_string(),
            ));
        }

        let token = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().naive_utc();
        let expires = now + chrono::Duration::hours(24);

        let email = user.email.clone();
        let mut active: user::ActiveModel = user.into();
        active.verification_token = Set(Some(token.clone()));
        active.verification_token_expires = Set(Some(expires));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        if let Err(e) = email_service.send_verification_email(&email, &token).await {
            tracing::warn!("Failed to send verification email: {e}");
        }

        Ok(token)
    }

    /// Mark any user verified. Callers gate this behind the GENERAL
    /// member-type check.
    pub async fn admin_verify(&self, target_user_id: &str) -> AppResult<UserModel> {
        let user = self.get_user_by_id(target_user_id).await?;
        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.verified = Set(true);
        active.verification_token = Set(None);
        active.verification_token_expires = Set(None);
        active.updated_at = Set(now);
        Ok(active.update(&self.db).await?)
    }

    /// Login: any failure answers the same generic error so the response
    /// never reveals which field was wrong.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let is_valid = verify_password(password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = encode_token(&user)?;
        Ok((user, token))
    }

    pub async fn get_user_by_id(&self, id: &str) -> AppResult<UserModel> {
        User::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}
