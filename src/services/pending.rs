use chrono::{Duration, NaiveDateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::models::MemberType;

/// A registration held in memory until email verification completes.
/// Never persisted: a restart discards all pending registrations.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub temp_id: String,
    pub email: String,
    pub password_hash: String,
    pub member_type: MemberType,
    pub name: Option<String>,
    pub verification_token: String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Short-lived key-value store for transient registrations, injected as a
/// dependency so tests can construct one with an arbitrary TTL. Expired
/// entries are evicted opportunistically on insert and lookup; there is no
/// background sweep.
#[derive(Clone)]
pub struct PendingStore {
    entries: Arc<DashMap<String, PendingRegistration>>,
    ttl: Duration,
}

impl PendingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn from_env() -> Self {
        let hours: i64 = std::env::var("PENDING_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);
        Self::new(Duration::hours(hours))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a new pending registration keyed by its temp id.
    pub fn insert(&self, registration: PendingRegistration) {
        self.evict_expired();
        self.entries
            .insert(registration.temp_id.clone(), registration);
    }

    /// Remove and return the registration for `temp_id`, if present and not
    /// expired. Expired entries are dropped and answer None.
    pub fn take_by_temp_id(&self, temp_id: &str) -> Option<PendingRegistration> {
        let (_, registration) = self.entries.remove(temp_id)?;
        if self.is_expired(&registration) {
            return None;
        }
        Some(registration)
    }

    /// Remove and return the registration matching a verification token.
    pub fn take_by_token(&self, token: &str) -> Option<PendingRegistration> {
        let temp_id = self
            .entries
            .iter()
            .find(|entry| entry.value().verification_token == token)
            .map(|entry| entry.key().clone())?;
        self.take_by_temp_id(&temp_id)
    }

    /// True if any live pending registration holds this email.
    pub fn contains_email(&self, email: &str) -> bool {
        self.evict_expired();
        self.entries.iter().any(|entry| entry.value().email == email)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_expired(&self, registration: &PendingRegistration) -> bool {
        Utc::now().naive_utc() > registration.expires_at
    }

    fn evict_expired(&self) {
        let now = Utc::now().naive_utc();
        self.entries.retain(|_, registration| registration.expires_at >= now);
    }
}
