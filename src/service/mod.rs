//! Remote data service
//!
//! The authoritative user records (profiles, quest completions, XP totals)
//! live in a remote relational backend. This module defines the
//! request/response contract the rest of the crate consumes, plus three
//! implementations: a REST client, an in-process reference backend, and an
//! offline no-op used when no backend is configured.

pub mod memory;
pub mod offline;
pub mod rest;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryService;
pub use offline::OfflineService;
pub use rest::RestService;

/// A user record as stored by the backend.
///
/// `rank` is deliberately absent: it is derived from `xp` at read time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub wallet_address: String,
    pub username: Option<String>,
    pub twitter_handle: Option<String>,
    pub discord_handle: Option<String>,
    #[serde(default)]
    pub xp: u64,
    pub referral_code: Option<String>,
    pub referred_by: Option<String>,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub twitter_handle: Option<String>,
    pub discord_handle: Option<String>,
    /// Applied only if the profile has no referrer yet (first write wins).
    pub referred_by: Option<String>,
}

/// One leaderboard row, ordered by XP descending.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardEntry {
    pub wallet_address: String,
    pub username: Option<String>,
    pub twitter_handle: Option<String>,
    #[serde(default)]
    pub xp: u64,
}

/// Errors a service call can produce.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested record does not exist.
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint was violated (duplicate completion,
    /// referral-code collision). Callers treat duplicate claims as success.
    #[error("duplicate record")]
    Conflict,

    /// Network or backend failure. Transient and retryable.
    #[error("service unavailable: {0}")]
    Transport(String),

    /// No backend is configured; reads degrade to empty, writes are skipped.
    #[error("data service not configured")]
    NotConfigured,
}

/// The collaborator contract.
///
/// All calls are short-lived blocking requests driven from the UI thread.
pub trait DataService: Send + Sync {
    /// Fetch a profile, `Ok(None)` when the identity has never been seen.
    fn fetch_profile(&self, address: &str) -> Result<Option<Profile>, ServiceError>;

    /// Create a bare profile for a first-seen identity.
    fn insert_profile(&self, address: &str) -> Result<Profile, ServiceError>;

    /// Apply a partial update. `referred_by` only lands if currently unset.
    fn update_profile(&self, address: &str, update: &ProfileUpdate) -> Result<(), ServiceError>;

    /// Quest ids this identity has already completed.
    fn list_completions(&self, address: &str) -> Result<HashSet<String>, ServiceError>;

    /// Record a quest completion. `Err(Conflict)` on a duplicate claim.
    fn insert_completion(
        &self,
        address: &str,
        quest_id: &str,
        submission: Option<&str>,
    ) -> Result<(), ServiceError>;

    /// Atomically add `amount` to the stored XP total.
    fn increment_xp(&self, address: &str, amount: u64) -> Result<(), ServiceError>;

    /// Number of profiles whose referrer field equals `code`.
    fn count_referrals_by_code(&self, code: &str) -> Result<u32, ServiceError>;

    /// Assign a fresh unique referral code to this identity. The backend
    /// generates the code and retries on collision.
    fn assign_referral_code(&self, address: &str) -> Result<String, ServiceError>;

    /// Top `limit` profiles by XP.
    fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError>;
}

/// Build the service from the environment: a REST client when an endpoint is
/// configured, the in-memory backend in demo mode, otherwise the offline
/// no-op so the UI stays usable.
pub fn from_env() -> Arc<dyn DataService> {
    if std::env::var("DAILYMAGIC_DEMO").is_ok() {
        log::info!("DAILYMAGIC_DEMO set, using the in-memory backend");
        return Arc::new(MemoryService::new());
    }
    match (
        std::env::var("DAILYMAGIC_API_URL"),
        std::env::var("DAILYMAGIC_API_KEY"),
    ) {
        (Ok(url), Ok(key)) if !url.is_empty() && !key.is_empty() => {
            match RestService::new(&url, &key) {
                Ok(svc) => {
                    log::info!("Using REST data service at {}", url);
                    Arc::new(svc)
                }
                Err(e) => {
                    log::warn!("Failed to build REST client: {}. Running offline.", e);
                    Arc::new(OfflineService)
                }
            }
        }
        _ => {
            log::info!("DAILYMAGIC_API_URL/KEY not set, running offline");
            Arc::new(OfflineService)
        }
    }
}
