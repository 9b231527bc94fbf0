//! Offline degradation
//!
//! Used when no backend endpoint is configured. Reads come back empty,
//! writes are skipped with a debug log, and nothing errors, so every screen
//! still renders.

use std::collections::HashSet;

use super::{DataService, LeaderboardEntry, Profile, ProfileUpdate, ServiceError};

pub struct OfflineService;

impl DataService for OfflineService {
    fn fetch_profile(&self, _address: &str) -> Result<Option<Profile>, ServiceError> {
        Ok(None)
    }

    fn insert_profile(&self, address: &str) -> Result<Profile, ServiceError> {
        log::debug!("offline: skipping profile insert for {}", address);
        Ok(Profile {
            wallet_address: address.to_string(),
            ..Profile::default()
        })
    }

    fn update_profile(&self, address: &str, _update: &ProfileUpdate) -> Result<(), ServiceError> {
        log::debug!("offline: skipping profile update for {}", address);
        Ok(())
    }

    fn list_completions(&self, _address: &str) -> Result<HashSet<String>, ServiceError> {
        Ok(HashSet::new())
    }

    fn insert_completion(
        &self,
        address: &str,
        quest_id: &str,
        _submission: Option<&str>,
    ) -> Result<(), ServiceError> {
        log::debug!("offline: skipping completion {} for {}", quest_id, address);
        Ok(())
    }

    fn increment_xp(&self, address: &str, amount: u64) -> Result<(), ServiceError> {
        log::debug!("offline: skipping +{} XP for {}", amount, address);
        Ok(())
    }

    fn count_referrals_by_code(&self, _code: &str) -> Result<u32, ServiceError> {
        Ok(0)
    }

    fn assign_referral_code(&self, _address: &str) -> Result<String, ServiceError> {
        Err(ServiceError::NotConfigured)
    }

    fn leaderboard(&self, _limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        Ok(Vec::new())
    }
}
