//! In-process reference backend
//!
//! Backs the test suite. Mirrors the constraints the real
//! backend enforces: unique (wallet, quest) completions, unique referral
//! codes with server-side collision retry, atomic XP increments.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use rand::Rng;

use super::{DataService, LeaderboardEntry, Profile, ProfileUpdate, ServiceError};

const CODE_LEN: usize = 8;
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_CODE_RETRIES: usize = 5;

#[derive(Default)]
struct Tables {
    users: HashMap<String, Profile>,
    /// (wallet, quest id) -> submission data
    completions: HashMap<(String, String), Option<String>>,
    codes: HashSet<String>,
}

/// In-memory data service.
#[derive(Default)]
pub struct MemoryService {
    tables: RwLock<Tables>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn random_code() -> String {
        let mut rng = rand::thread_rng();
        (0..CODE_LEN)
            .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
            .collect()
    }
}

impl DataService for MemoryService {
    fn fetch_profile(&self, address: &str) -> Result<Option<Profile>, ServiceError> {
        let t = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(t.users.get(address).cloned())
    }

    fn insert_profile(&self, address: &str) -> Result<Profile, ServiceError> {
        let mut t = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = t.users.get(address) {
            // Idempotent creation: first sight wins, later calls re-read
            return Ok(existing.clone());
        }
        let profile = Profile {
            wallet_address: address.to_string(),
            ..Profile::default()
        };
        t.users.insert(address.to_string(), profile.clone());
        Ok(profile)
    }

    fn update_profile(&self, address: &str, update: &ProfileUpdate) -> Result<(), ServiceError> {
        let mut t = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let profile = t.users.get_mut(address).ok_or(ServiceError::NotFound)?;
        if let Some(name) = &update.username {
            profile.username = Some(name.clone());
        }
        if let Some(handle) = &update.twitter_handle {
            profile.twitter_handle = Some(handle.clone());
        }
        if let Some(handle) = &update.discord_handle {
            profile.discord_handle = Some(handle.clone());
        }
        // First write wins; a referrer can never be swapped afterwards
        if profile.referred_by.is_none() {
            if let Some(code) = &update.referred_by {
                let code = code.trim();
                if !code.is_empty() {
                    profile.referred_by = Some(code.to_string());
                }
            }
        }
        Ok(())
    }

    fn list_completions(&self, address: &str) -> Result<HashSet<String>, ServiceError> {
        let t = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(t.completions
            .keys()
            .filter(|(wallet, _)| wallet == address)
            .map(|(_, quest)| quest.clone())
            .collect())
    }

    fn insert_completion(
        &self,
        address: &str,
        quest_id: &str,
        submission: Option<&str>,
    ) -> Result<(), ServiceError> {
        let mut t = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let key = (address.to_string(), quest_id.to_string());
        if t.completions.contains_key(&key) {
            return Err(ServiceError::Conflict);
        }
        t.completions.insert(key, submission.map(str::to_string));
        Ok(())
    }

    fn increment_xp(&self, address: &str, amount: u64) -> Result<(), ServiceError> {
        let mut t = self.tables.write().unwrap_or_else(|e| e.into_inner());
        let profile = t.users.get_mut(address).ok_or(ServiceError::NotFound)?;
        profile.xp = profile.xp.saturating_add(amount);
        Ok(())
    }

    fn count_referrals_by_code(&self, code: &str) -> Result<u32, ServiceError> {
        let t = self.tables.read().unwrap_or_else(|e| e.into_inner());
        Ok(t.users
            .values()
            .filter(|p| p.referred_by.as_deref() == Some(code))
            .count() as u32)
    }

    fn assign_referral_code(&self, address: &str) -> Result<String, ServiceError> {
        let mut t = self.tables.write().unwrap_or_else(|e| e.into_inner());
        if !t.users.contains_key(address) {
            return Err(ServiceError::NotFound);
        }
        for attempt in 0..MAX_CODE_RETRIES {
            let code = Self::random_code();
            if t.codes.contains(&code) {
                log::warn!(
                    "Referral code collision ({}), retrying ({}/{})",
                    code,
                    attempt + 1,
                    MAX_CODE_RETRIES
                );
                continue;
            }
            t.codes.insert(code.clone());
            if let Some(profile) = t.users.get_mut(address) {
                profile.referral_code = Some(code.clone());
            }
            return Ok(code);
        }
        Err(ServiceError::Conflict)
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let t = self.tables.read().unwrap_or_else(|e| e.into_inner());
        let mut rows: Vec<LeaderboardEntry> = t
            .users
            .values()
            .map(|p| LeaderboardEntry {
                wallet_address: p.wallet_address.clone(),
                username: p.username.clone(),
                twitter_handle: p.twitter_handle.clone(),
                xp: p.xp,
            })
            .collect();
        rows.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.wallet_address.cmp(&b.wallet_address)));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_profile_is_idempotent() {
        let svc = MemoryService::new();
        let a = svc.insert_profile("wallet1").unwrap();
        svc.update_profile(
            "wallet1",
            &ProfileUpdate {
                username: Some("alice".into()),
                ..ProfileUpdate::default()
            },
        )
        .unwrap();
        let b = svc.insert_profile("wallet1").unwrap();
        assert_eq!(a.wallet_address, b.wallet_address);
        assert_eq!(b.username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_profile_update_round_trip() {
        let svc = MemoryService::new();
        svc.insert_profile("wallet1").unwrap();
        svc.update_profile(
            "wallet1",
            &ProfileUpdate {
                username: Some("alice".into()),
                twitter_handle: Some("alice_x".into()),
                discord_handle: Some("alice#1234".into()),
                referred_by: None,
            },
        )
        .unwrap();

        let fetched = svc.fetch_profile("wallet1").unwrap().unwrap();
        assert_eq!(fetched.username.as_deref(), Some("alice"));
        assert_eq!(fetched.twitter_handle.as_deref(), Some("alice_x"));
        assert_eq!(fetched.discord_handle.as_deref(), Some("alice#1234"));
    }

    #[test]
    fn test_referred_by_first_write_wins() {
        let svc = MemoryService::new();
        svc.insert_profile("wallet1").unwrap();
        let set = |code: &str| ProfileUpdate {
            referred_by: Some(code.into()),
            ..ProfileUpdate::default()
        };
        svc.update_profile("wallet1", &set("CODE1111")).unwrap();
        svc.update_profile("wallet1", &set("CODE2222")).unwrap();
        let p = svc.fetch_profile("wallet1").unwrap().unwrap();
        assert_eq!(p.referred_by.as_deref(), Some("CODE1111"));
    }

    #[test]
    fn test_duplicate_completion_conflicts() {
        let svc = MemoryService::new();
        svc.insert_profile("wallet1").unwrap();
        svc.insert_completion("wallet1", "join_discord", None).unwrap();
        let err = svc
            .insert_completion("wallet1", "join_discord", None)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict));
        assert_eq!(svc.list_completions("wallet1").unwrap().len(), 1);
    }

    #[test]
    fn test_increment_xp_is_additive() {
        let svc = MemoryService::new();
        svc.insert_profile("wallet1").unwrap();
        svc.increment_xp("wallet1", 50).unwrap();
        svc.increment_xp("wallet1", 25).unwrap();
        assert_eq!(svc.fetch_profile("wallet1").unwrap().unwrap().xp, 75);
    }

    #[test]
    fn test_referral_code_assignment_and_count() {
        let svc = MemoryService::new();
        svc.insert_profile("referrer").unwrap();
        let code = svc.assign_referral_code("referrer").unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        for i in 0..3 {
            let addr = format!("friend{}", i);
            svc.insert_profile(&addr).unwrap();
            svc.update_profile(
                &addr,
                &ProfileUpdate {
                    referred_by: Some(code.clone()),
                    ..ProfileUpdate::default()
                },
            )
            .unwrap();
        }
        assert_eq!(svc.count_referrals_by_code(&code).unwrap(), 3);
        assert_eq!(svc.count_referrals_by_code("UNUSED00").unwrap(), 0);
    }

    #[test]
    fn test_leaderboard_ordered_by_xp() {
        let svc = MemoryService::new();
        for (addr, xp) in [("a", 10u64), ("b", 300), ("c", 150)] {
            svc.insert_profile(addr).unwrap();
            svc.increment_xp(addr, xp).unwrap();
        }
        let rows = svc.leaderboard(2).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].wallet_address, "b");
        assert_eq!(rows[1].wallet_address, "c");
    }
}
