//! User store
//!
//! Holds the connected identity, its profile snapshot, and the completions
//! set, and queues typed change events the UI drains each frame. The store
//! owns the only handle to the data service; screens never talk to ambient
//! globals.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::quests::ClaimContext;
use crate::service::{DataService, Profile, ProfileUpdate, ServiceError};

/// Typed change notifications, drained by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    Connected,
    Disconnected,
    ProfileChanged,
    XpChanged { from: u64, to: u64 },
    CompletionsChanged,
}

pub struct UserStore {
    service: Arc<dyn DataService>,
    address: Option<String>,
    profile: Option<Profile>,
    completions: HashSet<String>,
    events: VecDeque<StateEvent>,
}

impl UserStore {
    pub fn new(service: Arc<dyn DataService>) -> Self {
        Self {
            service,
            address: None,
            profile: None,
            completions: HashSet::new(),
            events: VecDeque::new(),
        }
    }

    pub fn service(&self) -> &dyn DataService {
        self.service.as_ref()
    }

    /// Clone of the service handle, for callers that also need the store
    /// borrowed mutably.
    pub fn service_handle(&self) -> Arc<dyn DataService> {
        Arc::clone(&self.service)
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Last-fetched XP total. Authoritative only at the backend; this is the
    /// display snapshot refreshed after every claim.
    pub fn xp(&self) -> u64 {
        self.profile.as_ref().map(|p| p.xp).unwrap_or(0)
    }

    pub fn referral_code(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.referral_code.as_deref())
    }

    pub fn completions(&self) -> &HashSet<String> {
        &self.completions
    }

    /// Connected, profile exists, but no display name chosen yet.
    pub fn needs_profile(&self) -> bool {
        matches!(&self.profile, Some(p) if p.username.is_none())
    }

    /// Snapshot consulted by quest claim machines.
    pub fn claim_context(&self, session_active: bool) -> ClaimContext {
        ClaimContext {
            xp: self.xp(),
            twitter_handle: self
                .profile
                .as_ref()
                .and_then(|p| p.twitter_handle.clone()),
            session_active,
        }
    }

    pub fn drain_events(&mut self) -> Vec<StateEvent> {
        self.events.drain(..).collect()
    }

    /// Connect an identity: fetch-or-insert the profile, auto-assign a
    /// referral code when missing, and load the completions set.
    pub fn connect(&mut self, address: &str) -> Result<(), ServiceError> {
        let mut profile = match self.service.fetch_profile(address)? {
            Some(p) => p,
            None => self.service.insert_profile(address)?,
        };

        if profile.referral_code.is_none() {
            match self.service.assign_referral_code(address) {
                Ok(code) => {
                    log::info!("Assigned referral code {} to {}", code, address);
                    profile.referral_code = Some(code);
                }
                Err(ServiceError::NotConfigured) => {}
                Err(e) => log::warn!("Referral code assignment failed: {}", e),
            }
        }

        self.completions = self.service.list_completions(address)?;
        self.address = Some(address.to_string());
        self.profile = Some(profile);
        self.events.push_back(StateEvent::Connected);
        self.events.push_back(StateEvent::ProfileChanged);
        self.events.push_back(StateEvent::CompletionsChanged);
        log::info!("Connected {}", address);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.address.take().is_some() {
            self.profile = None;
            self.completions.clear();
            self.events.push_back(StateEvent::Disconnected);
        }
    }

    /// Re-read profile and completions after a claim or profile edit.
    pub fn refresh(&mut self) -> Result<(), ServiceError> {
        let address = match &self.address {
            Some(a) => a.clone(),
            None => return Ok(()),
        };
        let old_xp = self.xp();

        if let Some(profile) = self.service.fetch_profile(&address)? {
            let new_xp = profile.xp;
            self.profile = Some(profile);
            self.events.push_back(StateEvent::ProfileChanged);
            if new_xp != old_xp {
                self.events.push_back(StateEvent::XpChanged {
                    from: old_xp,
                    to: new_xp,
                });
            }
        }

        let completions = self.service.list_completions(&address)?;
        if completions != self.completions {
            self.completions = completions;
            self.events.push_back(StateEvent::CompletionsChanged);
        }
        Ok(())
    }

    /// Apply a profile edit and refresh the snapshot. The referrer field is
    /// only sent when the profile has none (first write wins, also enforced
    /// by the service).
    pub fn update_profile(
        &mut self,
        username: &str,
        twitter: &str,
        discord: &str,
        referred_by: Option<&str>,
    ) -> Result<(), ServiceError> {
        let address = match &self.address {
            Some(a) => a.clone(),
            None => return Ok(()),
        };
        let has_referrer = self
            .profile
            .as_ref()
            .map(|p| p.referred_by.is_some())
            .unwrap_or(false);

        let update = ProfileUpdate {
            username: Some(username.trim().to_string()),
            twitter_handle: Some(twitter.trim().trim_start_matches('@').to_string()),
            discord_handle: Some(discord.trim().to_string()),
            referred_by: match referred_by {
                Some(code) if !has_referrer && !code.trim().is_empty() => {
                    Some(code.trim().to_string())
                }
                _ => None,
            },
        };
        self.service.update_profile(&address, &update)?;
        self.refresh()
    }

    /// Push bonus XP (quiz passes) through the same atomic increment as
    /// quest claims, then refresh.
    pub fn credit_bonus_xp(&mut self, amount: u64) -> Result<(), ServiceError> {
        let address = match &self.address {
            Some(a) => a.clone(),
            None => return Ok(()),
        };
        self.service.increment_xp(&address, amount)?;
        self.refresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MemoryService;

    fn store() -> UserStore {
        UserStore::new(Arc::new(MemoryService::new()))
    }

    #[test]
    fn test_connect_creates_profile_and_code() {
        let mut store = store();
        store.connect("wallet1").unwrap();
        assert!(store.is_connected());
        let profile = store.profile().unwrap();
        assert_eq!(profile.wallet_address, "wallet1");
        assert!(profile.referral_code.is_some());
        assert!(store.needs_profile());

        let events = store.drain_events();
        assert!(events.contains(&StateEvent::Connected));
        assert!(events.contains(&StateEvent::ProfileChanged));
    }

    #[test]
    fn test_reconnect_sees_same_profile() {
        let service = Arc::new(MemoryService::new());
        let mut store = UserStore::new(service.clone());
        store.connect("wallet1").unwrap();
        let code = store.referral_code().unwrap().to_string();

        let mut other = UserStore::new(service);
        other.connect("wallet1").unwrap();
        assert_eq!(other.referral_code(), Some(code.as_str()));
    }

    #[test]
    fn test_update_profile_round_trip() {
        let mut store = store();
        store.connect("wallet1").unwrap();
        store
            .update_profile("alice", "@alice_x", "alice#1234", Some("FRIEND01"))
            .unwrap();

        let p = store.profile().unwrap();
        assert_eq!(p.username.as_deref(), Some("alice"));
        assert_eq!(p.twitter_handle.as_deref(), Some("alice_x"));
        assert_eq!(p.discord_handle.as_deref(), Some("alice#1234"));
        assert_eq!(p.referred_by.as_deref(), Some("FRIEND01"));
        assert!(!store.needs_profile());

        // Second referrer write is dropped
        store
            .update_profile("alice", "alice_x", "alice#1234", Some("OTHER999"))
            .unwrap();
        assert_eq!(
            store.profile().unwrap().referred_by.as_deref(),
            Some("FRIEND01")
        );
    }

    #[test]
    fn test_refresh_reports_xp_change() {
        let service = Arc::new(MemoryService::new());
        let mut store = UserStore::new(service.clone());
        store.connect("wallet1").unwrap();
        store.drain_events();

        service.increment_xp("wallet1", 75).unwrap();
        store.refresh().unwrap();
        let events = store.drain_events();
        assert!(events.contains(&StateEvent::XpChanged { from: 0, to: 75 }));
        assert_eq!(store.xp(), 75);
    }

    #[test]
    fn test_offline_store_stays_usable() {
        let mut store = UserStore::new(Arc::new(crate::service::OfflineService));
        store.connect("wallet1").unwrap();
        assert_eq!(store.xp(), 0);
        assert!(store.completions().is_empty());
        assert!(store.referral_code().is_none());
        // Writes are skipped silently
        store.update_profile("alice", "", "", None).unwrap();
        store.credit_bonus_xp(50).unwrap();
    }
}
