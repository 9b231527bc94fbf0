//! Central dashboard state
//!
//! Owns the user store, the fast-path session, the local cache, and one
//! claim machine per quest card. The UI layer calls into this and renders
//! from it; nothing here touches the terminal.

use std::sync::Arc;
use std::time::Instant;

use crate::app::session::FastPathSession;
use crate::app::state::{StateEvent, UserStore};
use crate::learn::QuizRun;
use crate::progression::rank_for_xp;
use crate::quests::{
    daily_quests, milestone_quests, today_str, ClaimError, ClaimOutcome, QuestClaimMachine,
    TickEvent,
};
use crate::save::{save_cache, LocalCache};
use crate::service::{DataService, LeaderboardEntry};

/// A transient user-facing notice, rendered as an auto-dismissing toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

pub struct Dashboard {
    store: UserStore,
    session: FastPathSession,
    cache: LocalCache,
    daily: Vec<QuestClaimMachine>,
    milestones: Vec<QuestClaimMachine>,
    quest_date: String,
    leaderboard: Vec<LeaderboardEntry>,
    notices: Vec<Notice>,
}

impl Dashboard {
    pub fn new(service: Arc<dyn DataService>, cache: LocalCache) -> Self {
        let mut dash = Self {
            store: UserStore::new(service),
            session: FastPathSession::new(),
            cache,
            daily: Vec::new(),
            milestones: Vec::new(),
            quest_date: String::new(),
            leaderboard: Vec::new(),
            notices: Vec::new(),
        };
        dash.rebuild_quests();
        dash
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    pub fn session(&self) -> &FastPathSession {
        &self.session
    }

    pub fn daily_quests(&self) -> &[QuestClaimMachine] {
        &self.daily
    }

    pub fn milestone_quests(&self) -> &[QuestClaimMachine] {
        &self.milestones
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn quest_count(&self) -> usize {
        self.daily.len() + self.milestones.len()
    }

    /// Quest card by flat index: dailies first, then milestones.
    pub fn quest(&self, index: usize) -> Option<&QuestClaimMachine> {
        if index < self.daily.len() {
            self.daily.get(index)
        } else {
            self.milestones.get(index - self.daily.len())
        }
    }

    fn quest_mut(&mut self, index: usize) -> Option<&mut QuestClaimMachine> {
        if index < self.daily.len() {
            self.daily.get_mut(index)
        } else {
            let index = index - self.daily.len();
            self.milestones.get_mut(index)
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notices.push(Notice {
            text: text.into(),
            kind,
        });
    }

    /// (Re)build the quest cards from the static catalog, marking cards
    /// already present in the completions set. Also handles the daily
    /// rollover: a new date means a fresh set of daily ids.
    pub fn rebuild_quests(&mut self) {
        let date = today_str();
        let completions = self.store.completions().clone();
        self.daily = daily_quests(&date)
            .into_iter()
            .map(|def| {
                let done = completions.contains(&def.id);
                QuestClaimMachine::new(def, done)
            })
            .collect();
        self.milestones = milestone_quests()
            .into_iter()
            .map(|def| {
                let done = completions.contains(&def.id);
                QuestClaimMachine::new(def, done)
            })
            .collect();
        self.quest_date = date;
    }

    /// Re-mark cards against a freshly loaded completions set; completion
    /// data can arrive after the cards were built.
    fn sync_completions(&mut self) {
        let completions = self.store.completions().clone();
        for machine in self.daily.iter_mut().chain(self.milestones.iter_mut()) {
            if completions.contains(&machine.def().id) && !machine.is_claimed() {
                machine.mark_completed();
            }
        }
    }

    /// Connect an identity and load its state. Service failures surface as
    /// a notice; the dashboard keeps rendering.
    pub fn connect(&mut self, address: &str) {
        match self.store.connect(address) {
            Ok(()) => {
                self.rebuild_quests();
                if self.store.needs_profile() {
                    self.notice(
                        NoticeKind::Info,
                        "Welcome! Set up your profile in Settings.",
                    );
                }
            }
            Err(e) => {
                log::warn!("Connect failed: {}", e);
                self.notice(NoticeKind::Error, format!("Connection failed: {}", e));
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.store.disconnect();
        self.rebuild_quests();
    }

    pub fn activate_session(&mut self, now: Instant) {
        if self.store.is_connected() {
            self.session.activate(now);
        }
    }

    /// Advance timers: session activation, verify delays, credit retries.
    pub fn tick(&mut self, now: Instant) {
        if self.session.tick(now) {
            self.notice(
                NoticeKind::Success,
                "State compressed via Ephemeral Rollup (0ms)",
            );
        }

        let address = match self.store.address() {
            Some(a) => a.to_string(),
            None => return,
        };

        if self.quest_date != today_str() {
            log::info!("Daily rollover, rebuilding quest board");
            self.rebuild_quests();
        }

        let service = self.store.service_handle();
        let mut credited = false;
        let mut exhausted = false;
        for i in 0..self.quest_count() {
            let machine = match self.quest_mut(i) {
                Some(m) => m,
                None => continue,
            };
            match machine.tick(now, service.as_ref(), &address) {
                Some(TickEvent::Credited) => credited = true,
                Some(TickEvent::CreditExhausted) => exhausted = true,
                _ => {}
            }
        }
        if credited {
            self.notice(NoticeKind::Success, "Pending XP credited!");
            self.refresh();
        }
        if exhausted {
            self.notice(
                NoticeKind::Error,
                "XP credit still failing. Press R on the card to retry.",
            );
        }
    }

    /// Start a quest card. Returns the external link to show, if any.
    pub fn start_quest(&mut self, index: usize, now: Instant) -> Option<&'static str> {
        if !self.store.is_connected() {
            self.notice(NoticeKind::Error, "Connect a wallet first");
            return None;
        }
        let ctx = self.store.claim_context(self.session.is_active());
        let machine = self.quest_mut(index)?;
        match machine.start(&ctx, now) {
            Ok(link) => link,
            Err(e) => {
                self.notice(NoticeKind::Error, e.to_string());
                None
            }
        }
    }

    /// Submit the URL for a twitter-url card.
    pub fn submit_quest_url(&mut self, index: usize, url: &str) {
        let ctx = self.store.claim_context(self.session.is_active());
        let machine = match self.quest_mut(index) {
            Some(m) => m,
            None => return,
        };
        if let Err(e) = machine.submit_url(url, &ctx) {
            self.notice(NoticeKind::Error, e.to_string());
        }
    }

    /// Run the referral check for a referral-gated card.
    pub fn verify_quest_referrals(&mut self, index: usize) {
        let code = self.store.referral_code().map(str::to_string);
        let service = self.store.service_handle();
        let machine = match self.quest_mut(index) {
            Some(m) => m,
            None => return,
        };
        let result = machine.verify_referrals(service.as_ref(), code.as_deref());
        match result {
            Ok(()) => self.notice(NoticeKind::Success, "Referrals verified!"),
            Err(ClaimError::Validation(e)) => self.notice(NoticeKind::Error, e.to_string()),
            Err(ClaimError::Service(e)) => {
                log::warn!("Referral check failed: {}", e);
                self.notice(NoticeKind::Error, format!("Verification failed: {}", e));
            }
        }
    }

    /// The referral link for the connected identity, if a code is assigned.
    pub fn referral_link(&self) -> Option<String> {
        self.store
            .referral_code()
            .map(|code| format!("https://dailymagic.vercel.app/?ref={}", code))
    }

    /// Claim a verified card.
    pub fn claim_quest(&mut self, index: usize, now: Instant) {
        let address = match self.store.address() {
            Some(a) => a.to_string(),
            None => return,
        };
        let ctx = self.store.claim_context(self.session.is_active());
        let service = self.store.service_handle();
        let machine = match self.quest_mut(index) {
            Some(m) => m,
            None => return,
        };
        let xp = machine.def().xp;
        let result = machine.claim(service.as_ref(), &address, &ctx, now);
        match result {
            Ok(ClaimOutcome::Claimed) => {
                self.notice(NoticeKind::Success, format!("Claimed {} XP! ✦", xp));
                self.refresh();
            }
            Ok(ClaimOutcome::AlreadyClaimed) => {
                self.refresh();
            }
            Ok(ClaimOutcome::CreditPending) => {
                self.notice(
                    NoticeKind::Info,
                    "Claim recorded, XP credit pending — retrying...",
                );
            }
            Err(ClaimError::Validation(e)) => self.notice(NoticeKind::Error, e.to_string()),
            Err(ClaimError::Service(e)) => {
                log::warn!("Claim failed: {}", e);
                self.notice(NoticeKind::Error, format!("Claim failed: {}", e));
            }
        }
    }

    /// Re-arm a card whose XP credit retries are exhausted.
    pub fn retry_quest_credit(&mut self, index: usize, now: Instant) {
        if let Some(machine) = self.quest_mut(index) {
            machine.retry_credit(now);
        }
    }

    /// Re-read the backend snapshot and surface rank-ups.
    pub fn refresh(&mut self) {
        let old_rank = rank_for_xp(self.store.xp()).name;
        if let Err(e) = self.store.refresh() {
            log::warn!("Refresh failed: {}", e);
            self.notice(NoticeKind::Error, format!("Refresh failed: {}", e));
            return;
        }
        self.sync_completions();
        for event in self.store.drain_events() {
            if let StateEvent::XpChanged { to, .. } = event {
                let new_rank = rank_for_xp(to).name;
                if new_rank != old_rank {
                    self.notice(NoticeKind::Success, format!("Rank up: {}!", new_rank));
                }
            }
        }
    }

    pub fn refresh_leaderboard(&mut self) {
        match self.store.service().leaderboard(50) {
            Ok(rows) => self.leaderboard = rows,
            Err(e) => {
                log::warn!("Leaderboard fetch failed: {}", e);
                self.notice(NoticeKind::Error, format!("Leaderboard unavailable: {}", e));
            }
        }
    }

    /// Save a profile edit to the backend and mirror it in the local cache.
    pub fn save_profile(&mut self, name: &str, twitter: &str, discord: &str, referred_by: &str) {
        let referred_by = if referred_by.trim().is_empty() {
            None
        } else {
            Some(referred_by)
        };
        match self.store.update_profile(name, twitter, discord, referred_by) {
            Ok(()) => {
                self.cache.remember_profile(name, twitter, discord);
                self.persist_cache();
                self.notice(NoticeKind::Success, "Profile saved");
            }
            Err(e) => {
                log::warn!("Profile update failed: {}", e);
                self.notice(NoticeKind::Error, format!("Profile update failed: {}", e));
            }
        }
    }

    /// Record a finished quiz run. A pass pushes the bonus XP to the
    /// backend and to the local ledger; repeat passes are ignored.
    pub fn finish_quiz(&mut self, run: &QuizRun) {
        if !run.passed() {
            self.notice(
                NoticeKind::Info,
                format!("Scored {}/5. Score 3/5 or higher to earn XP.", run.score()),
            );
            return;
        }
        let topic = run.topic();
        if !self.cache.record_quiz_pass(topic.id, topic.xp_reward) {
            return;
        }
        self.persist_cache();
        if let Err(e) = self.store.credit_bonus_xp(topic.xp_reward) {
            log::warn!("Quiz bonus credit failed: {}", e);
        }
        self.notice(
            NoticeKind::Success,
            format!("Quiz passed! +{} XP", topic.xp_reward),
        );
    }

    pub fn acknowledge_risk(&mut self) {
        self.cache.risk_acknowledged = true;
        self.persist_cache();
    }

    pub fn toggle_theme(&mut self) {
        self.cache.toggle_theme();
        self.persist_cache();
    }

    fn persist_cache(&mut self) {
        if let Err(e) = save_cache(&self.cache) {
            log::warn!("Failed to save cache: {}", e);
        }
    }
}
