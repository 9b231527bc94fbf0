//! Quest claim state machine
//!
//! One machine per quest card, driving `Idle -> Verifying -> Verified ->
//! Claimed` with validation rules keyed by the quest's validation kind. The
//! variants are data on the quest definition, not separate machines.
//!
//! Claiming performs two independent remote writes: record the completion,
//! then credit the XP. A duplicate-key conflict on the first write means the
//! quest was already claimed and is treated as success without crediting
//! again. A failed credit after a recorded completion parks the machine in
//! `Crediting` and retries with bounded backoff; `Claimed` is only reached
//! once both writes have landed.

use std::time::{Duration, Instant};

use thiserror::Error;

use super::catalog::{QuestDef, ValidationKind};
use crate::service::{DataService, ServiceError};

/// Fixed delay before a no-validation quest auto-verifies.
pub const VERIFY_DELAY: Duration = Duration::from_secs(3);

/// Backoff schedule for XP-credit retries after a recorded completion.
const CREDIT_BACKOFF: [Duration; 3] = [
    Duration::from_secs(2),
    Duration::from_secs(4),
    Duration::from_secs(8),
];

/// User-correctable validation failures. Never sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please paste a link")]
    EmptyUrl,
    #[error("Must be a twitter.com or x.com link")]
    WrongDomain,
    #[error("The link must contain your X username.")]
    HandleMismatch,
    #[error("You need at least {required} XP (Wizard Rank) to claim this!")]
    InsufficientXp { required: u64 },
    #[error("Invited {have}/{need} friends so far. Keep sharing your link!")]
    InsufficientReferrals { have: u32, need: u32 },
    #[error("Set up your profile to get a referral code first")]
    MissingReferralCode,
}

/// Anything a claim-path call can fail with.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Card lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    Idle,
    /// Waiting for the fixed delay (`deadline` set) or, for URL-validated
    /// quests, for the user's submission (`deadline` unset).
    Verifying { deadline: Option<Instant> },
    /// Referral-gated sub-state: the card offers "copy referral link" and
    /// "verify". `last_count` is the most recent insufficient count.
    ReferralCheck { last_count: Option<u32> },
    Verified,
    /// Completion recorded but XP not yet credited. `next_try` is the next
    /// scheduled retry; `None` means retries are exhausted and a manual
    /// retry is required.
    Crediting { attempts: u32, next_try: Option<Instant> },
    Claimed,
}

/// Read-only snapshot the machine consults. Owned by the caller; the
/// authoritative XP lives at the backend.
#[derive(Debug, Clone, Default)]
pub struct ClaimContext {
    pub xp: u64,
    pub twitter_handle: Option<String>,
    pub session_active: bool,
}

/// Result of a successful claim call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Both writes landed; celebrate and refresh aggregate state.
    Claimed,
    /// The completion already existed; no XP was credited again.
    AlreadyClaimed,
    /// Completion recorded, XP credit pending retry.
    CreditPending,
}

/// Events produced by `tick` for the UI to surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    Verified,
    /// A pending XP credit landed; the claim is now complete.
    Credited,
    CreditRetryScheduled { attempts: u32 },
    /// Retries exhausted; waiting for a manual retry.
    CreditExhausted,
}

pub struct QuestClaimMachine {
    def: QuestDef,
    state: ClaimState,
    submitted_url: Option<String>,
}

impl QuestClaimMachine {
    /// Build a machine for a quest. A quest already present in the
    /// completions set initializes directly into `Claimed`.
    pub fn new(def: QuestDef, already_completed: bool) -> Self {
        let state = if already_completed {
            ClaimState::Claimed
        } else {
            ClaimState::Idle
        };
        Self {
            def,
            state,
            submitted_url: None,
        }
    }

    pub fn def(&self) -> &QuestDef {
        &self.def
    }

    pub fn state(&self) -> &ClaimState {
        &self.state
    }

    pub fn is_claimed(&self) -> bool {
        matches!(self.state, ClaimState::Claimed)
    }

    /// Sync against a freshly loaded completions set. Completion data can
    /// arrive after the card was built.
    pub fn mark_completed(&mut self) {
        self.set_state(ClaimState::Claimed);
    }

    fn set_state(&mut self, state: ClaimState) {
        if self.state != state {
            log::debug!("Quest {}: {:?} -> {:?}", self.def.id, self.state, state);
            self.state = state;
        }
    }

    /// Start the quest. Returns the external link to open, if any.
    /// An xp-gated quest with insufficient XP stays `Idle` and errors.
    pub fn start(
        &mut self,
        ctx: &ClaimContext,
        now: Instant,
    ) -> Result<Option<&'static str>, ValidationError> {
        if self.state != ClaimState::Idle {
            return Ok(None);
        }
        match self.def.validation {
            ValidationKind::None => {
                if ctx.session_active {
                    self.set_state(ClaimState::Verified);
                } else {
                    self.set_state(ClaimState::Verifying {
                        deadline: Some(now + VERIFY_DELAY),
                    });
                }
                Ok(self.def.link)
            }
            ValidationKind::TwitterUrl => {
                self.set_state(ClaimState::Verifying { deadline: None });
                Ok(None)
            }
            ValidationKind::XpGate { required } => {
                if ctx.xp < required {
                    return Err(ValidationError::InsufficientXp { required });
                }
                self.set_state(ClaimState::Verified);
                Ok(None)
            }
            ValidationKind::ReferralGate { .. } => {
                self.set_state(ClaimState::ReferralCheck { last_count: None });
                Ok(None)
            }
        }
    }

    /// Submit the URL for a twitter-url quest. Valid submissions move the
    /// card to `Verified`; the URL is kept as claim submission data.
    pub fn submit_url(&mut self, url: &str, ctx: &ClaimContext) -> Result<(), ValidationError> {
        if !matches!(self.state, ClaimState::Verifying { deadline: None })
            || self.def.validation != ValidationKind::TwitterUrl
        {
            return Ok(());
        }
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        let lowered = url.to_lowercase();
        if !lowered.contains("twitter.com") && !lowered.contains("x.com") {
            return Err(ValidationError::WrongDomain);
        }
        if let Some(handle) = &ctx.twitter_handle {
            let handle = handle.trim_start_matches('@').to_lowercase();
            if !handle.is_empty() && !lowered.contains(&handle) {
                return Err(ValidationError::HandleMismatch);
            }
        }
        self.submitted_url = Some(url.to_string());
        self.set_state(ClaimState::Verified);
        Ok(())
    }

    /// Verify the referral gate: count profiles referred by `code` and
    /// require the quest's threshold. Insufficient counts keep the
    /// sub-state and report the current tally.
    pub fn verify_referrals(
        &mut self,
        service: &dyn DataService,
        code: Option<&str>,
    ) -> Result<(), ClaimError> {
        let required = match self.def.validation {
            ValidationKind::ReferralGate { required } => required,
            _ => return Ok(()),
        };
        if !matches!(self.state, ClaimState::ReferralCheck { .. }) {
            return Ok(());
        }
        let code = code.ok_or(ValidationError::MissingReferralCode)?;
        let count = service.count_referrals_by_code(code)?;
        if count >= required {
            self.set_state(ClaimState::Verified);
            Ok(())
        } else {
            self.set_state(ClaimState::ReferralCheck {
                last_count: Some(count),
            });
            Err(ValidationError::InsufficientReferrals {
                have: count,
                need: required,
            }
            .into())
        }
    }

    /// Advance time-driven transitions: the fixed verify delay and pending
    /// XP-credit retries.
    pub fn tick(
        &mut self,
        now: Instant,
        service: &dyn DataService,
        address: &str,
    ) -> Option<TickEvent> {
        match self.state {
            ClaimState::Verifying {
                deadline: Some(deadline),
            } if now >= deadline => {
                self.set_state(ClaimState::Verified);
                Some(TickEvent::Verified)
            }
            ClaimState::Crediting {
                attempts,
                next_try: Some(next_try),
            } if now >= next_try => match service.increment_xp(address, self.def.xp) {
                Ok(()) => {
                    self.set_state(ClaimState::Claimed);
                    Some(TickEvent::Credited)
                }
                Err(e) => {
                    let attempts = attempts + 1;
                    log::warn!(
                        "XP credit for quest {} failed (attempt {}): {}",
                        self.def.id,
                        attempts,
                        e
                    );
                    if let Some(backoff) = CREDIT_BACKOFF.get(attempts as usize - 1) {
                        self.set_state(ClaimState::Crediting {
                            attempts,
                            next_try: Some(now + *backoff),
                        });
                        Some(TickEvent::CreditRetryScheduled { attempts })
                    } else {
                        self.set_state(ClaimState::Crediting {
                            attempts,
                            next_try: None,
                        });
                        Some(TickEvent::CreditExhausted)
                    }
                }
            },
            _ => None,
        }
    }

    /// Manually re-arm an exhausted XP-credit retry.
    pub fn retry_credit(&mut self, now: Instant) {
        if let ClaimState::Crediting {
            attempts,
            next_try: None,
        } = self.state
        {
            self.set_state(ClaimState::Crediting {
                attempts,
                next_try: Some(now),
            });
        }
    }

    /// Perform the claim: record the completion, then credit the XP.
    ///
    /// A duplicate-key conflict on the completion insert means the quest was
    /// already claimed: the card moves to `Claimed` and no XP call is made.
    /// Any other insert failure leaves the card `Verified` (retryable). A
    /// failed credit enters `Crediting` with the retry schedule.
    pub fn claim(
        &mut self,
        service: &dyn DataService,
        address: &str,
        ctx: &ClaimContext,
        now: Instant,
    ) -> Result<ClaimOutcome, ClaimError> {
        match self.state {
            ClaimState::Verified => {}
            ClaimState::Claimed => return Ok(ClaimOutcome::AlreadyClaimed),
            _ => return Err(ServiceError::Conflict.into()),
        }

        // The XP gate is rechecked right before writing; a regressed total
        // aborts back to Idle
        if let ValidationKind::XpGate { required } = self.def.validation {
            if ctx.xp < required {
                self.set_state(ClaimState::Idle);
                return Err(ValidationError::InsufficientXp { required }.into());
            }
        }

        match service.insert_completion(address, &self.def.id, self.submitted_url.as_deref()) {
            Ok(()) => {}
            Err(ServiceError::Conflict) => {
                log::info!("Quest {} already claimed for {}", self.def.id, address);
                self.set_state(ClaimState::Claimed);
                return Ok(ClaimOutcome::AlreadyClaimed);
            }
            Err(e) => {
                log::warn!("Recording completion of {} failed: {}", self.def.id, e);
                return Err(e.into());
            }
        }

        match service.increment_xp(address, self.def.xp) {
            Ok(()) => {
                self.set_state(ClaimState::Claimed);
                Ok(ClaimOutcome::Claimed)
            }
            Err(e) => {
                log::warn!(
                    "Completion of {} recorded but XP credit failed: {}",
                    self.def.id,
                    e
                );
                self.set_state(ClaimState::Crediting {
                    attempts: 1,
                    next_try: Some(now + CREDIT_BACKOFF[0]),
                });
                Ok(ClaimOutcome::CreditPending)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quests::catalog::{milestone_quests, QuestDef, ValidationKind};
    use crate::service::{MemoryService, Profile, ProfileUpdate};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn quest(validation: ValidationKind) -> QuestDef {
        QuestDef {
            id: "test_quest".into(),
            title: "Test",
            description: "Test quest",
            xp: 50,
            link: Some("https://example.org"),
            validation,
            daily: false,
        }
    }

    fn ctx(xp: u64) -> ClaimContext {
        ClaimContext {
            xp,
            twitter_handle: None,
            session_active: false,
        }
    }

    /// Wraps the in-memory backend with a switchable XP-credit failure.
    struct FlakyCredit {
        inner: MemoryService,
        fail_increment: AtomicBool,
    }

    impl FlakyCredit {
        fn new() -> Self {
            Self {
                inner: MemoryService::new(),
                fail_increment: AtomicBool::new(false),
            }
        }
    }

    impl crate::service::DataService for FlakyCredit {
        fn fetch_profile(&self, a: &str) -> Result<Option<Profile>, ServiceError> {
            self.inner.fetch_profile(a)
        }
        fn insert_profile(&self, a: &str) -> Result<Profile, ServiceError> {
            self.inner.insert_profile(a)
        }
        fn update_profile(&self, a: &str, u: &ProfileUpdate) -> Result<(), ServiceError> {
            self.inner.update_profile(a, u)
        }
        fn list_completions(&self, a: &str) -> Result<HashSet<String>, ServiceError> {
            self.inner.list_completions(a)
        }
        fn insert_completion(
            &self,
            a: &str,
            q: &str,
            s: Option<&str>,
        ) -> Result<(), ServiceError> {
            self.inner.insert_completion(a, q, s)
        }
        fn increment_xp(&self, a: &str, amount: u64) -> Result<(), ServiceError> {
            if self.fail_increment.load(Ordering::SeqCst) {
                return Err(ServiceError::Transport("injected".into()));
            }
            self.inner.increment_xp(a, amount)
        }
        fn count_referrals_by_code(&self, c: &str) -> Result<u32, ServiceError> {
            self.inner.count_referrals_by_code(c)
        }
        fn assign_referral_code(&self, a: &str) -> Result<String, ServiceError> {
            self.inner.assign_referral_code(a)
        }
        fn leaderboard(
            &self,
            l: usize,
        ) -> Result<Vec<crate::service::LeaderboardEntry>, ServiceError> {
            self.inner.leaderboard(l)
        }
    }

    #[test]
    fn test_initializes_claimed_from_prior_completion() {
        let m = QuestClaimMachine::new(quest(ValidationKind::None), true);
        assert!(m.is_claimed());
    }

    #[test]
    fn test_none_kind_auto_verifies_after_delay() {
        let svc = MemoryService::new();
        svc.insert_profile("w").unwrap();
        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let now = Instant::now();

        let link = m.start(&ctx(0), now).unwrap();
        assert_eq!(link, Some("https://example.org"));
        assert!(matches!(m.state(), ClaimState::Verifying { .. }));

        assert_eq!(m.tick(now + Duration::from_secs(1), &svc, "w"), None);
        assert_eq!(
            m.tick(now + VERIFY_DELAY, &svc, "w"),
            Some(TickEvent::Verified)
        );
        assert_eq!(*m.state(), ClaimState::Verified);
    }

    #[test]
    fn test_fast_path_session_skips_delay() {
        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let mut c = ctx(0);
        c.session_active = true;
        m.start(&c, Instant::now()).unwrap();
        assert_eq!(*m.state(), ClaimState::Verified);
    }

    #[test]
    fn test_xp_gate_start() {
        let mut m =
            QuestClaimMachine::new(quest(ValidationKind::XpGate { required: 100 }), false);
        let err = m.start(&ctx(99), Instant::now()).unwrap_err();
        assert_eq!(err, ValidationError::InsufficientXp { required: 100 });
        assert_eq!(*m.state(), ClaimState::Idle);

        m.start(&ctx(100), Instant::now()).unwrap();
        assert_eq!(*m.state(), ClaimState::Verified);
    }

    #[test]
    fn test_xp_gate_rechecked_at_claim_time() {
        let svc = MemoryService::new();
        svc.insert_profile("w").unwrap();
        let mut m =
            QuestClaimMachine::new(quest(ValidationKind::XpGate { required: 100 }), false);
        m.start(&ctx(100), Instant::now()).unwrap();

        // XP regressed between verification and claim
        let err = m.claim(&svc, "w", &ctx(99), Instant::now()).unwrap_err();
        assert!(matches!(
            err,
            ClaimError::Validation(ValidationError::InsufficientXp { .. })
        ));
        assert_eq!(*m.state(), ClaimState::Idle);
    }

    #[test]
    fn test_twitter_url_validation() {
        let mut m = QuestClaimMachine::new(quest(ValidationKind::TwitterUrl), false);
        let mut c = ctx(0);
        c.twitter_handle = Some("bob".into());
        m.start(&c, Instant::now()).unwrap();

        assert_eq!(
            m.submit_url("https://example.com", &c).unwrap_err(),
            ValidationError::WrongDomain
        );
        assert_eq!(
            m.submit_url("https://x.com/alice/status/1", &c).unwrap_err(),
            ValidationError::HandleMismatch
        );
        assert!(matches!(m.state(), ClaimState::Verifying { .. }));

        m.submit_url("https://x.com/bob/status/1", &c).unwrap();
        assert_eq!(*m.state(), ClaimState::Verified);
    }

    #[test]
    fn test_twitter_url_handle_is_case_insensitive_and_at_stripped() {
        let mut m = QuestClaimMachine::new(quest(ValidationKind::TwitterUrl), false);
        let mut c = ctx(0);
        c.twitter_handle = Some("@Bob".into());
        m.start(&c, Instant::now()).unwrap();
        m.submit_url("https://Twitter.com/BOB/status/9", &c).unwrap();
        assert_eq!(*m.state(), ClaimState::Verified);
    }

    #[test]
    fn test_submitted_url_recorded_with_completion() {
        let svc = MemoryService::new();
        svc.insert_profile("w").unwrap();
        let mut m = QuestClaimMachine::new(quest(ValidationKind::TwitterUrl), false);
        let c = ctx(0);
        m.start(&c, Instant::now()).unwrap();
        m.submit_url("https://x.com/anyone/status/1", &c).unwrap();
        let outcome = m.claim(&svc, "w", &c, Instant::now()).unwrap();
        assert_eq!(outcome, ClaimOutcome::Claimed);
        assert!(svc.list_completions("w").unwrap().contains("test_quest"));
    }

    #[test]
    fn test_referral_gate() {
        let svc = MemoryService::new();
        svc.insert_profile("referrer").unwrap();
        let code = svc.assign_referral_code("referrer").unwrap();
        for i in 0..2 {
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

        let mut m =
            QuestClaimMachine::new(quest(ValidationKind::ReferralGate { required: 3 }), false);
        m.start(&ctx(0), Instant::now()).unwrap();
        assert!(matches!(m.state(), ClaimState::ReferralCheck { .. }));

        let err = m.verify_referrals(&svc, Some(&code)).unwrap_err();
        assert!(err.to_string().contains("2/3"));
        assert_eq!(
            *m.state(),
            ClaimState::ReferralCheck {
                last_count: Some(2)
            }
        );

        // Third referral arrives
        svc.insert_profile("friend2").unwrap();
        svc.update_profile(
            "friend2",
            &ProfileUpdate {
                referred_by: Some(code.clone()),
                ..ProfileUpdate::default()
            },
        )
        .unwrap();
        m.verify_referrals(&svc, Some(&code)).unwrap();
        assert_eq!(*m.state(), ClaimState::Verified);
    }

    #[test]
    fn test_duplicate_claim_is_idempotent() {
        let svc = MemoryService::new();
        svc.insert_profile("w").unwrap();
        svc.increment_xp("w", 50).unwrap();
        // Completion already on record from an earlier session
        svc.insert_completion("w", "test_quest", None).unwrap();

        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let mut c = ctx(50);
        c.session_active = true;
        m.start(&c, Instant::now()).unwrap();
        let outcome = m.claim(&svc, "w", &c, Instant::now()).unwrap();

        assert_eq!(outcome, ClaimOutcome::AlreadyClaimed);
        assert!(m.is_claimed());
        // No second credit happened
        assert_eq!(svc.fetch_profile("w").unwrap().unwrap().xp, 50);
    }

    #[test]
    fn test_successful_claim_credits_once() {
        let svc = MemoryService::new();
        svc.insert_profile("w").unwrap();
        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let mut c = ctx(0);
        c.session_active = true;
        m.start(&c, Instant::now()).unwrap();
        assert_eq!(
            m.claim(&svc, "w", &c, Instant::now()).unwrap(),
            ClaimOutcome::Claimed
        );
        assert_eq!(svc.fetch_profile("w").unwrap().unwrap().xp, 50);
    }

    #[test]
    fn test_failed_credit_retries_then_lands() {
        let svc = FlakyCredit::new();
        svc.inner.insert_profile("w").unwrap();
        svc.fail_increment.store(true, Ordering::SeqCst);

        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let mut c = ctx(0);
        c.session_active = true;
        let now = Instant::now();
        m.start(&c, now).unwrap();

        assert_eq!(
            m.claim(&svc, "w", &c, now).unwrap(),
            ClaimOutcome::CreditPending
        );
        assert!(matches!(m.state(), ClaimState::Crediting { attempts: 1, .. }));
        // Completion is on record even though the credit is pending
        assert!(svc.inner.list_completions("w").unwrap().contains("test_quest"));

        // Backend recovers before the first retry fires
        svc.fail_increment.store(false, Ordering::SeqCst);
        let event = m.tick(now + Duration::from_secs(2), &svc, "w");
        assert_eq!(event, Some(TickEvent::Credited));
        assert!(m.is_claimed());
        assert_eq!(svc.inner.fetch_profile("w").unwrap().unwrap().xp, 50);
    }

    #[test]
    fn test_credit_retries_exhaust_then_manual_retry() {
        let svc = FlakyCredit::new();
        svc.inner.insert_profile("w").unwrap();
        svc.fail_increment.store(true, Ordering::SeqCst);

        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let mut c = ctx(0);
        c.session_active = true;
        let mut now = Instant::now();
        m.start(&c, now).unwrap();
        m.claim(&svc, "w", &c, now).unwrap();

        // Burn through the whole backoff schedule
        for _ in 0..3 {
            now += Duration::from_secs(10);
            m.tick(now, &svc, "w");
        }
        assert_eq!(
            *m.state(),
            ClaimState::Crediting {
                attempts: 4,
                next_try: None
            }
        );

        // Manual retry after the backend recovers
        svc.fail_increment.store(false, Ordering::SeqCst);
        m.retry_credit(now);
        assert_eq!(m.tick(now, &svc, "w"), Some(TickEvent::Credited));
        assert!(m.is_claimed());
        assert_eq!(svc.inner.fetch_profile("w").unwrap().unwrap().xp, 50);
    }

    #[test]
    fn test_failed_insert_keeps_verified() {
        struct BrokenInsert(MemoryService);
        impl crate::service::DataService for BrokenInsert {
            fn fetch_profile(&self, a: &str) -> Result<Option<Profile>, ServiceError> {
                self.0.fetch_profile(a)
            }
            fn insert_profile(&self, a: &str) -> Result<Profile, ServiceError> {
                self.0.insert_profile(a)
            }
            fn update_profile(&self, a: &str, u: &ProfileUpdate) -> Result<(), ServiceError> {
                self.0.update_profile(a, u)
            }
            fn list_completions(&self, a: &str) -> Result<HashSet<String>, ServiceError> {
                self.0.list_completions(a)
            }
            fn insert_completion(
                &self,
                _: &str,
                _: &str,
                _: Option<&str>,
            ) -> Result<(), ServiceError> {
                Err(ServiceError::Transport("down".into()))
            }
            fn increment_xp(&self, a: &str, x: u64) -> Result<(), ServiceError> {
                self.0.increment_xp(a, x)
            }
            fn count_referrals_by_code(&self, c: &str) -> Result<u32, ServiceError> {
                self.0.count_referrals_by_code(c)
            }
            fn assign_referral_code(&self, a: &str) -> Result<String, ServiceError> {
                self.0.assign_referral_code(a)
            }
            fn leaderboard(
                &self,
                l: usize,
            ) -> Result<Vec<crate::service::LeaderboardEntry>, ServiceError> {
                self.0.leaderboard(l)
            }
        }

        let svc = BrokenInsert(MemoryService::new());
        svc.0.insert_profile("w").unwrap();
        let mut m = QuestClaimMachine::new(quest(ValidationKind::None), false);
        let mut c = ctx(0);
        c.session_active = true;
        m.start(&c, Instant::now()).unwrap();

        let err = m.claim(&svc, "w", &c, Instant::now()).unwrap_err();
        assert!(matches!(err, ClaimError::Service(ServiceError::Transport(_))));
        // Still Verified, the user can retry
        assert_eq!(*m.state(), ClaimState::Verified);
        assert_eq!(svc.0.fetch_profile("w").unwrap().unwrap().xp, 0);
    }

    #[test]
    fn test_catalog_machines_cover_all_kinds() {
        // Every milestone quest builds a machine that starts legally
        for def in milestone_quests() {
            let mut m = QuestClaimMachine::new(def, false);
            let _ = m.start(&ctx(10_000), Instant::now());
            assert_ne!(*m.state(), ClaimState::Claimed);
        }
    }
}
