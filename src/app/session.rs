//! Fast-path session flag
//!
//! A simulated session: activating it skips the fixed verification delay on
//! quest cards. No real signing happens; the short activation delay only
//! mimics the signing round trip.

use std::time::{Duration, Instant};

const ACTIVATION_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Default)]
pub struct FastPathSession {
    active: bool,
    activating_until: Option<Instant>,
}

impl FastPathSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_activating(&self) -> bool {
        self.activating_until.is_some()
    }

    /// Begin activation. One-way within a run; repeat calls are no-ops.
    pub fn activate(&mut self, now: Instant) {
        if !self.active && self.activating_until.is_none() {
            self.activating_until = Some(now + ACTIVATION_DELAY);
        }
    }

    /// Resolve a pending activation. Returns true the moment it completes.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(until) = self.activating_until {
            if now >= until {
                self.activating_until = None;
                self.active = true;
                log::info!("Fast-path session active");
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_resolves_after_delay() {
        let mut session = FastPathSession::new();
        let now = Instant::now();
        assert!(!session.is_active());

        session.activate(now);
        assert!(session.is_activating());
        assert!(!session.tick(now));
        assert!(session.tick(now + ACTIVATION_DELAY));
        assert!(session.is_active());

        // Re-activation is a no-op
        session.activate(now);
        assert!(!session.is_activating());
    }
}
