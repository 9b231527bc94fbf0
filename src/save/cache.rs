//! Local display cache
//!
//! Last-known profile fields, the theme preference, the one-time risk
//! acknowledgment, and the quiz-completion ledger, persisted as JSON under
//! the platform data dir. Loading always succeeds; a missing or unreadable
//! file yields defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Current cache version for compatibility
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// One quiz pass and the bonus XP that was pushed to the backend for it.
/// Kept locally for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBonus {
    pub topic_id: String,
    pub xp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCache {
    /// Version for compatibility checking
    pub version: u32,
    /// Last-known display name
    pub display_name: String,
    /// Last-known X handle (stored without the leading @)
    pub twitter_handle: String,
    /// Last-known Discord handle
    pub discord_handle: String,
    /// Theme preference
    pub theme: Theme,
    /// One-time risk disclaimer acknowledgment
    pub risk_acknowledged: bool,
    /// Quiz topics passed on this machine
    pub completed_quizzes: HashSet<String>,
    /// Bonus XP ledger for passed quizzes
    pub quiz_bonuses: Vec<QuizBonus>,
}

impl Default for LocalCache {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION,
            display_name: String::new(),
            twitter_handle: String::new(),
            discord_handle: String::new(),
            theme: Theme::default(),
            risk_acknowledged: false,
            completed_quizzes: HashSet::new(),
            quiz_bonuses: Vec::new(),
        }
    }
}

impl LocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the display fields after a profile edit.
    pub fn remember_profile(&mut self, name: &str, twitter: &str, discord: &str) {
        self.display_name = name.to_string();
        self.twitter_handle = twitter.trim_start_matches('@').to_string();
        self.discord_handle = discord.to_string();
    }

    /// Record a quiz pass and its bonus XP.
    pub fn record_quiz_pass(&mut self, topic_id: &str, xp: u64) -> bool {
        if !self.completed_quizzes.insert(topic_id.to_string()) {
            return false;
        }
        self.quiz_bonuses.push(QuizBonus {
            topic_id: topic_id.to_string(),
            xp,
        });
        true
    }

    pub fn has_passed_quiz(&self, topic_id: &str) -> bool {
        self.completed_quizzes.contains(topic_id)
    }

    pub fn toggle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        };
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(cache) => {
                        log::info!("Cache loaded from {:?}", path);
                        return cache;
                    }
                    Err(e) => {
                        log::warn!("Failed to parse cache: {}, starting fresh", e);
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read cache: {}, starting fresh", e);
                }
            }
        }
        LocalCache::new()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())?;
        log::debug!("Cache saved to {:?}", path);
        Ok(())
    }
}

/// Default cache file location.
fn cache_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "dailymagic", "DailyMagic") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("cache.json");
        path
    } else {
        PathBuf::from("./dailymagic-cache.json")
    }
}

/// Load the local cache (or create default).
pub fn load_cache() -> LocalCache {
    LocalCache::load_from(&cache_path())
}

/// Save the local cache.
pub fn save_cache(cache: &LocalCache) -> Result<(), String> {
    cache.save_to(&cache_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut cache = LocalCache::new();
        cache.remember_profile("alice", "@alice_x", "alice#1234");
        cache.risk_acknowledged = true;
        cache.toggle_theme();
        assert!(cache.record_quiz_pass("ephemeral-rollups", 50));

        let path = std::env::temp_dir().join("dailymagic-cache-test.json");
        cache.save_to(&path).unwrap();
        let loaded = LocalCache::load_from(&path);
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.display_name, "alice");
        assert_eq!(loaded.twitter_handle, "alice_x");
        assert_eq!(loaded.theme, Theme::Light);
        assert!(loaded.risk_acknowledged);
        assert!(loaded.has_passed_quiz("ephemeral-rollups"));
        assert_eq!(loaded.quiz_bonuses.len(), 1);
    }

    #[test]
    fn test_quiz_pass_recorded_once() {
        let mut cache = LocalCache::new();
        assert!(cache.record_quiz_pass("bolt-ecs", 50));
        assert!(!cache.record_quiz_pass("bolt-ecs", 50));
        assert_eq!(cache.quiz_bonuses.len(), 1);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let loaded = LocalCache::load_from(Path::new("/nonexistent/dailymagic.json"));
        assert!(!loaded.risk_acknowledged);
        assert!(loaded.display_name.is_empty());
    }
}
