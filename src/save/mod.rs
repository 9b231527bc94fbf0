//! Local persistence
//!
//! A display-only cache so the UI has something to show before the first
//! backend round trip. Never a source of truth for XP or rank.

pub mod cache;

pub use cache::{load_cache, save_cache, LocalCache, QuizBonus, Theme};
