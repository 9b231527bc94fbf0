//! Daily Magic - a gamified community dashboard for the terminal
//!
//! Complete quests, earn XP, climb the rank ladder, and compete on the
//! leaderboard, all against a pluggable data service backend.

pub mod app;
pub mod learn;
pub mod progression;
pub mod quests;
pub mod save;
pub mod service;
pub mod ui;

// Re-export commonly used types
pub use app::{Dashboard, UserStore};
pub use progression::{rank_for_xp, RankInfo};
pub use quests::QuestClaimMachine;
pub use service::DataService;
