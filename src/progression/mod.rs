//! Progression systems

pub mod ranks;

pub use ranks::{Rank, RankInfo, rank_for_xp, progress_percent, RANKS};
