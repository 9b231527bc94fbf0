//! Rank ladder
//!
//! XP thresholds, rank lookup, and progress helpers.
//!
//! Rank is always derived from the XP total at read time. Nothing in this
//! crate persists a rank string, so the displayed rank can never drift from
//! the stored XP.

/// A single rung of the rank ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub name: &'static str,
    pub threshold: u64,
}

/// The rank ladder, sorted ascending by threshold. The first entry must sit
/// at threshold 0 so every XP total maps to a rank.
pub const RANKS: [Rank; 6] = [
    Rank { name: "Verified Human", threshold: 0 },
    Rank { name: "Wizard", threshold: 100 },
    Rank { name: "Magician", threshold: 400 },
    Rank { name: "Apprentice", threshold: 800 },
    Rank { name: "Sorcerer", threshold: 1200 },
    Rank { name: "Adept", threshold: 2000 },
];

/// Result of a rank lookup: the current rank plus the bounds the UI needs
/// for its progress gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankInfo {
    pub name: &'static str,
    pub threshold: u64,
    /// Threshold of the next rank, or `None` at the top of the ladder.
    pub next_threshold: Option<u64>,
}

/// Look up the rank for an XP total: the entry with the greatest threshold
/// not exceeding `xp`. Defined for every input; negative totals are clamped
/// to zero by the unsigned type, so the lowest rank is the floor.
pub fn rank_for_xp(xp: u64) -> RankInfo {
    let mut idx = 0;
    for (i, rank) in RANKS.iter().enumerate() {
        if xp >= rank.threshold {
            idx = i;
        }
    }
    RankInfo {
        name: RANKS[idx].name,
        threshold: RANKS[idx].threshold,
        next_threshold: RANKS.get(idx + 1).map(|r| r.threshold),
    }
}

/// Percentage of the way through the current rank band, clamped to [0, 100].
/// At the top rank the bar is full.
pub fn progress_percent(xp: u64, info: &RankInfo) -> f64 {
    match info.next_threshold {
        Some(next) if next > info.threshold => {
            let span = (next - info.threshold) as f64;
            let into = xp.saturating_sub(info.threshold) as f64;
            (into / span * 100.0).clamp(0.0, 100.0)
        }
        _ => 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(rank_for_xp(0).name, "Verified Human");
        assert_eq!(rank_for_xp(99).name, "Verified Human");
        assert_eq!(rank_for_xp(100).name, "Wizard");
        assert_eq!(rank_for_xp(399).name, "Wizard");
        assert_eq!(rank_for_xp(400).name, "Magician");
        assert_eq!(rank_for_xp(800).name, "Apprentice");
        assert_eq!(rank_for_xp(1200).name, "Sorcerer");
        assert_eq!(rank_for_xp(2000).name, "Adept");
    }

    #[test]
    fn test_max_rank_has_no_next() {
        let info = rank_for_xp(5000);
        assert_eq!(info.name, "Adept");
        assert_eq!(info.threshold, 2000);
        assert_eq!(info.next_threshold, None);
    }

    #[test]
    fn test_thresholds_strictly_increasing() {
        for pair in RANKS.windows(2) {
            assert!(pair[0].threshold < pair[1].threshold);
        }
        assert_eq!(RANKS[0].threshold, 0);
    }

    #[test]
    fn test_progress_mid_band() {
        let info = rank_for_xp(150);
        assert_eq!(info.threshold, 100);
        assert_eq!(info.next_threshold, Some(400));
        let pct = progress_percent(150, &info);
        assert!((pct - 16.666).abs() < 0.01);
    }

    #[test]
    fn test_progress_monotone_within_band_and_resets() {
        let mut last = 0.0;
        for xp in 100..400 {
            let info = rank_for_xp(xp);
            let pct = progress_percent(xp, &info);
            assert!(pct >= last);
            last = pct;
        }
        // Crossing into the next band drops the bar back toward zero
        let info = rank_for_xp(400);
        assert_eq!(progress_percent(400, &info), 0.0);
    }

    #[test]
    fn test_progress_full_at_max_rank() {
        let info = rank_for_xp(9999);
        assert_eq!(progress_percent(9999, &info), 100.0);
    }
}
