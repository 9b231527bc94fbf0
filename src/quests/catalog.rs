//! Quest definitions
//!
//! All quests are code-defined. Daily quest ids embed the calendar date so
//! each day is a distinct completable unit; milestone ids are stable.

use chrono::Utc;

/// XP total required by the xp-gated milestone quest (Wizard rank).
pub const XP_GATE_THRESHOLD: u64 = 100;

/// Accepted referral count for the referral-gated milestone quest.
pub const REFERRALS_REQUIRED: u32 = 3;

/// How a quest is validated before it can be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// No check; verification auto-resolves after a fixed delay.
    None,
    /// User submits a twitter.com / x.com URL containing their handle.
    TwitterUrl,
    /// Requires an XP total of at least `required`, rechecked at claim time.
    XpGate { required: u64 },
    /// Requires at least `required` profiles referred by this identity.
    ReferralGate { required: u32 },
}

/// A static quest definition.
#[derive(Debug, Clone)]
pub struct QuestDef {
    pub id: String,
    pub title: &'static str,
    pub description: &'static str,
    pub xp: u64,
    /// External link opened when the quest starts, if any.
    pub link: Option<&'static str>,
    pub validation: ValidationKind,
    pub daily: bool,
}

/// Today's date as `YYYY-MM-DD`, the suffix for daily quest ids.
pub fn today_str() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// The daily ritual quests for a given date.
pub fn daily_quests(date: &str) -> Vec<QuestDef> {
    vec![
        QuestDef {
            id: format!("daily_gm_{}", date),
            title: "Say GM in Discord",
            description: "Drop a GM in the #general channel to show you're active in the community today.",
            xp: 10,
            link: Some("https://discord.com/channels/943797222162726962/1021340411022819328"),
            validation: ValidationKind::None,
            daily: true,
        },
        QuestDef {
            id: format!("daily_price_{}", date),
            title: "Check Magic Block X",
            description: "Visit the Magic Block X page and check the latest updates. Knowledge is power.",
            xp: 5,
            link: Some("https://x.com/magicblock"),
            validation: ValidationKind::None,
            daily: true,
        },
        QuestDef {
            id: format!("share_post_{}", date),
            title: "Share a Post on X",
            description: "Post about Solana or MagicBlock on X and paste your link below. Must contain your X username.",
            xp: 15,
            link: Some("https://x.com/magicblock"),
            validation: ValidationKind::TwitterUrl,
            daily: true,
        },
        QuestDef {
            id: format!("daily_visit_{}", date),
            title: "Visit the Dashboard",
            description: "Check in on your Daily Magic dashboard. Consistency is the key to mastery.",
            xp: 5,
            link: Some("https://dailymagic.vercel.app/"),
            validation: ValidationKind::None,
            daily: true,
        },
    ]
}

/// The milestone quests. Ids are stable across days.
pub fn milestone_quests() -> Vec<QuestDef> {
    vec![
        QuestDef {
            id: "follow_twitter".into(),
            title: "Follow Magic Block on X",
            description: "Stay in the loop with the latest updates, announcements, and alpha from the team.",
            xp: 50,
            link: Some("https://x.com/magicblock"),
            validation: ValidationKind::None,
            daily: false,
        },
        QuestDef {
            id: "join_discord".into(),
            title: "Join the Discord",
            description: "Connect with the community, ask questions, and participate in exclusive events.",
            xp: 75,
            link: Some("https://discord.com/invite/MBkdC3gxcv"),
            validation: ValidationKind::None,
            daily: false,
        },
        QuestDef {
            id: "read_docs".into(),
            title: "Read the Documentation",
            description: "Dive deep into Ephemeral Rollups, BOLT ECS, and the full MagicBlock architecture.",
            xp: 100,
            link: Some("https://docs.magicblock.gg"),
            validation: ValidationKind::None,
            daily: false,
        },
        QuestDef {
            id: "invite_friends".into(),
            title: "Invite 3 Friends",
            description: "Spread the word. Invite three friends to the Daily Magic platform and earn bonus XP.",
            xp: 150,
            link: None,
            validation: ValidationKind::ReferralGate {
                required: REFERRALS_REQUIRED,
            },
            daily: false,
        },
        QuestDef {
            id: "visit_site".into(),
            title: "Visit Magic Block site",
            description: "Explore the official website and learn about the high-speed Solana L2.",
            xp: 30,
            link: Some("https://www.magicblock.xyz/"),
            validation: ValidationKind::None,
            daily: false,
        },
        QuestDef {
            id: "reach_wizard".into(),
            title: "Reach Wizard Rank",
            description: "Accumulate 100 XP across all quests to reach Wizard rank. Prove your dedication.",
            xp: 200,
            link: None,
            validation: ValidationKind::XpGate {
                required: XP_GATE_THRESHOLD,
            },
            daily: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_ids_embed_date() {
        let quests = daily_quests("2024-03-01");
        assert!(quests.iter().all(|q| q.id.ends_with("2024-03-01")));
        assert!(quests.iter().all(|q| q.daily));

        // A new day yields a fresh set of completable ids
        let next = daily_quests("2024-03-02");
        for (a, b) in quests.iter().zip(next.iter()) {
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn test_milestone_ids_are_stable_and_unique() {
        let quests = milestone_quests();
        let mut ids: Vec<_> = quests.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), quests.len());
        assert!(quests.iter().all(|q| !q.daily));
    }

    #[test]
    fn test_rewards_are_positive() {
        let date = today_str();
        for q in daily_quests(&date).into_iter().chain(milestone_quests()) {
            assert!(q.xp > 0, "{} has a zero reward", q.id);
        }
    }
}
