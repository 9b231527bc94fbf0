//! Quest board
//!
//! Static quest definitions and the per-card claim state machine.

pub mod catalog;
pub mod machine;

pub use catalog::{daily_quests, milestone_quests, today_str, QuestDef, ValidationKind};
pub use machine::{
    ClaimContext, ClaimError, ClaimOutcome, ClaimState, QuestClaimMachine, TickEvent,
    ValidationError,
};
