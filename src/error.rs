//! Configuration errors: setups that make a battle unrunnable.
//!
//! Anything that can go wrong *during* a turn is reported as a message
//! reaction instead and never reaches this type.

use crate::battle::field::{SideId, SlotRef};
use crate::model::Stat;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BattleError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BattleError {
    #[error("{side} party must contain at least one creature")]
    EmptyParty { side: SideId },

    #[error("{side} side requires at least one slot")]
    InvalidSlotCount { side: SideId },

    #[error("boss multipliers must be positive")]
    InvalidBossMultiplier,

    #[error("combat engine has not been initialized")]
    NotInitialized,

    #[error("{0} has no stat stage")]
    StageNotModifiable(Stat),

    #[error("slot {0} does not exist")]
    SlotOutOfRange(SlotRef),

    #[error("slot {0} is empty")]
    EmptySlot(SlotRef),

    #[error("failed to start battle runtime: {0}")]
    Runtime(String),
}
