use crate::battle::damage::DamageContext;
use crate::battle::field::SlotRef;
use crate::content::{HazardKind, TerrainKind, WeatherKind};
use crate::model::{Stat, Status};

/// Switches resolve ahead of every ordinary move bracket.
pub const SWITCH_PRIORITY: i8 = 6;

#[derive(Clone, Debug, PartialEq)]
pub enum DamageSource {
    Move {
        user: SlotRef,
        context: Box<DamageContext>,
    },
    Status(Status),
    Weather(WeatherKind),
    Hazard(HazardKind),
    Item(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum HealSource {
    Move(SlotRef),
    Terrain(TerrainKind),
    Item(String),
}

/// Everything that can happen during a turn. Provider intents are
/// `UseMove` or `Switch`; the rest are reactions emitted while executing.
#[derive(Clone, Debug, PartialEq)]
pub enum BattleAction {
    UseMove {
        user: SlotRef,
        move_index: usize,
        /// Chosen target for single-target moves; `None` picks the first legal one.
        target: Option<SlotRef>,
    },
    Damage {
        target: SlotRef,
        amount: u16,
        source: DamageSource,
    },
    Heal {
        target: SlotRef,
        amount: u16,
        source: HealSource,
    },
    StatChange {
        target: SlotRef,
        stat: Stat,
        delta: i8,
    },
    ApplyStatus {
        /// `Some(target)` marks a self-inflicted status.
        source: Option<SlotRef>,
        target: SlotRef,
        status: Status,
    },
    Switch {
        slot: SlotRef,
        party_index: usize,
    },
    Faint {
        target: SlotRef,
    },
    Message {
        text: String,
    },
}

impl BattleAction {
    pub fn message(text: impl Into<String>) -> Self {
        BattleAction::Message { text: text.into() }
    }

    pub fn use_move(user: SlotRef, move_index: usize, target: Option<SlotRef>) -> Self {
        BattleAction::UseMove {
            user,
            move_index,
            target,
        }
    }

    pub fn switch(slot: SlotRef, party_index: usize) -> Self {
        BattleAction::Switch { slot, party_index }
    }

    /// The slot whose turn this action spends, for provider-submitted actions.
    pub fn actor(&self) -> Option<SlotRef> {
        match self {
            BattleAction::UseMove { user, .. } => Some(*user),
            BattleAction::Switch { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, BattleAction::Switch { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BattleAction::UseMove { .. } => "use_move",
            BattleAction::Damage { .. } => "damage",
            BattleAction::Heal { .. } => "heal",
            BattleAction::StatChange { .. } => "stat_change",
            BattleAction::ApplyStatus { .. } => "apply_status",
            BattleAction::Switch { .. } => "switch",
            BattleAction::Faint { .. } => "faint",
            BattleAction::Message { .. } => "message",
        }
    }
}
