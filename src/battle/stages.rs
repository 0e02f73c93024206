use crate::error::{BattleError, Result};
use crate::model::Stat;
use serde::Serialize;

pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// Per-slot stat stages, each held in [-6, +6].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StatStages {
    attack: i8,
    defense: i8,
    special_attack: i8,
    special_defense: i8,
    speed: i8,
    accuracy: i8,
    evasion: i8,
}

impl StatStages {
    /// HP has no stage and reads as 0.
    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Hp => 0,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    fn slot_mut(&mut self, stat: Stat) -> Result<&mut i8> {
        match stat {
            Stat::Hp => Err(BattleError::StageNotModifiable(stat)),
            Stat::Attack => Ok(&mut self.attack),
            Stat::Defense => Ok(&mut self.defense),
            Stat::SpecialAttack => Ok(&mut self.special_attack),
            Stat::SpecialDefense => Ok(&mut self.special_defense),
            Stat::Speed => Ok(&mut self.speed),
            Stat::Accuracy => Ok(&mut self.accuracy),
            Stat::Evasion => Ok(&mut self.evasion),
        }
    }

    /// Applies `delta` with clamping and returns the change actually made.
    pub fn modify(&mut self, stat: Stat, delta: i8) -> Result<i8> {
        let stage = self.slot_mut(stat)?;
        let current = *stage;
        let next = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        *stage = next;
        Ok(next - current)
    }

    pub fn reset(&mut self) {
        *self = StatStages::default();
    }
}

/// Stage multiplier for the five combat stats as (numerator, denominator).
pub fn stage_ratio(stage: i8) -> (u32, u32) {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as i32;
    if stage >= 0 {
        ((2 + stage) as u32, 2)
    } else {
        (2, (2 - stage) as u32)
    }
}

/// Accuracy/evasion use a base of 3 instead of 2.
pub fn accuracy_ratio(stage: i8) -> (u32, u32) {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as i32;
    if stage >= 0 {
        ((3 + stage) as u32, 3)
    } else {
        (3, (3 - stage) as u32)
    }
}

/// Percent chance to hit once the user's accuracy stage is netted against
/// the target's evasion stage. Can exceed 100.
pub fn hit_chance(accuracy: u8, accuracy_stage: i8, evasion_stage: i8) -> u32 {
    let (numerator, denominator) = accuracy_ratio(accuracy_stage.saturating_sub(evasion_stage));
    accuracy as u32 * numerator / denominator
}

pub fn apply_stage(base: u16, stage: i8) -> u32 {
    let (num, den) = stage_ratio(stage);
    (base as u32 * num / den).max(1)
}
