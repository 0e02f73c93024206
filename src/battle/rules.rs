use crate::battle::field::SideId;
use crate::error::{BattleError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TURN_LIMIT: u32 = 1000;
pub const DEFAULT_HORDE_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleFormat {
    #[default]
    Single,
    Double,
    Triple,
    /// One player slot against many enemy slots.
    Horde,
    /// Several player slots against one boss.
    Raid,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossRules {
    pub hp_multiplier: f32,
    pub stat_multiplier: f32,
}

fn default_turn_limit() -> u32 {
    DEFAULT_TURN_LIMIT
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRules {
    #[serde(default)]
    pub format: BattleFormat,
    pub player_slots: usize,
    pub enemy_slots: usize,
    /// Applied to the enemy party when present.
    #[serde(default)]
    pub boss: Option<BossRules>,
    #[serde(default = "default_turn_limit")]
    pub turn_limit: u32,
}

impl Default for BattleRules {
    fn default() -> Self {
        Self::singles()
    }
}

impl BattleRules {
    fn with_slots(format: BattleFormat, player_slots: usize, enemy_slots: usize) -> Self {
        Self {
            format,
            player_slots,
            enemy_slots,
            boss: None,
            turn_limit: DEFAULT_TURN_LIMIT,
        }
    }

    pub fn singles() -> Self {
        Self::with_slots(BattleFormat::Single, 1, 1)
    }

    pub fn doubles() -> Self {
        Self::with_slots(BattleFormat::Double, 2, 2)
    }

    pub fn triples() -> Self {
        Self::with_slots(BattleFormat::Triple, 3, 3)
    }

    pub fn horde(enemies: usize) -> Self {
        Self::with_slots(BattleFormat::Horde, 1, enemies)
    }

    pub fn raid(players: usize, boss: BossRules) -> Self {
        Self {
            boss: Some(boss),
            ..Self::with_slots(BattleFormat::Raid, players, 1)
        }
    }

    pub fn with_turn_limit(mut self, turn_limit: u32) -> Self {
        self.turn_limit = turn_limit;
        self
    }

    pub fn slots_for(&self, side: SideId) -> usize {
        match side {
            SideId::Player => self.player_slots,
            SideId::Enemy => self.enemy_slots,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for side in SideId::BOTH {
            if self.slots_for(side) == 0 {
                return Err(BattleError::InvalidSlotCount { side });
            }
        }
        if let Some(boss) = self.boss {
            if !(boss.hp_multiplier > 0.0 && boss.stat_multiplier > 0.0) {
                return Err(BattleError::InvalidBossMultiplier);
            }
        }
        Ok(())
    }

    /// More than one active slot on either side.
    pub fn is_multi_battle(&self) -> bool {
        self.player_slots > 1 || self.enemy_slots > 1
    }

    /// Only triple battles restrict reach; slot `i` faces opposing slot `n-1-i`.
    pub fn opponents_adjacent(
        &self,
        own_index: usize,
        opposing_index: usize,
        opposing_slots: usize,
    ) -> bool {
        if self.format != BattleFormat::Triple {
            return true;
        }
        let mirrored = opposing_slots.saturating_sub(1).saturating_sub(opposing_index);
        own_index.abs_diff(mirrored) <= 1
    }

    pub fn allies_adjacent(&self, own_index: usize, ally_index: usize) -> bool {
        own_index.abs_diff(ally_index) == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_slots_are_rejected() {
        let rules = BattleRules {
            enemy_slots: 0,
            ..BattleRules::singles()
        };
        assert_eq!(
            rules.validate(),
            Err(BattleError::InvalidSlotCount { side: SideId::Enemy })
        );
    }

    #[test]
    fn boss_multipliers_must_be_positive() {
        let rules = BattleRules::raid(
            4,
            BossRules {
                hp_multiplier: 0.0,
                stat_multiplier: 1.5,
            },
        );
        assert_eq!(rules.validate(), Err(BattleError::InvalidBossMultiplier));
    }

    #[test]
    fn triple_edges_cannot_reach_far_side() {
        let rules = BattleRules::triples();
        // player slot 0 faces enemy slot 2
        assert!(rules.opponents_adjacent(0, 2, 3));
        assert!(rules.opponents_adjacent(0, 1, 3));
        assert!(!rules.opponents_adjacent(0, 0, 3));
        assert!(rules.opponents_adjacent(1, 0, 3));
        assert!(rules.opponents_adjacent(1, 2, 3));
    }

    #[test]
    fn horde_reaches_every_enemy() {
        let rules = BattleRules::horde(DEFAULT_HORDE_SIZE);
        assert!((0..5).all(|j| rules.opponents_adjacent(0, j, 5)));
        assert!(rules.is_multi_battle());
    }

    #[test]
    fn rules_deserialize_with_defaults() {
        let raw = r#"{"format":"double","playerSlots":2,"enemySlots":2}"#;
        let rules: BattleRules = serde_json::from_str(raw).expect("rules");
        assert_eq!(rules, BattleRules::doubles());
    }
}
