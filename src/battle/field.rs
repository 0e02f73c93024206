use crate::battle::rules::BattleRules;
use crate::battle::side::BattleSide;
use crate::battle::slot::BattleSlot;
use crate::content::{TerrainData, TerrainKind, WeatherData, WeatherKind};
use crate::error::{BattleError, Result};
use crate::model::Creature;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideId {
    Player,
    Enemy,
}

impl SideId {
    pub const BOTH: [SideId; 2] = [SideId::Player, SideId::Enemy];

    pub fn index(self) -> usize {
        match self {
            SideId::Player => 0,
            SideId::Enemy => 1,
        }
    }

    pub fn opponent(self) -> SideId {
        match self {
            SideId::Player => SideId::Enemy,
            SideId::Enemy => SideId::Player,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideId::Player => f.write_str("player"),
            SideId::Enemy => f.write_str("enemy"),
        }
    }
}

/// Addresses a slot by side and index instead of holding a reference to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SlotRef {
    pub side: SideId,
    pub index: usize,
}

impl SlotRef {
    pub fn new(side: SideId, index: usize) -> Self {
        Self { side, index }
    }

    /// Showdown-style position label (`p1a`, `p2b`, ...).
    pub fn label(&self) -> String {
        let player = match self.side {
            SideId::Player => "p1",
            SideId::Enemy => "p2",
        };
        let position = (b'a' + (self.index % 26) as u8) as char;
        format!("{player}{position}")
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.side, self.index)
    }
}

/// `turns == 0` with an active kind means indefinite.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct WeatherState {
    pub kind: WeatherKind,
    pub turns: u8,
}

impl WeatherState {
    pub fn data(&self) -> Option<&'static WeatherData> {
        self.kind.data()
    }

    pub fn set(&mut self, kind: WeatherKind, turns: u8) -> bool {
        if self.kind == kind {
            return false;
        }
        self.kind = kind;
        self.turns = turns;
        true
    }

    /// Returns the kind that ended this tick, if any.
    pub fn tick(&mut self) -> Option<WeatherKind> {
        if self.kind == WeatherKind::None || self.turns == 0 {
            return None;
        }
        self.turns -= 1;
        if self.turns > 0 {
            return None;
        }
        let ended = self.kind;
        self.kind = WeatherKind::None;
        Some(ended)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TerrainState {
    pub kind: TerrainKind,
    pub turns: u8,
}

impl TerrainState {
    pub fn data(&self) -> Option<&'static TerrainData> {
        self.kind.data()
    }

    pub fn set(&mut self, kind: TerrainKind, turns: u8) -> bool {
        if self.kind == kind {
            return false;
        }
        self.kind = kind;
        self.turns = turns;
        true
    }

    pub fn tick(&mut self) -> Option<TerrainKind> {
        if self.kind == TerrainKind::None || self.turns == 0 {
            return None;
        }
        self.turns -= 1;
        if self.turns > 0 {
            return None;
        }
        let ended = self.kind;
        self.kind = TerrainKind::None;
        Some(ended)
    }
}

/// The whole battlefield. Sides and slots are addressed by index.
#[derive(Clone, Debug)]
pub struct BattleField {
    pub rules: BattleRules,
    sides: [BattleSide; 2],
    pub weather: WeatherState,
    pub terrain: TerrainState,
    pub turn: u32,
}

impl BattleField {
    pub fn new(
        rules: BattleRules,
        player_party: Vec<Creature>,
        enemy_party: Vec<Creature>,
    ) -> Result<Self> {
        rules.validate()?;
        if player_party.is_empty() {
            return Err(BattleError::EmptyParty { side: SideId::Player });
        }
        if enemy_party.is_empty() {
            return Err(BattleError::EmptyParty { side: SideId::Enemy });
        }
        let enemy_party = match rules.boss {
            Some(boss) => enemy_party
                .into_iter()
                .map(|creature| {
                    apply_boss_scaling(creature, boss.hp_multiplier, boss.stat_multiplier)
                })
                .collect(),
            None => enemy_party,
        };
        Ok(Self {
            sides: [
                BattleSide::new(SideId::Player, player_party, rules.player_slots),
                BattleSide::new(SideId::Enemy, enemy_party, rules.enemy_slots),
            ],
            rules,
            weather: WeatherState::default(),
            terrain: TerrainState::default(),
            turn: 0,
        })
    }

    pub fn side(&self, id: SideId) -> &BattleSide {
        &self.sides[id.index()]
    }

    pub fn side_mut(&mut self, id: SideId) -> &mut BattleSide {
        &mut self.sides[id.index()]
    }

    pub fn slot(&self, slot: SlotRef) -> Option<&BattleSlot> {
        self.side(slot.side).slot(slot.index)
    }

    pub fn slot_mut(&mut self, slot: SlotRef) -> Option<&mut BattleSlot> {
        self.side_mut(slot.side).slot_mut(slot.index)
    }

    pub fn occupant(&self, slot: SlotRef) -> Option<&Creature> {
        self.side(slot.side).occupant(slot.index)
    }

    pub fn occupant_mut(&mut self, slot: SlotRef) -> Option<&mut Creature> {
        self.side_mut(slot.side).occupant_mut(slot.index)
    }

    /// Slot state and occupant borrowed together.
    pub fn slot_and_occupant_mut(
        &mut self,
        slot: SlotRef,
    ) -> Option<(&mut BattleSlot, &mut Creature)> {
        let side = &mut self.sides[slot.side.index()];
        let state = side.slots.get_mut(slot.index)?;
        let creature = side.party.get_mut(state.occupant?)?;
        Some((state, creature))
    }

    /// Occupied by a creature that has not fainted.
    pub fn is_active(&self, slot: SlotRef) -> bool {
        self.side(slot.side).is_slot_active(slot.index)
    }

    /// Every slot in fixed order: player side first, then by index.
    pub fn slot_refs(&self) -> Vec<SlotRef> {
        SideId::BOTH
            .iter()
            .flat_map(|side| {
                (0..self.side(*side).slots.len()).map(move |index| SlotRef::new(*side, index))
            })
            .collect()
    }

    pub fn active_slots(&self) -> Vec<SlotRef> {
        self.slot_refs()
            .into_iter()
            .filter(|slot| self.is_active(*slot))
            .collect()
    }

    pub fn check_slot(&self, slot: SlotRef) -> Result<()> {
        if self.slot(slot).is_none() {
            return Err(BattleError::SlotOutOfRange(slot));
        }
        Ok(())
    }
}

fn apply_boss_scaling(
    mut creature: Creature,
    hp_multiplier: f32,
    stat_multiplier: f32,
) -> Creature {
    let was_full = creature.current_hp == creature.stats.hp;
    let max_hp = ((creature.stats.hp as f32) * hp_multiplier)
        .floor()
        .clamp(1.0, u16::MAX as f32) as u16;
    creature.stats = creature.stats.scaled(stat_multiplier);
    creature.stats.hp = max_hp;
    creature.current_hp = if was_full {
        max_hp
    } else {
        creature.current_hp.min(max_hp)
    };
    creature
}
