use crate::battle::action::{BattleAction, DamageSource, HealSource};
use crate::battle::field::{BattleField, SlotRef};
use crate::battle::residuals::{HeldItemResiduals, ResidualEffects};
use crate::content::fraction_of;
use crate::model::{Creature, Status};

/// Highest badly-poisoned counter.
pub const MAX_TOXIC_COUNTER: u8 = 15;

/// Builds the end-of-turn reactions. Never mutates the field itself.
pub struct EndOfTurnProcessor {
    hooks: Vec<Box<dyn ResidualEffects>>,
}

impl Default for EndOfTurnProcessor {
    fn default() -> Self {
        Self::new().with_hook(Box::new(HeldItemResiduals))
    }
}

impl EndOfTurnProcessor {
    /// No item or ability hooks.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn with_hook(mut self, hook: Box<dyn ResidualEffects>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Per slot, player side first: status, weather, terrain, then hooks.
    pub fn process_effects(&self, field: &BattleField) -> Vec<BattleAction> {
        let mut reactions = Vec::new();
        for slot in field.active_slots() {
            let Some(creature) = field.occupant(slot) else {
                continue;
            };
            reactions.extend(status_damage(field, slot, creature));
            reactions.extend(weather_damage(field, slot, creature));
            reactions.extend(terrain_heal(field, slot, creature));
            for hook in &self.hooks {
                reactions.extend(hook.end_of_turn(field, slot, creature));
            }
        }
        reactions
    }
}

// Showdown: data/conditions.ts (brn 1/16, psn 1/8, tox counter/16)
fn status_damage(field: &BattleField, slot: SlotRef, creature: &Creature) -> Option<BattleAction> {
    let status = creature.status?;
    let fraction = match status {
        Status::Burn => (1, 16),
        Status::Poison => (1, 8),
        Status::BadlyPoisoned => {
            let counter = field
                .slot(slot)
                .map(|state| state.status_turns)
                .unwrap_or(1)
                .clamp(1, MAX_TOXIC_COUNTER);
            (counter as u16, 16)
        }
        Status::Paralysis | Status::Sleep | Status::Freeze => return None,
    };
    Some(BattleAction::Damage {
        target: slot,
        amount: fraction_of(creature.max_hp(), fraction),
        source: DamageSource::Status(status),
    })
}

fn weather_damage(field: &BattleField, slot: SlotRef, creature: &Creature) -> Option<BattleAction> {
    let data = field.weather.data()?;
    let fraction = data.residual?;
    if data.immune_types.iter().any(|ty| creature.has_type(*ty)) {
        return None;
    }
    Some(BattleAction::Damage {
        target: slot,
        amount: fraction_of(creature.max_hp(), fraction),
        source: DamageSource::Weather(field.weather.kind),
    })
}

fn terrain_heal(field: &BattleField, slot: SlotRef, creature: &Creature) -> Option<BattleAction> {
    let fraction = field.terrain.data()?.heal?;
    if !creature.is_grounded() || creature.current_hp >= creature.max_hp() {
        return None;
    }
    Some(BattleAction::Heal {
        target: slot,
        amount: fraction_of(creature.max_hp(), fraction),
        source: HealSource::Terrain(field.terrain.kind),
    })
}
