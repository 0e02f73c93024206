// Held-item end-of-turn effects.
// - Leftovers: pokemon-showdown/data/items.ts (leftovers)
// - Black Sludge: pokemon-showdown/data/items.ts (blacksludge)
// - Flame Orb / Toxic Orb: pokemon-showdown/data/items.ts (flameorb, toxicorb)

use crate::battle::action::{BattleAction, DamageSource, HealSource};
use crate::battle::field::{BattleField, SlotRef};
use crate::content::fraction_of;
use crate::model::{normalize_id, Creature, Status};
use crate::types::Type;

/// Item and ability hooks run at the end of the per-slot residual sweep.
pub trait ResidualEffects: Send + Sync {
    fn end_of_turn(
        &self,
        field: &BattleField,
        slot: SlotRef,
        creature: &Creature,
    ) -> Vec<BattleAction>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HeldItemResiduals;

impl ResidualEffects for HeldItemResiduals {
    fn end_of_turn(
        &self,
        _field: &BattleField,
        slot: SlotRef,
        creature: &Creature,
    ) -> Vec<BattleAction> {
        let Some(item) = creature.item.as_deref() else {
            return Vec::new();
        };
        let item_id = normalize_id(item);
        let max_hp = creature.max_hp();
        let full = creature.current_hp >= max_hp;
        let heal = |item_id: &str| BattleAction::Heal {
            target: slot,
            amount: fraction_of(max_hp, (1, 16)),
            source: HealSource::Item(item_id.to_string()),
        };
        match item_id.as_str() {
            "leftovers" if !full => vec![heal("leftovers")],
            "blacksludge" => {
                if creature.has_type(Type::Poison) {
                    if full {
                        return Vec::new();
                    }
                    vec![heal("blacksludge")]
                } else {
                    vec![BattleAction::Damage {
                        target: slot,
                        amount: fraction_of(max_hp, (1, 8)),
                        source: DamageSource::Item("blacksludge".to_string()),
                    }]
                }
            }
            "flameorb" if creature.status.is_none() => vec![BattleAction::ApplyStatus {
                source: Some(slot),
                target: slot,
                status: Status::Burn,
            }],
            "toxicorb" if creature.status.is_none() => vec![BattleAction::ApplyStatus {
                source: Some(slot),
                target: slot,
                status: Status::BadlyPoisoned,
            }],
            _ => Vec::new(),
        }
    }
}
