use crate::battle::action::{BattleAction, DamageSource};
use crate::battle::field::{BattleField, SlotRef};
use crate::content::{HazardKind, HazardLookup};
use crate::model::{Creature, Stat, Status};
use crate::types::effectiveness;

/// Reactions for one switch-in, plus hazards the entrant absorbed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HazardSweep {
    pub reactions: Vec<BattleAction>,
    pub clear: Vec<HazardKind>,
}

/// Evaluates every hazard on the entrant's side independently.
///
/// Layer counts are only changed through `clear`, which the caller applies.
pub fn process_hazards(
    slot: SlotRef,
    entrant: &Creature,
    field: &BattleField,
    lookup: &dyn HazardLookup,
) -> HazardSweep {
    let mut sweep = HazardSweep::default();
    let grounded = entrant.is_grounded();
    for (&kind, &layers) in &field.side(slot.side).hazards {
        if layers == 0 {
            continue;
        }
        let Some(data) = lookup.hazard(kind) else {
            continue;
        };
        if grounded && data.absorbed_by.is_some_and(|ty| entrant.has_type(ty)) {
            sweep.clear.push(kind);
            continue;
        }
        if !grounded && !data.affects_airborne {
            continue;
        }
        let layers = layers.min(data.max_layers);
        if layers == 0 {
            continue;
        }
        match kind {
            HazardKind::Spikes | HazardKind::StealthRock => {
                let Some(&(numerator, denominator)) = data
                    .layer_fractions
                    .get(layers as usize - 1)
                    .or(data.layer_fractions.last())
                else {
                    continue;
                };
                // Effectiveness is one of 0, 1/4 .. 4; quarter steps keep it integral.
                let quarters = match data.scaling_type {
                    Some(ty) => (effectiveness(ty, &entrant.types) * 4.0).round() as u32,
                    None => 4,
                };
                if quarters == 0 {
                    continue;
                }
                let amount = entrant.max_hp() as u32 * numerator as u32 * quarters
                    / (denominator as u32 * 4);
                sweep.reactions.push(BattleAction::Damage {
                    target: slot,
                    amount: amount.clamp(1, u16::MAX as u32) as u16,
                    source: DamageSource::Hazard(kind),
                });
            }
            HazardKind::ToxicSpikes => {
                let status = if layers >= 2 {
                    Status::BadlyPoisoned
                } else {
                    Status::Poison
                };
                sweep.reactions.push(BattleAction::ApplyStatus {
                    source: None,
                    target: slot,
                    status,
                });
            }
            HazardKind::StickyWeb => {
                sweep.reactions.push(BattleAction::StatChange {
                    target: slot,
                    stat: Stat::Speed,
                    delta: -1,
                });
            }
        }
    }
    sweep
}
