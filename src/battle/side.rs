use crate::battle::field::SideId;
use crate::battle::slot::BattleSlot;
use crate::content::{HazardKind, SideConditionKind};
use crate::model::Creature;
use std::collections::BTreeMap;

/// One team: its party, its active slots and the field state bound to it.
#[derive(Clone, Debug)]
pub struct BattleSide {
    pub id: SideId,
    pub party: Vec<Creature>,
    pub slots: Vec<BattleSlot>,
    /// Remaining turns per active condition.
    pub conditions: BTreeMap<SideConditionKind, u8>,
    /// Hazards that hurt this side's entrants, with their layer counts.
    pub hazards: BTreeMap<HazardKind, u8>,
}

impl BattleSide {
    /// Sends out the first `slot_count` party members in order.
    pub fn new(id: SideId, party: Vec<Creature>, slot_count: usize) -> Self {
        let slots = (0..slot_count)
            .map(|index| {
                let mut slot = BattleSlot::new(index);
                if index < party.len() {
                    slot.occupant = Some(index);
                }
                slot
            })
            .collect();
        Self {
            id,
            party,
            slots,
            conditions: BTreeMap::new(),
            hazards: BTreeMap::new(),
        }
    }

    pub fn slot(&self, index: usize) -> Option<&BattleSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut BattleSlot> {
        self.slots.get_mut(index)
    }

    pub fn occupant(&self, index: usize) -> Option<&Creature> {
        let party_index = self.slots.get(index)?.occupant?;
        self.party.get(party_index)
    }

    pub fn occupant_mut(&mut self, index: usize) -> Option<&mut Creature> {
        let party_index = self.slots.get(index)?.occupant?;
        self.party.get_mut(party_index)
    }

    /// Occupied and not fainted.
    pub fn is_slot_active(&self, index: usize) -> bool {
        self.occupant(index).is_some_and(|creature| !creature.is_fainted())
    }

    pub fn active_slot_of(&self, party_index: usize) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.occupant == Some(party_index))
    }

    /// True while any party member can still fight.
    pub fn has_available(&self) -> bool {
        self.party.iter().any(|creature| !creature.is_fainted())
    }

    /// Healthy party members not currently in a slot.
    pub fn bench(&self) -> Vec<usize> {
        self.party
            .iter()
            .enumerate()
            .filter(|(idx, creature)| !creature.is_fainted() && self.active_slot_of(*idx).is_none())
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn hazard_layers(&self, kind: HazardKind) -> u8 {
        self.hazards.get(&kind).copied().unwrap_or(0)
    }

    /// Adds one layer; false when already at `max_layers`.
    pub fn add_hazard(&mut self, kind: HazardKind, max_layers: u8) -> bool {
        let layers = self.hazards.entry(kind).or_insert(0);
        if *layers >= max_layers {
            return false;
        }
        *layers += 1;
        true
    }

    pub fn clear_hazard(&mut self, kind: HazardKind) {
        self.hazards.remove(&kind);
    }

    pub fn has_condition(&self, kind: SideConditionKind) -> bool {
        self.conditions.get(&kind).is_some_and(|turns| *turns > 0)
    }

    /// False when the condition is already up.
    pub fn add_condition(&mut self, kind: SideConditionKind, turns: u8) -> bool {
        if self.has_condition(kind) || turns == 0 {
            return false;
        }
        self.conditions.insert(kind, turns);
        true
    }

    /// Decrements every condition and returns the ones that expired.
    pub fn tick_conditions(&mut self) -> Vec<SideConditionKind> {
        let mut expired = Vec::new();
        for (kind, turns) in self.conditions.iter_mut() {
            *turns = turns.saturating_sub(1);
            if *turns == 0 {
                expired.push(*kind);
            }
        }
        self.conditions.retain(|_, turns| *turns > 0);
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Stats;
    use crate::types::Type;

    fn mon(name: &str) -> Creature {
        let stats = Stats {
            hp: 100,
            atk: 50,
            def: 50,
            spa: 50,
            spd: 50,
            spe: 50,
        };
        Creature::new(name, 50, vec![Type::Normal], stats, vec![])
    }

    #[test]
    fn sends_out_leading_party_members() {
        let side = BattleSide::new(SideId::Player, vec![mon("a"), mon("b"), mon("c")], 2);
        assert_eq!(side.slots.len(), 2);
        assert_eq!(side.slots[0].occupant, Some(0));
        assert_eq!(side.slots[1].occupant, Some(1));
        assert_eq!(side.bench(), vec![2]);
    }

    #[test]
    fn short_party_leaves_slots_empty() {
        let side = BattleSide::new(SideId::Enemy, vec![mon("solo")], 3);
        assert!(side.slots[1].is_empty());
        assert!(side.slots[2].is_empty());
        assert!(side.is_slot_active(0));
        assert!(!side.is_slot_active(1));
    }

    #[test]
    fn hazard_layers_cap() {
        let mut side = BattleSide::new(SideId::Player, vec![mon("a")], 1);
        assert!(side.add_hazard(HazardKind::Spikes, 3));
        assert!(side.add_hazard(HazardKind::Spikes, 3));
        assert!(side.add_hazard(HazardKind::Spikes, 3));
        assert!(!side.add_hazard(HazardKind::Spikes, 3));
        assert_eq!(side.hazard_layers(HazardKind::Spikes), 3);
        side.clear_hazard(HazardKind::Spikes);
        assert_eq!(side.hazard_layers(HazardKind::Spikes), 0);
    }

    #[test]
    fn conditions_expire_at_zero() {
        let mut side = BattleSide::new(SideId::Player, vec![mon("a")], 1);
        assert!(side.add_condition(SideConditionKind::Tailwind, 2));
        assert!(!side.add_condition(SideConditionKind::Tailwind, 4));
        assert!(side.tick_conditions().is_empty());
        assert_eq!(side.tick_conditions(), vec![SideConditionKind::Tailwind]);
        assert!(!side.has_condition(SideConditionKind::Tailwind));
    }
}
