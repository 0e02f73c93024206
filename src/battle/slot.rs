use crate::battle::field::SlotRef;
use crate::battle::stages::StatStages;
use crate::model::MoveCategory;
use bitflags::bitflags;

bitflags! {
    /// Volatile status: cleared entirely on switch-out or faint.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct VolatileFlags: u8 {
        const PROTECTED = 1 << 0;
        const CHARGING = 1 << 1;
        const SEMI_INVULNERABLE = 1 << 2;
    }
}

/// Index into the engine's provider registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct ProviderId(pub usize);

/// Two-turn move waiting for its second turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChargingMove {
    pub move_index: usize,
    pub target: Option<SlotRef>,
}

/// Damage received this turn; read by counter-style moves.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TurnDamage {
    pub physical: u16,
    pub special: u16,
    pub last_physical_source: Option<SlotRef>,
    pub last_special_source: Option<SlotRef>,
}

impl TurnDamage {
    pub fn record(&mut self, category: MoveCategory, amount: u16, source: SlotRef) {
        match category {
            MoveCategory::Physical => {
                self.physical = self.physical.saturating_add(amount);
                self.last_physical_source = Some(source);
            }
            MoveCategory::Special => {
                self.special = self.special.saturating_add(amount);
                self.last_special_source = Some(source);
            }
            MoveCategory::Status => {}
        }
    }

    pub fn taken(&self, category: MoveCategory) -> (u16, Option<SlotRef>) {
        match category {
            MoveCategory::Physical => (self.physical, self.last_physical_source),
            MoveCategory::Special => (self.special, self.last_special_source),
            MoveCategory::Status => (0, None),
        }
    }
}

/// One active position on a side.
#[derive(Clone, Debug)]
pub struct BattleSlot {
    pub index: usize,
    /// Index into the owning side's party.
    pub occupant: Option<usize>,
    pub stages: StatStages,
    pub volatile: VolatileFlags,
    /// Badly-poisoned counter; 0 when not escalating.
    pub status_turns: u8,
    pub charging: Option<ChargingMove>,
    pub protect_streak: u8,
    pub damage_taken: TurnDamage,
    pub provider: Option<ProviderId>,
}

impl BattleSlot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            occupant: None,
            stages: StatStages::default(),
            volatile: VolatileFlags::empty(),
            status_turns: 0,
            charging: None,
            protect_streak: 0,
            damage_taken: TurnDamage::default(),
            provider: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// Clears battle-local state when the occupant leaves or faints.
    pub fn clear_volatile(&mut self) {
        self.stages.reset();
        self.volatile = VolatileFlags::empty();
        self.charging = None;
        self.protect_streak = 0;
    }

    pub fn begin_turn(&mut self) {
        self.volatile.remove(VolatileFlags::PROTECTED);
        self.damage_taken = TurnDamage::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::field::SideId;
    use crate::model::Stat;

    #[test]
    fn clear_volatile_resets_battle_local_state() {
        let mut slot = BattleSlot::new(0);
        slot.stages.modify(Stat::Speed, 2).unwrap();
        slot.volatile.insert(VolatileFlags::CHARGING | VolatileFlags::SEMI_INVULNERABLE);
        slot.protect_streak = 2;
        slot.clear_volatile();
        assert_eq!(slot.stages.get(Stat::Speed), 0);
        assert!(slot.volatile.is_empty());
        assert_eq!(slot.protect_streak, 0);
    }

    #[test]
    fn turn_damage_tracks_category_and_source() {
        let mut damage = TurnDamage::default();
        let source = SlotRef::new(SideId::Enemy, 1);
        damage.record(MoveCategory::Physical, 30, source);
        damage.record(MoveCategory::Physical, 12, source);
        assert_eq!(damage.taken(MoveCategory::Physical), (42, Some(source)));
        assert_eq!(damage.taken(MoveCategory::Special), (0, None));
    }
}
