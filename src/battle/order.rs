use crate::battle::action::{BattleAction, SWITCH_PRIORITY};
use crate::battle::field::{BattleField, SlotRef};
use crate::battle::stages::apply_stage;
use crate::battle::targeting::get_valid_targets;
use crate::content::SideConditionKind;
use crate::model::{Stat, Status};
use std::cmp::Reverse;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
struct OrderKey {
    priority: i8,
    /// Pursuit-style moves that strike before a concurrent switch.
    preempt: bool,
    speed: u32,
}

/// Base speed with stages, then paralysis, then tailwind.
pub fn effective_speed(field: &BattleField, slot: SlotRef) -> u32 {
    let Some(creature) = field.occupant(slot) else {
        return 0;
    };
    let stage = field
        .slot(slot)
        .map(|state| state.stages.get(Stat::Speed))
        .unwrap_or(0);
    let mut speed = apply_stage(creature.stats.spe, stage);
    if creature.status == Some(Status::Paralysis) {
        speed /= 2;
    }
    if field.side(slot.side).has_condition(SideConditionKind::Tailwind) {
        speed *= 2;
    }
    speed
}

pub fn action_priority(field: &BattleField, action: &BattleAction) -> i8 {
    match action {
        BattleAction::Switch { .. } => SWITCH_PRIORITY,
        BattleAction::UseMove {
            user, move_index, ..
        } => field
            .occupant(*user)
            .and_then(|creature| creature.moves.get(*move_index))
            .map(|move_data| move_data.priority)
            .unwrap_or(0),
        _ => 0,
    }
}

/// An untargeted move aims at its first legal target, as execution resolves it.
fn is_pursuit_on_switch(field: &BattleField, action: &BattleAction, switching: &[SlotRef]) -> bool {
    let BattleAction::UseMove {
        user,
        move_index,
        target,
    } = action
    else {
        return false;
    };
    let Some(move_data) = field
        .occupant(*user)
        .and_then(|creature| creature.moves.get(*move_index))
        .filter(|move_data| move_data.flags.pursuit)
    else {
        return false;
    };
    let aimed = match target {
        Some(target) => Some(*target),
        None => get_valid_targets(*user, move_data, field).first().copied(),
    };
    aimed.is_some_and(|target| switching.contains(&target))
}

fn order_key(field: &BattleField, action: &BattleAction, switching: &[SlotRef]) -> OrderKey {
    let speed = action
        .actor()
        .map(|slot| effective_speed(field, slot))
        .unwrap_or(0);
    if is_pursuit_on_switch(field, action, switching) {
        return OrderKey {
            priority: SWITCH_PRIORITY,
            preempt: true,
            speed,
        };
    }
    OrderKey {
        priority: action_priority(field, action),
        preempt: false,
        speed,
    }
}

/// Priority first, then effective speed, highest first. Equal keys keep
/// their input order, which the engine builds player side first and then
/// by ascending slot index.
pub fn compute_turn_order(field: &BattleField, actions: Vec<BattleAction>) -> Vec<BattleAction> {
    let switching: Vec<SlotRef> = actions
        .iter()
        .filter_map(|action| match action {
            BattleAction::Switch { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    let mut keyed: Vec<(OrderKey, BattleAction)> = actions
        .into_iter()
        .map(|action| (order_key(field, &action, &switching), action))
        .collect();
    keyed.sort_by_key(|(key, _)| Reverse(*key));
    keyed.into_iter().map(|(_, action)| action).collect()
}
