use crate::battle::field::{BattleField, SlotRef};
use crate::model::{MoveData, MoveTarget};

/// Legal targets for `user` using `move_data`, in slot order. Pure.
///
/// Fainted and empty slots are never returned. Single-target moves list
/// every candidate; the provider picks one.
pub fn get_valid_targets(user: SlotRef, move_data: &MoveData, field: &BattleField) -> Vec<SlotRef> {
    match move_data.target {
        MoveTarget::User => {
            if field.is_active(user) {
                vec![user]
            } else {
                Vec::new()
            }
        }
        MoveTarget::SingleEnemy | MoveTarget::AllEnemies => active_on(field, user, false),
        MoveTarget::AllAdjacent => {
            let mut targets: Vec<SlotRef> = active_on(field, user, false)
                .into_iter()
                .filter(|slot| is_adjacent(field, user, *slot))
                .collect();
            targets.extend(
                active_on(field, user, true)
                    .into_iter()
                    .filter(|slot| *slot != user && is_adjacent(field, user, *slot)),
            );
            targets
        }
    }
}

/// Whether `other` is within reach of `user` under the format's adjacency.
pub fn is_adjacent(field: &BattleField, user: SlotRef, other: SlotRef) -> bool {
    if user == other {
        return false;
    }
    if user.side == other.side {
        return field.rules.allies_adjacent(user.index, other.index);
    }
    let opposing_slots = field.side(other.side).slots.len();
    field
        .rules
        .opponents_adjacent(user.index, other.index, opposing_slots)
}

fn active_on(field: &BattleField, user: SlotRef, own_side: bool) -> Vec<SlotRef> {
    let side = if own_side {
        user.side
    } else {
        user.side.opponent()
    };
    (0..field.side(side).slots.len())
        .map(|index| SlotRef::new(side, index))
        .filter(|slot| field.is_active(*slot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::field::SideId;
    use crate::battle::rules::{BattleRules, BossRules};
    use crate::model::{Creature, MoveCategory, Stats};
    use crate::types::Type;

    fn mon(name: &str) -> Creature {
        let stats = Stats {
            hp: 80,
            atk: 80,
            def: 80,
            spa: 80,
            spd: 80,
            spe: 80,
        };
        Creature::new(name, 50, vec![Type::Normal], stats, vec![])
    }

    fn party(n: usize) -> Vec<Creature> {
        (0..n).map(|i| mon(&format!("mon{i}"))).collect()
    }

    fn move_with(target: MoveTarget) -> MoveData {
        MoveData::new("Test", Type::Normal, MoveCategory::Physical, 50).with_target(target)
    }

    fn player(index: usize) -> SlotRef {
        SlotRef::new(SideId::Player, index)
    }

    fn enemy(index: usize) -> SlotRef {
        SlotRef::new(SideId::Enemy, index)
    }

    #[test]
    fn self_target_is_user_only() {
        let field = BattleField::new(BattleRules::doubles(), party(2), party(2)).unwrap();
        let targets = get_valid_targets(player(1), &move_with(MoveTarget::User), &field);
        assert_eq!(targets, vec![player(1)]);
    }

    #[test]
    fn single_enemy_lists_every_live_opponent() {
        let mut field = BattleField::new(BattleRules::doubles(), party(2), party(2)).unwrap();
        field.occupant_mut(enemy(0)).unwrap().current_hp = 0;
        let targets = get_valid_targets(player(0), &move_with(MoveTarget::SingleEnemy), &field);
        assert_eq!(targets, vec![enemy(1)]);
    }

    #[test]
    fn empty_slots_are_never_targets() {
        let field = BattleField::new(BattleRules::triples(), party(3), party(1)).unwrap();
        let targets = get_valid_targets(player(0), &move_with(MoveTarget::AllEnemies), &field);
        assert_eq!(targets, vec![enemy(0)]);
    }

    #[test]
    fn adjacent_in_doubles_includes_partner() {
        let field = BattleField::new(BattleRules::doubles(), party(2), party(2)).unwrap();
        let targets = get_valid_targets(player(0), &move_with(MoveTarget::AllAdjacent), &field);
        assert_eq!(targets, vec![enemy(0), enemy(1), player(1)]);
    }

    #[test]
    fn adjacent_in_triples_respects_distance() {
        let field = BattleField::new(BattleRules::triples(), party(3), party(3)).unwrap();
        let edge = get_valid_targets(player(0), &move_with(MoveTarget::AllAdjacent), &field);
        assert_eq!(edge, vec![enemy(1), enemy(2), player(1)]);
        let centre = get_valid_targets(player(1), &move_with(MoveTarget::AllAdjacent), &field);
        assert_eq!(centre, vec![enemy(0), enemy(1), enemy(2), player(0), player(2)]);
    }

    #[test]
    fn horde_player_reaches_every_enemy() {
        let field = BattleField::new(BattleRules::horde(5), party(1), party(5)).unwrap();
        let targets = get_valid_targets(player(0), &move_with(MoveTarget::AllEnemies), &field);
        assert_eq!(targets.len(), 5);
    }

    #[test]
    fn raid_boss_area_move_hits_every_raider() {
        let boss = BossRules {
            hp_multiplier: 2.0,
            stat_multiplier: 1.0,
        };
        let field = BattleField::new(BattleRules::raid(4, boss), party(4), party(1)).unwrap();
        let targets = get_valid_targets(enemy(0), &move_with(MoveTarget::AllAdjacent), &field);
        assert_eq!(targets, vec![player(0), player(1), player(2), player(3)]);
    }
}
