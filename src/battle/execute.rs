//! Executes one action against the field and returns its reactions.
//!
//! Nothing in here fails: a precondition that does not hold becomes a
//! `Message` reaction and leaves the rest of the state alone.

use crate::battle::action::{BattleAction, DamageSource, HealSource};
use crate::battle::damage::{calculate, DamageOptions};
use crate::battle::end_of_turn::MAX_TOXIC_COUNTER;
use crate::battle::field::{BattleField, SlotRef};
use crate::battle::hazards::process_hazards;
use crate::battle::slot::{ChargingMove, VolatileFlags};
use crate::battle::stages::hit_chance;
use crate::battle::targeting::get_valid_targets;
use crate::content::{fraction_of, HazardLookup, SideConditionKind};
use crate::model::{
    DamageKind, FieldEffect, MoveData, MoveTarget, SecondaryEffect, SecondaryKind, Stat, Status,
};
use crate::types::Type;
use crate::view::{BattleEvent, BattleView};
use rand::rngs::SmallRng;
use rand::Rng;
use tracing::{debug, warn};

/// Everything an action may touch besides the field.
pub struct ActionContext<'a> {
    pub rng: &'a mut SmallRng,
    pub hazards: &'a dyn HazardLookup,
    pub view: &'a mut dyn BattleView,
}

impl ActionContext<'_> {
    pub fn notify(&mut self, event: BattleEvent) {
        if let Err(err) = self.view.notify(&event) {
            warn!(error = %err, "battle view failed; continuing");
        }
    }
}

fn name_of(field: &BattleField, slot: SlotRef) -> String {
    field
        .occupant(slot)
        .map(|creature| creature.name.clone())
        .unwrap_or_else(|| slot.to_string())
}

pub fn execute_action(
    field: &mut BattleField,
    action: BattleAction,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    debug!(kind = action.kind(), "executing action");
    match action {
        BattleAction::UseMove {
            user,
            move_index,
            target,
        } => use_move(field, user, move_index, target, ctx),
        BattleAction::Damage {
            target,
            amount,
            source,
        } => apply_damage(field, target, amount, source, ctx),
        BattleAction::Heal {
            target,
            amount,
            source,
        } => apply_heal(field, target, amount, source, ctx),
        BattleAction::StatChange { target, stat, delta } => {
            change_stat(field, target, stat, delta, ctx)
        }
        BattleAction::ApplyStatus {
            source,
            target,
            status,
        } => apply_status(field, source, target, status, ctx),
        BattleAction::Switch { slot, party_index } => switch_in(field, slot, party_index, ctx),
        BattleAction::Faint { target } => faint(field, target, ctx),
        BattleAction::Message { text } => {
            ctx.notify(BattleEvent::Message { text });
            Vec::new()
        }
    }
}

// -- UseMove ---------------------------------------------------------------

/// Sleep, freeze and paralysis checks. Returns whether the user acts.
fn can_act(
    field: &mut BattleField,
    user: SlotRef,
    rng: &mut SmallRng,
    reactions: &mut Vec<BattleAction>,
) -> bool {
    let Some(creature) = field.occupant_mut(user) else {
        return false;
    };
    let name = creature.name.clone();
    match creature.status {
        Some(Status::Sleep) => {
            if creature.sleep_turns > 0 {
                creature.sleep_turns -= 1;
                reactions.push(BattleAction::message(format!("{name} is fast asleep.")));
                return false;
            }
            creature.status = None;
            reactions.push(BattleAction::message(format!("{name} woke up!")));
            true
        }
        // Showdown: data/conditions.ts (frz 20% thaw)
        Some(Status::Freeze) => {
            if rng.gen_range(0..5) == 0 {
                creature.status = None;
                reactions.push(BattleAction::message(format!("{name} thawed out!")));
                return true;
            }
            reactions.push(BattleAction::message(format!("{name} is frozen solid!")));
            false
        }
        // Showdown: data/conditions.ts (par 25% full paralysis)
        Some(Status::Paralysis) => {
            if rng.gen_range(0..4) == 0 {
                reactions.push(BattleAction::message(format!(
                    "{name} is paralyzed! It can't move!"
                )));
                return false;
            }
            true
        }
        _ => true,
    }
}

fn use_move(
    field: &mut BattleField,
    user: SlotRef,
    move_index: usize,
    chosen: Option<SlotRef>,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    if !field.is_active(user) {
        return Vec::new();
    }
    let user_name = name_of(field, user);
    let Some(move_data) = field
        .occupant(user)
        .and_then(|creature| creature.moves.get(move_index))
        .cloned()
    else {
        warn!(%user, move_index, "move index out of range");
        return vec![BattleAction::message(format!(
            "{user_name} has no move in slot {move_index}."
        ))];
    };

    let mut reactions = Vec::new();
    if !can_act(field, user, ctx.rng, &mut reactions) {
        if let Some(slot) = field.slot_mut(user) {
            slot.charging = None;
            slot.volatile
                .remove(VolatileFlags::CHARGING | VolatileFlags::SEMI_INVULNERABLE);
            slot.protect_streak = 0;
        }
        return reactions;
    }

    let mut chosen = chosen;
    if move_data.flags.two_turn {
        let Some(slot) = field.slot_mut(user) else {
            return reactions;
        };
        match slot.charging.take() {
            Some(charged) if charged.move_index == move_index => {
                slot.volatile
                    .remove(VolatileFlags::CHARGING | VolatileFlags::SEMI_INVULNERABLE);
                chosen = charged.target;
            }
            _ => {
                slot.charging = Some(ChargingMove {
                    move_index,
                    target: chosen,
                });
                slot.volatile.insert(VolatileFlags::CHARGING);
                if move_data.flags.semi_invulnerable {
                    slot.volatile.insert(VolatileFlags::SEMI_INVULNERABLE);
                }
                reactions.push(BattleAction::message(format!(
                    "{user_name} is charging up {}!",
                    move_data.name
                )));
                return reactions;
            }
        }
    }

    let targets = resolve_targets(field, user, &move_data, chosen);
    ctx.notify(BattleEvent::MoveUsed {
        user,
        user_name: user_name.clone(),
        move_name: move_data.name.clone(),
        target: targets.first().map(|slot| (*slot, name_of(field, *slot))),
    });

    if move_data.flags.protect {
        reactions.push(try_protect(field, user, &user_name, ctx.rng));
        return reactions;
    }
    if let Some(slot) = field.slot_mut(user) {
        slot.protect_streak = 0;
    }

    if let Some(effect) = move_data.field_effect {
        reactions.extend(apply_field_effect(field, user, effect, ctx));
    }

    if move_data.target == MoveTarget::User {
        if let Some(secondary) = move_data.secondary {
            reactions.extend(roll_secondary(user, user, secondary, ctx.rng));
        }
        reactions.extend(self_heal(field, user, &move_data));
        return reactions;
    }

    if targets.is_empty() {
        if move_data.field_effect.is_none() {
            reactions.push(BattleAction::message("But there was no target..."));
        }
        return reactions;
    }

    let spread = targets.len();
    for target in targets {
        reactions.extend(hit_target(field, user, target, &move_data, spread, ctx));
    }
    reactions.extend(self_heal(field, user, &move_data));
    reactions
}

/// A chosen single target that is no longer legal resolves to nothing.
fn resolve_targets(
    field: &BattleField,
    user: SlotRef,
    move_data: &MoveData,
    chosen: Option<SlotRef>,
) -> Vec<SlotRef> {
    if let DamageKind::Counter { category } = move_data.damage {
        let (_, source) = field
            .slot(user)
            .map(|slot| slot.damage_taken.taken(category))
            .unwrap_or((0, None));
        return source.filter(|slot| field.is_active(*slot)).into_iter().collect();
    }
    let legal = get_valid_targets(user, move_data, field);
    match move_data.target {
        MoveTarget::SingleEnemy => match chosen {
            Some(target) if legal.contains(&target) => vec![target],
            Some(_) => Vec::new(),
            None => legal.into_iter().take(1).collect(),
        },
        _ => legal,
    }
}

// Showdown: data/moves.ts (protect, stall condition: 1/3^n)
fn try_protect(
    field: &mut BattleField,
    user: SlotRef,
    user_name: &str,
    rng: &mut SmallRng,
) -> BattleAction {
    let Some(slot) = field.slot_mut(user) else {
        return BattleAction::message("But it failed!");
    };
    let odds = 3u32.saturating_pow(slot.protect_streak as u32);
    if odds == 1 || rng.gen_range(0..odds) == 0 {
        slot.volatile.insert(VolatileFlags::PROTECTED);
        slot.protect_streak = slot.protect_streak.saturating_add(1);
        BattleAction::message(format!("{user_name} protected itself!"))
    } else {
        slot.protect_streak = 0;
        BattleAction::message("But it failed!")
    }
}

fn apply_field_effect(
    field: &mut BattleField,
    user: SlotRef,
    effect: FieldEffect,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    let text = match effect {
        FieldEffect::Weather { weather, turns } => match weather.data() {
            Some(data) if field.weather.set(weather, turns) => {
                format!("The weather became {}.", data.name)
            }
            _ => "But it failed!".to_string(),
        },
        FieldEffect::Terrain { terrain, turns } => match terrain.data() {
            Some(data) if field.terrain.set(terrain, turns) => {
                format!("{} covered the battlefield.", data.name)
            }
            _ => "But it failed!".to_string(),
        },
        FieldEffect::Hazard { hazard } => {
            let Some(data) = ctx.hazards.hazard(hazard) else {
                return vec![BattleAction::message("But it failed!")];
            };
            let victims = user.side.opponent();
            if field.side_mut(victims).add_hazard(hazard, data.max_layers) {
                format!("{} was set around the {victims} side.", data.name)
            } else {
                "But it failed!".to_string()
            }
        }
        FieldEffect::SideCondition { condition, turns } => {
            if field.side_mut(user.side).add_condition(condition, turns) {
                format!("{condition:?} went up on the {} side.", user.side)
            } else {
                "But it failed!".to_string()
            }
        }
    };
    vec![BattleAction::message(text)]
}

fn accuracy_hits(
    field: &BattleField,
    user: SlotRef,
    target: SlotRef,
    move_data: &MoveData,
    rng: &mut SmallRng,
) -> bool {
    let Some(accuracy) = move_data.accuracy else {
        return true;
    };
    let stage_of = |slot: SlotRef, stat: Stat| {
        field
            .slot(slot)
            .map(|state| state.stages.get(stat))
            .unwrap_or(0)
    };
    let threshold = hit_chance(
        accuracy,
        stage_of(user, Stat::Accuracy),
        stage_of(target, Stat::Evasion),
    );
    rng.gen_range(0..100) < threshold
}

fn hit_target(
    field: &BattleField,
    user: SlotRef,
    target: SlotRef,
    move_data: &MoveData,
    spread: usize,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    let user_name = name_of(field, user);
    let target_name = name_of(field, target);
    let Some(target_slot) = field.slot(target) else {
        return Vec::new();
    };
    if target != user
        && target_slot.volatile.contains(VolatileFlags::PROTECTED)
        && !move_data.flags.bypasses_protect
    {
        return vec![BattleAction::message(format!("{target_name} protected itself!"))];
    }
    if target_slot.volatile.contains(VolatileFlags::SEMI_INVULNERABLE) {
        return vec![BattleAction::message(format!("{user_name}'s attack missed!"))];
    }
    if !accuracy_hits(field, user, target, move_data, ctx.rng) {
        return vec![BattleAction::message(format!("{user_name}'s attack missed!"))];
    }

    let mut reactions = Vec::new();
    if move_data.is_damaging() {
        let options = DamageOptions {
            spread_targets: spread,
            ..DamageOptions::default()
        };
        let context = match calculate(field, user, target, move_data, options, ctx.rng) {
            Ok(context) => context,
            Err(err) => {
                warn!(error = %err, "damage calculation rejected");
                return vec![BattleAction::message("But it failed!")];
            }
        };
        debug!(?context, "damage computed");
        if context.is_immune() {
            return vec![BattleAction::message(format!("It doesn't affect {target_name}..."))];
        }
        if context.final_damage == 0 {
            return vec![BattleAction::message("But it failed!")];
        }
        let critical = context.critical;
        let super_effective = context.is_super_effective();
        let not_very_effective = context.is_not_very_effective();
        reactions.push(BattleAction::Damage {
            target,
            amount: context.final_damage,
            source: DamageSource::Move {
                user,
                context: Box::new(context),
            },
        });
        if critical {
            reactions.push(BattleAction::message("A critical hit!"));
        }
        if super_effective {
            reactions.push(BattleAction::message("It's super effective!"));
        } else if not_very_effective {
            reactions.push(BattleAction::message("It's not very effective..."));
        }
    }
    if let Some(secondary) = move_data.secondary {
        reactions.extend(roll_secondary(user, target, secondary, ctx.rng));
    }
    reactions
}

fn roll_secondary(
    user: SlotRef,
    target: SlotRef,
    secondary: SecondaryEffect,
    rng: &mut SmallRng,
) -> Option<BattleAction> {
    if secondary.chance < 100 && rng.gen_range(0..100) >= secondary.chance as u32 {
        return None;
    }
    let recipient = if secondary.on_user { user } else { target };
    Some(match secondary.effect {
        SecondaryKind::Status { status } => BattleAction::ApplyStatus {
            source: Some(user),
            target: recipient,
            status,
        },
        SecondaryKind::Boost { stat, stages } => BattleAction::StatChange {
            target: recipient,
            stat,
            delta: stages,
        },
    })
}

fn self_heal(field: &BattleField, user: SlotRef, move_data: &MoveData) -> Option<BattleAction> {
    let percent = move_data.heal_percent?;
    let creature = field.occupant(user)?;
    Some(BattleAction::Heal {
        target: user,
        amount: fraction_of(creature.max_hp(), (percent as u16, 100)),
        source: HealSource::Move(user),
    })
}

// -- HP --------------------------------------------------------------------

fn apply_damage(
    field: &mut BattleField,
    target: SlotRef,
    amount: u16,
    source: DamageSource,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    let Some((slot, creature)) = field.slot_and_occupant_mut(target) else {
        return Vec::new();
    };
    if creature.is_fainted() {
        return Vec::new();
    }
    let dealt = creature.take_damage(amount);
    match &source {
        DamageSource::Move { user, context } => {
            slot.damage_taken.record(context.category, dealt, *user)
        }
        DamageSource::Status(Status::BadlyPoisoned) => {
            slot.status_turns = slot.status_turns.max(1).saturating_add(1).min(MAX_TOXIC_COUNTER);
        }
        _ => {}
    }
    let event = BattleEvent::Damaged {
        target,
        name: creature.name.clone(),
        amount: dealt,
        hp: creature.current_hp,
        max_hp: creature.max_hp(),
    };
    let fainted = creature.is_fainted();
    ctx.notify(event);
    if fainted {
        vec![BattleAction::Faint { target }]
    } else {
        Vec::new()
    }
}

fn apply_heal(
    field: &mut BattleField,
    target: SlotRef,
    amount: u16,
    source: HealSource,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    let Some(creature) = field.occupant_mut(target) else {
        return Vec::new();
    };
    if creature.is_fainted() {
        return Vec::new();
    }
    let healed = creature.heal(amount);
    if healed == 0 {
        return match source {
            HealSource::Move(_) => {
                vec![BattleAction::message(format!("{}'s HP is full!", creature.name))]
            }
            _ => Vec::new(),
        };
    }
    let event = BattleEvent::Healed {
        target,
        name: creature.name.clone(),
        amount: healed,
        hp: creature.current_hp,
        max_hp: creature.max_hp(),
    };
    ctx.notify(event);
    Vec::new()
}

// -- Stages and status -----------------------------------------------------

fn change_stat(
    field: &mut BattleField,
    target: SlotRef,
    stat: Stat,
    delta: i8,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    if !field.is_active(target) {
        return Vec::new();
    }
    let name = name_of(field, target);
    let Some(slot) = field.slot_mut(target) else {
        return Vec::new();
    };
    match slot.stages.modify(stat, delta) {
        Err(err) => {
            warn!(error = %err, %target, "stat change rejected");
            vec![BattleAction::message(format!("{name}'s {stat} can't be changed!"))]
        }
        Ok(0) => {
            let direction = if delta >= 0 { "higher" } else { "lower" };
            vec![BattleAction::message(format!("{name}'s {stat} won't go any {direction}!"))]
        }
        Ok(change) => {
            ctx.notify(BattleEvent::StatChanged {
                target,
                name,
                stat,
                change,
            });
            Vec::new()
        }
    }
}

fn immune_to_status(types: &[Type], status: Status) -> bool {
    let has = |ty: Type| types.contains(&ty);
    match status {
        Status::Burn => has(Type::Fire),
        Status::Paralysis => has(Type::Electric),
        Status::Poison | Status::BadlyPoisoned => has(Type::Poison) || has(Type::Steel),
        Status::Freeze => has(Type::Ice),
        Status::Sleep => false,
    }
}

fn apply_status(
    field: &mut BattleField,
    source: Option<SlotRef>,
    target: SlotRef,
    status: Status,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    let safeguarded = field.side(target.side).has_condition(SideConditionKind::Safeguard);
    let terrain = field.terrain.data();
    let Some((slot, creature)) = field.slot_and_occupant_mut(target) else {
        return Vec::new();
    };
    if creature.is_fainted() {
        return Vec::new();
    }
    let name = creature.name.clone();
    let self_inflicted = source == Some(target);
    let blocked_by_terrain = creature.is_grounded()
        && terrain.is_some_and(|data| {
            data.blocks_all_status || (data.blocks_sleep && status == Status::Sleep)
        });
    let failure = if creature.status.is_some() {
        Some(format!("{name} already has a status condition."))
    } else if immune_to_status(&creature.types, status) {
        Some(format!("It doesn't affect {name}..."))
    } else if safeguarded && !self_inflicted {
        Some(format!("{name} is protected by Safeguard!"))
    } else if blocked_by_terrain {
        Some(format!("{name} is protected by the terrain!"))
    } else {
        None
    };
    if let Some(text) = failure {
        return vec![BattleAction::message(text)];
    }

    creature.status = Some(status);
    match status {
        Status::Sleep => creature.sleep_turns = ctx.rng.gen_range(1..=3),
        Status::BadlyPoisoned => slot.status_turns = 1,
        _ => {}
    }
    ctx.notify(BattleEvent::StatusApplied { target, name, status });
    Vec::new()
}

// -- Slots -----------------------------------------------------------------

fn switch_in(
    field: &mut BattleField,
    slot_ref: SlotRef,
    party_index: usize,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    if field.check_slot(slot_ref).is_err() {
        warn!(slot = %slot_ref, "switch into a slot that does not exist");
        return vec![BattleAction::message(format!("There is no slot {slot_ref}."))];
    }
    let side = field.side(slot_ref.side);
    let failure = match side.party.get(party_index) {
        None => Some(format!("There is no party member {party_index}.")),
        Some(creature) if creature.is_fainted() => {
            Some(format!("{} has no energy left to battle!", creature.name))
        }
        Some(creature) if side.active_slot_of(party_index).is_some() => {
            Some(format!("{} is already in battle!", creature.name))
        }
        Some(_) => None,
    };
    if let Some(text) = failure {
        return vec![BattleAction::message(text)];
    }

    let side = field.side_mut(slot_ref.side);
    let badly_poisoned = side.party[party_index].status == Some(Status::BadlyPoisoned);
    let Some(slot) = side.slots.get_mut(slot_ref.index) else {
        return Vec::new();
    };
    slot.clear_volatile();
    slot.damage_taken = Default::default();
    slot.status_turns = if badly_poisoned { 1 } else { 0 };
    slot.occupant = Some(party_index);

    let entrant = side.party[party_index].clone();
    ctx.notify(BattleEvent::SwitchedIn {
        slot: slot_ref,
        name: entrant.name.clone(),
        hp: entrant.current_hp,
        max_hp: entrant.max_hp(),
    });

    let sweep = process_hazards(slot_ref, &entrant, field, ctx.hazards);
    let mut reactions = Vec::new();
    for kind in sweep.clear {
        field.side_mut(slot_ref.side).clear_hazard(kind);
        let name = ctx.hazards.hazard(kind).map(|data| data.name).unwrap_or(kind.id());
        reactions.push(BattleAction::message(format!(
            "{} absorbed the {name}!",
            entrant.name
        )));
    }
    reactions.extend(sweep.reactions);
    reactions
}

fn faint(
    field: &mut BattleField,
    target: SlotRef,
    ctx: &mut ActionContext<'_>,
) -> Vec<BattleAction> {
    let Some((slot, creature)) = field.slot_and_occupant_mut(target) else {
        return Vec::new();
    };
    if !creature.is_fainted() {
        return Vec::new();
    }
    slot.clear_volatile();
    slot.status_turns = 0;
    let name = creature.name.clone();
    ctx.notify(BattleEvent::Fainted { target, name });
    Vec::new()
}
