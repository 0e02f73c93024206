//! Damage pipeline. Every multiplier is recorded on the returned
//! [`DamageContext`] so observers never have to re-derive a hit.

use crate::battle::field::{BattleField, SlotRef};
use crate::battle::stages::apply_stage;
use crate::content::{fraction_of, SideConditionKind};
use crate::error::{BattleError, Result};
use crate::model::{Creature, DamageKind, MoveCategory, MoveData, Stat, Status};
use crate::types::{effectiveness, Type};
use rand::rngs::SmallRng;
use rand::Rng;
use serde::Serialize;

pub const CRIT_MULTIPLIER: f32 = 1.5;
pub const STAB_MULTIPLIER: f32 = 1.5;
pub const SPREAD_MULTIPLIER: f32 = 0.75;
pub const SCREEN_MULTIPLIER: f32 = 0.5;
/// Showdown: data/conditions.ts (reflect) uses 2732/4096 with more than one active per side.
pub const MULTI_SCREEN_MULTIPLIER: f32 = 2732.0 / 4096.0;
pub const TERRAIN_MULTIPLIER: f32 = 1.3;

const NEUTRAL: u32 = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOptions {
    /// Skips the critical roll when set.
    pub force_critical: Option<bool>,
    /// Replaces the 0.85..=1.0 roll when set.
    pub fixed_random: Option<f32>,
    /// Number of targets the move is hitting this turn.
    pub spread_targets: usize,
}

impl DamageOptions {
    pub fn fixed(random: f32) -> Self {
        Self {
            fixed_random: Some(random),
            force_critical: Some(false),
            ..Self::default()
        }
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.force_critical = Some(critical);
        self
    }

    pub fn with_spread(mut self, targets: usize) -> Self {
        self.spread_targets = targets;
        self
    }
}

/// One hit, fully broken down. Produced once and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DamageContext {
    pub attacker: SlotRef,
    pub defender: SlotRef,
    pub move_name: String,
    pub move_type: Type,
    pub category: MoveCategory,
    pub base_damage: u32,
    pub critical: bool,
    pub critical_multiplier: f32,
    pub stab: f32,
    pub type_effectiveness: f32,
    pub burn: f32,
    pub weather: f32,
    pub terrain: f32,
    pub screen: f32,
    pub spread: f32,
    pub random: f32,
    /// Every multiplier above except `random`, chained in 4096ths.
    pub chained: u32,
    pub final_damage: u16,
}

impl DamageContext {
    fn new(attacker: SlotRef, defender: SlotRef, move_data: &MoveData) -> Self {
        Self {
            attacker,
            defender,
            move_name: move_data.name.clone(),
            move_type: move_data.move_type,
            category: move_data.category,
            base_damage: 0,
            critical: false,
            critical_multiplier: 1.0,
            stab: 1.0,
            type_effectiveness: 1.0,
            burn: 1.0,
            weather: 1.0,
            terrain: 1.0,
            screen: 1.0,
            spread: 1.0,
            random: 1.0,
            chained: NEUTRAL,
            final_damage: 0,
        }
    }

    pub fn is_immune(&self) -> bool {
        self.type_effectiveness == 0.0
    }

    pub fn is_super_effective(&self) -> bool {
        self.type_effectiveness > 1.0
    }

    pub fn is_not_very_effective(&self) -> bool {
        self.type_effectiveness > 0.0 && self.type_effectiveness < 1.0
    }
}

pub(crate) fn chain_modifier(previous: u32, next: f32) -> u32 {
    // Showdown: battle.ts (chain)
    let next = (next * 4096.0).floor() as u64;
    ((previous as u64 * next + 2048) >> 12) as u32
}

fn compute_base_damage(attacker_level: u8, attack: u32, defense: u32, move_power: u16) -> u32 {
    // Showdown: battle-actions.ts (baseDamage)
    let level = attacker_level as u32;
    let defense = defense.max(1);
    let mut base_damage = 2 * level / 5 + 2;
    base_damage = base_damage.saturating_mul(move_power as u32);
    base_damage = base_damage.saturating_mul(attack);
    base_damage /= defense;
    base_damage /= 50;
    base_damage.saturating_add(2)
}

fn random_percent(options: &DamageOptions, rng: &mut SmallRng) -> u32 {
    match options.fixed_random {
        Some(factor) => ((factor * 100.0).round() as i32).clamp(85, 100) as u32,
        None => rng.gen_range(85..=100),
    }
}

fn finish(base: u32, chained: u32, percent: u32) -> u16 {
    let value = base as u64 * chained as u64 * percent as u64 / (4096 * 100);
    value.min(u16::MAX as u64) as u16
}

fn critical_hit(
    attacker: &Creature,
    defender: &Creature,
    move_data: &MoveData,
    options: &DamageOptions,
    rng: &mut SmallRng,
) -> bool {
    if let Some(forced) = options.force_critical {
        return forced;
    }
    if defender.has_ability("Battle Armor") || defender.has_ability("Shell Armor") {
        return false;
    }
    let mut stage = move_data.crit_stage;
    if attacker.has_ability("Super Luck") {
        stage = stage.saturating_add(1);
    }
    // Showdown: battle-actions.ts (critRatio table, gen 7+)
    let denominator = match stage {
        0 => 24,
        1 => 8,
        2 => 2,
        _ => return true,
    };
    rng.gen_range(0..denominator) == 0
}

fn occupant_of(field: &BattleField, slot: SlotRef) -> Result<&Creature> {
    field.check_slot(slot)?;
    field.occupant(slot).ok_or(BattleError::EmptySlot(slot))
}

/// Runs the full pipeline for one attacker/defender pair.
pub fn calculate(
    field: &BattleField,
    attacker: SlotRef,
    defender: SlotRef,
    move_data: &MoveData,
    options: DamageOptions,
    rng: &mut SmallRng,
) -> Result<DamageContext> {
    let user = occupant_of(field, attacker)?;
    let target = occupant_of(field, defender)?;
    let mut context = DamageContext::new(attacker, defender, move_data);
    if !move_data.is_damaging() {
        return Ok(context);
    }
    match move_data.damage {
        DamageKind::Standard => {
            standard_damage(field, user, target, move_data, &options, rng, &mut context);
        }
        kind => {
            let base = match kind {
                DamageKind::Fixed { amount } => amount as u32,
                DamageKind::Level => user.level as u32,
                DamageKind::PercentMaxHp { percent } => {
                    fraction_of(target.max_hp(), (percent as u16, 100)) as u32
                }
                DamageKind::Counter { category } => field
                    .slot(attacker)
                    .map(|slot| slot.damage_taken.taken(category).0 as u32 * 2)
                    .unwrap_or(0),
                DamageKind::Standard => 0,
            };
            let percent = if move_data.fixed_random {
                random_percent(&options, rng)
            } else {
                100
            };
            context.base_damage = base;
            context.random = percent as f32 / 100.0;
            context.final_damage = finish(base, NEUTRAL, percent);
        }
    }
    Ok(context)
}

fn standard_damage(
    field: &BattleField,
    user: &Creature,
    target: &Creature,
    move_data: &MoveData,
    options: &DamageOptions,
    rng: &mut SmallRng,
    context: &mut DamageContext,
) {
    let physical = matches!(move_data.category, MoveCategory::Physical);
    let (attack_stat, defense_stat) = if physical {
        (Stat::Attack, Stat::Defense)
    } else {
        (Stat::SpecialAttack, Stat::SpecialDefense)
    };

    let critical = critical_hit(user, target, move_data, options, rng);
    let mut attack_stage = field
        .slot(context.attacker)
        .map(|slot| slot.stages.get(attack_stat))
        .unwrap_or(0);
    let mut defense_stage = field
        .slot(context.defender)
        .map(|slot| slot.stages.get(defense_stat))
        .unwrap_or(0);
    if critical {
        attack_stage = attack_stage.max(0);
        defense_stage = defense_stage.min(0);
    }
    let attack = apply_stage(user.stats.get(attack_stat), attack_stage);
    let defense = apply_stage(target.stats.get(defense_stat), defense_stage);

    // 1. base
    context.base_damage = compute_base_damage(user.level, attack, defense, move_data.power);
    let mut chained = NEUTRAL;

    // 2. critical
    context.critical = critical;
    if critical {
        context.critical_multiplier = CRIT_MULTIPLIER;
        chained = chain_modifier(chained, CRIT_MULTIPLIER);
    }

    // 3. STAB
    if user.has_type(move_data.move_type) {
        context.stab = STAB_MULTIPLIER;
        chained = chain_modifier(chained, STAB_MULTIPLIER);
    }

    // 4. type effectiveness
    let levitating = move_data.move_type == Type::Ground && target.has_ability("Levitate");
    let type_effectiveness = if levitating {
        0.0
    } else {
        effectiveness(move_data.move_type, &target.types)
    };
    context.type_effectiveness = type_effectiveness;
    if type_effectiveness == 0.0 {
        context.chained = 0;
        context.final_damage = 0;
        return;
    }
    chained = chain_modifier(chained, type_effectiveness);

    // 5. burn
    if physical && user.status == Some(Status::Burn) && !user.has_ability("Guts") {
        context.burn = 0.5;
        chained = chain_modifier(chained, 0.5);
    }

    // 6. weather and terrain
    if let Some(weather) = field.weather.data() {
        if weather.boosted_type == Some(move_data.move_type) {
            context.weather = 1.5;
        } else if weather.weakened_type == Some(move_data.move_type) {
            context.weather = 0.5;
        }
        chained = chain_modifier(chained, context.weather);
    }
    if let Some(terrain) = field.terrain.data() {
        if user.is_grounded() && terrain.boosted_type == Some(move_data.move_type) {
            context.terrain = TERRAIN_MULTIPLIER;
            chained = chain_modifier(chained, TERRAIN_MULTIPLIER);
        }
    }

    // 7. screens
    if !critical && !move_data.flags.bypasses_screens {
        let side = field.side(context.defender.side);
        let screened = side.has_condition(SideConditionKind::AuroraVeil)
            || if physical {
                side.has_condition(SideConditionKind::Reflect)
            } else {
                side.has_condition(SideConditionKind::LightScreen)
            };
        if screened {
            context.screen = if field.rules.is_multi_battle() {
                MULTI_SCREEN_MULTIPLIER
            } else {
                SCREEN_MULTIPLIER
            };
            chained = chain_modifier(chained, context.screen);
        }
    }

    // 8. spread
    if options.spread_targets > 1 {
        context.spread = SPREAD_MULTIPLIER;
        chained = chain_modifier(chained, SPREAD_MULTIPLIER);
    }

    // 9. random
    let percent = random_percent(options, rng);
    context.random = percent as f32 / 100.0;

    // 10. final, never below 1 on a connecting hit
    context.chained = chained;
    context.final_damage = finish(context.base_damage, chained, percent).max(1);
}
