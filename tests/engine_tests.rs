use pokemon_battle_engine::battle::{BattleRules, EndOfTurnProcessor, ResidualEffects};
use pokemon_battle_engine::content::{HazardData, HazardKind};
use pokemon_battle_engine::model::{MoveFlags, MoveTarget};
use pokemon_battle_engine::prelude::*;
use std::sync::{Arc, Mutex};

fn stats(hp: u16, atk: u16, spe: u16) -> Stats {
    Stats {
        hp,
        atk,
        def: 80,
        spa: 80,
        spd: 80,
        spe,
    }
}

fn tackle() -> MoveData {
    MoveData::new("Tackle", Type::Normal, MoveCategory::Physical, 40)
}

fn pursuit() -> MoveData {
    MoveData::new("Pursuit", Type::Dark, MoveCategory::Physical, 40).with_flags(MoveFlags {
        pursuit: true,
        ..MoveFlags::default()
    })
}

fn mon(name: &str, hp: u16, spe: u16, moves: Vec<MoveData>) -> Creature {
    Creature::new(name, 50, vec![Type::Normal], stats(hp, 80, spe), moves)
}

fn fainted(mut creature: Creature) -> Creature {
    creature.current_hp = 0;
    creature
}

fn player(index: usize) -> SlotRef {
    SlotRef::new(SideId::Player, index)
}

fn enemy(index: usize) -> SlotRef {
    SlotRef::new(SideId::Enemy, index)
}

fn engine(
    rules: BattleRules,
    players: Vec<Creature>,
    enemies: Vec<Creature>,
    player_provider: Arc<dyn ActionProvider>,
    enemy_provider: Arc<dyn ActionProvider>,
) -> (CombatEngine, Arc<Mutex<BattleLogger>>) {
    let logger = Arc::new(Mutex::new(BattleLogger::new()));
    let mut engine = CombatEngine::with_seed(17);
    engine
        .initialize(
            rules,
            players,
            enemies,
            player_provider,
            enemy_provider,
            Box::new(logger.clone()),
        )
        .unwrap();
    (engine, logger)
}

fn moves_in_order(logger: &Arc<Mutex<BattleLogger>>) -> Vec<String> {
    logger
        .lock()
        .unwrap()
        .log_lines()
        .iter()
        .filter(|line| line.starts_with("|move|"))
        .cloned()
        .collect()
}

#[tokio::test]
async fn running_before_initialize_is_an_error() {
    let mut engine = CombatEngine::with_seed(1);
    assert!(!engine.is_initialized());
    assert_eq!(engine.run_turn().await, Err(BattleError::NotInitialized));
    assert_eq!(engine.run_battle().await, Err(BattleError::NotInitialized));
}

#[test]
fn initialize_rejects_empty_parties_and_bad_rules() {
    let mut engine = CombatEngine::with_seed(1);
    let err = engine.initialize(
        BattleRules::singles(),
        vec![],
        vec![mon("Foe", 100, 50, vec![tackle()])],
        Arc::new(PassProvider),
        Arc::new(PassProvider),
        Box::new(NullView),
    );
    assert_eq!(err, Err(BattleError::EmptyParty { side: SideId::Player }));

    let mut rules = BattleRules::doubles();
    rules.enemy_slots = 0;
    let err = engine.initialize(
        rules,
        vec![mon("Hero", 100, 50, vec![tackle()])],
        vec![mon("Foe", 100, 50, vec![tackle()])],
        Arc::new(PassProvider),
        Arc::new(PassProvider),
        Box::new(NullView),
    );
    assert_eq!(err, Err(BattleError::InvalidSlotCount { side: SideId::Enemy }));
    assert!(!engine.is_initialized());
}

#[tokio::test]
async fn exhausted_enemy_is_a_victory_after_one_turn() {
    let (mut engine, logger) = engine(
        BattleRules::singles(),
        vec![mon("Hero", 100, 50, vec![tackle()])],
        vec![fainted(mon("Foe", 100, 50, vec![tackle()]))],
        Arc::new(PassProvider),
        Arc::new(PassProvider),
    );
    let report = engine.run_battle().await.unwrap();
    assert_eq!(report, BattleReport { outcome: BattleOutcome::Victory, turns: 1 });
    assert_eq!(logger.lock().unwrap().log_lines().last().map(String::as_str), Some("|win|player"));
}

#[tokio::test]
async fn both_sides_exhausted_is_an_immediate_draw() {
    let (mut engine, logger) = engine(
        BattleRules::singles(),
        vec![fainted(mon("Hero", 100, 50, vec![tackle()]))],
        vec![fainted(mon("Foe", 100, 50, vec![tackle()]))],
        Arc::new(PassProvider),
        Arc::new(PassProvider),
    );
    let report = engine.run_battle().await.unwrap();
    assert_eq!(report, BattleReport { outcome: BattleOutcome::Draw, turns: 0 });
    assert_eq!(logger.lock().unwrap().log_lines(), ["|tie|"]);
}

#[tokio::test]
async fn turn_limit_leaves_the_battle_ongoing() {
    let (mut engine, _) = engine(
        BattleRules::singles().with_turn_limit(3),
        vec![mon("Hero", 100, 50, vec![tackle()])],
        vec![mon("Foe", 100, 50, vec![tackle()])],
        Arc::new(PassProvider),
        Arc::new(PassProvider),
    );
    let report = engine.run_battle().await.unwrap();
    assert_eq!(report, BattleReport { outcome: BattleOutcome::Ongoing, turns: 3 });
}

#[tokio::test]
async fn priority_beats_speed_and_speed_breaks_equal_priority() {
    let quick =
        MoveData::new("Quick Attack", Type::Normal, MoveCategory::Physical, 40).with_priority(1);
    let script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(player(0), 0, Some(enemy(0))))
        .with_action(BattleAction::use_move(player(0), 1, Some(enemy(0))));
    let foe_script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(enemy(0), 0, Some(player(0))))
        .with_action(BattleAction::use_move(enemy(0), 0, Some(player(0))));
    let (mut engine, logger) = engine(
        BattleRules::singles(),
        vec![mon("Slow", 400, 30, vec![quick, tackle()])],
        vec![mon("Fast", 400, 120, vec![tackle()])],
        Arc::new(script),
        Arc::new(foe_script),
    );

    engine.run_turn().await.unwrap();
    engine.run_turn().await.unwrap();
    assert_eq!(
        moves_in_order(&logger),
        [
            "|move|p1a: Slow|Quick Attack|p2a: Fast",
            "|move|p2a: Fast|Tackle|p1a: Slow",
            "|move|p2a: Fast|Tackle|p1a: Slow",
            "|move|p1a: Slow|Tackle|p2a: Fast",
        ]
    );
}

#[tokio::test]
async fn badly_poisoned_damage_grows_each_turn() {
    let hero = mon("Hero", 160, 50, vec![tackle()]).with_status(Status::BadlyPoisoned);
    let (mut engine, _) = engine(
        BattleRules::singles(),
        vec![hero],
        vec![mon("Foe", 100, 50, vec![tackle()])],
        Arc::new(PassProvider),
        Arc::new(PassProvider),
    );
    let mut hp = Vec::new();
    for _ in 0..3 {
        engine.run_turn().await.unwrap();
        hp.push(engine.field().unwrap().occupant(player(0)).unwrap().current_hp);
    }
    assert_eq!(hp, [150, 130, 100]);
}

#[tokio::test]
async fn spread_move_hits_every_enemy() {
    let rock_slide = MoveData::new("Rock Slide", Type::Rock, MoveCategory::Physical, 75)
        .with_target(MoveTarget::AllEnemies);
    let script = ScriptedProvider::new().with_action(BattleAction::use_move(player(0), 0, None));
    let (mut engine, logger) = engine(
        BattleRules::doubles(),
        vec![
            mon("Hero", 200, 90, vec![rock_slide]),
            mon("Partner", 200, 40, vec![tackle()]),
        ],
        vec![mon("FoeA", 200, 50, vec![tackle()]), mon("FoeB", 200, 50, vec![tackle()])],
        Arc::new(script),
        Arc::new(PassProvider),
    );
    engine.run_turn().await.unwrap();

    let field = engine.field().unwrap();
    for slot in [enemy(0), enemy(1)] {
        assert!(field.occupant(slot).unwrap().current_hp < 200, "{slot} untouched");
    }
    assert_eq!(field.occupant(player(1)).unwrap().current_hp, 200);
    assert_eq!(moves_in_order(&logger), ["|move|p1a: Hero|Rock Slide|p2a: FoeA"]);
}

#[tokio::test]
async fn fainted_slot_is_refilled_through_entry_hazards() {
    let mut lead = mon("Lead", 96, 10, vec![tackle()]);
    lead.current_hp = 1;
    let script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(player(0), 0, Some(enemy(0))));
    let (mut engine, logger) = engine(
        BattleRules::singles(),
        vec![mon("Hero", 200, 90, vec![tackle()])],
        vec![lead, mon("Reserve", 96, 10, vec![tackle()])],
        Arc::new(script),
        Arc::new(PassProvider),
    );
    engine
        .field_mut()
        .unwrap()
        .side_mut(SideId::Enemy)
        .add_hazard(HazardKind::Spikes, 3);

    engine.run_turn().await.unwrap();

    let field = engine.field().unwrap();
    let reserve = field.occupant(enemy(0)).unwrap();
    assert_eq!(reserve.name, "Reserve");
    assert_eq!(reserve.current_hp, 84);
    let lines = logger.lock().unwrap().log_lines().to_vec();
    assert!(lines.contains(&"|faint|p2a: Lead".to_string()));
    assert!(lines.contains(&"|switch|p2a: Reserve|Reserve|96/96".to_string()));
    assert!(lines.contains(&"|-damage|p2a: Reserve|84/96".to_string()));
}

#[tokio::test]
async fn switches_resolve_before_moves() {
    let script = ScriptedProvider::new().with_action(BattleAction::switch(player(0), 1));
    let foe_script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(enemy(0), 0, Some(player(0))));
    let (mut engine, _) = engine(
        BattleRules::singles(),
        vec![mon("Lead", 150, 200, vec![tackle()]), mon("Bench", 150, 10, vec![tackle()])],
        vec![mon("Foe", 150, 50, vec![tackle()])],
        Arc::new(script),
        Arc::new(foe_script),
    );
    engine.run_turn().await.unwrap();

    let side = engine.field().unwrap().side(SideId::Player);
    assert_eq!(side.slots[0].occupant, Some(1));
    assert_eq!(side.party[0].current_hp, 150);
    assert!(side.party[1].current_hp < 150);
}

#[tokio::test]
async fn pursuit_catches_the_switching_creature() {
    let script = ScriptedProvider::new().with_action(BattleAction::switch(player(0), 1));
    let foe_script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(enemy(0), 0, Some(player(0))));
    let (mut engine, logger) = engine(
        BattleRules::singles(),
        vec![mon("Lead", 150, 200, vec![tackle()]), mon("Bench", 150, 10, vec![tackle()])],
        vec![mon("Foe", 150, 10, vec![pursuit()])],
        Arc::new(script),
        Arc::new(foe_script),
    );
    engine.run_turn().await.unwrap();

    let side = engine.field().unwrap().side(SideId::Player);
    assert_eq!(side.slots[0].occupant, Some(1));
    assert!(side.party[0].current_hp < 150);
    assert_eq!(side.party[1].current_hp, 150);
    assert_eq!(moves_in_order(&logger), ["|move|p2a: Foe|Pursuit|p1a: Lead"]);
}

#[tokio::test]
async fn untargeted_pursuit_catches_the_switching_creature() {
    let script = ScriptedProvider::new().with_action(BattleAction::switch(player(0), 1));
    let foe_script = ScriptedProvider::new().with_action(BattleAction::use_move(enemy(0), 0, None));
    let (mut engine, logger) = engine(
        BattleRules::singles(),
        vec![mon("Lead", 150, 200, vec![tackle()]), mon("Bench", 150, 10, vec![tackle()])],
        vec![mon("Foe", 150, 10, vec![pursuit()])],
        Arc::new(script),
        Arc::new(foe_script),
    );
    engine.run_turn().await.unwrap();

    let side = engine.field().unwrap().side(SideId::Player);
    assert_eq!(side.slots[0].occupant, Some(1));
    assert!(side.party[0].current_hp < 150);
    assert_eq!(side.party[1].current_hp, 150);
    assert_eq!(moves_in_order(&logger), ["|move|p2a: Foe|Pursuit|p1a: Lead"]);
}

#[tokio::test]
async fn charging_move_fires_next_turn_without_a_new_intent() {
    let fly = MoveData::new("Fly", Type::Flying, MoveCategory::Physical, 90).with_flags(MoveFlags {
        two_turn: true,
        semi_invulnerable: true,
        ..MoveFlags::default()
    });
    let script = Arc::new(
        ScriptedProvider::new().with_action(BattleAction::use_move(player(0), 0, Some(enemy(0)))),
    );
    let (mut engine, _) = engine(
        BattleRules::singles(),
        vec![mon("Hero", 150, 90, vec![fly])],
        vec![mon("Foe", 150, 10, vec![tackle()])],
        script.clone(),
        Arc::new(PassProvider),
    );

    engine.run_turn().await.unwrap();
    assert_eq!(engine.field().unwrap().occupant(enemy(0)).unwrap().current_hp, 150);
    assert!(engine.field().unwrap().slot(player(0)).unwrap().charging.is_some());

    engine.run_turn().await.unwrap();
    assert!(engine.field().unwrap().occupant(enemy(0)).unwrap().current_hp < 150);
    assert!(engine.field().unwrap().slot(player(0)).unwrap().charging.is_none());
    assert_eq!(script.remaining(player(0)), 0);
}

#[tokio::test]
async fn intents_for_another_slot_are_rejected() {
    let script = ScriptedProvider::new();
    script.push(player(0), BattleAction::use_move(enemy(0), 0, Some(player(0))));
    let (mut engine, _) = engine(
        BattleRules::singles(),
        vec![mon("Hero", 150, 90, vec![tackle()])],
        vec![mon("Foe", 150, 10, vec![tackle()])],
        Arc::new(script),
        Arc::new(PassProvider),
    );
    let report = engine.run_turn().await.unwrap();
    assert_eq!(report, TurnReport { turn: 1, executed: 0 });
    assert_eq!(engine.field().unwrap().occupant(player(0)).unwrap().current_hp, 150);
}

struct BrokenView;

impl BattleView for BrokenView {
    fn notify(&mut self, _event: &BattleEvent) -> anyhow::Result<()> {
        anyhow::bail!("display unplugged")
    }
}

#[tokio::test]
async fn failing_view_does_not_stop_the_battle() {
    let script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(player(0), 0, Some(enemy(0))));
    let mut lead = mon("Foe", 100, 10, vec![tackle()]);
    lead.current_hp = 1;
    let mut engine = CombatEngine::with_seed(5);
    engine
        .initialize(
            BattleRules::singles(),
            vec![mon("Hero", 100, 90, vec![tackle()])],
            vec![lead],
            Arc::new(script),
            Arc::new(PassProvider),
            Box::new(BrokenView),
        )
        .unwrap();
    let report = engine.run_battle().await.unwrap();
    assert_eq!(report.outcome, BattleOutcome::Victory);
}

/// Chips every active creature for a flat amount each turn.
struct Thorns(u16);

impl ResidualEffects for Thorns {
    fn end_of_turn(
        &self,
        _field: &BattleField,
        slot: SlotRef,
        _creature: &Creature,
    ) -> Vec<BattleAction> {
        vec![BattleAction::Damage {
            target: slot,
            amount: self.0,
            source: DamageSource::Item("thorns".to_string()),
        }]
    }
}

#[tokio::test]
async fn injected_residual_hook_runs_at_end_of_turn() {
    let logger = Arc::new(Mutex::new(BattleLogger::new()));
    let mut engine = CombatEngine::with_seed(17).with_residuals(Box::new(Thorns(10)));
    engine
        .initialize(
            BattleRules::singles(),
            vec![mon("Hero", 100, 50, vec![tackle()])],
            vec![mon("Foe", 100, 50, vec![tackle()])],
            Arc::new(PassProvider),
            Arc::new(PassProvider),
            Box::new(logger.clone()),
        )
        .unwrap();
    engine.run_turn().await.unwrap();

    let field = engine.field().unwrap();
    assert_eq!(field.occupant(player(0)).unwrap().current_hp, 90);
    assert_eq!(field.occupant(enemy(0)).unwrap().current_hp, 90);
    let lines = logger.lock().unwrap().log_lines().to_vec();
    assert!(lines.contains(&"|-damage|p1a: Hero|90/100".to_string()));
    assert!(lines.contains(&"|-damage|p2a: Foe|90/100".to_string()));
}

#[tokio::test]
async fn bare_end_of_turn_processor_skips_held_items() {
    let hurt_holder = || {
        let mut hero = mon("Hero", 160, 50, vec![tackle()]).with_item("Leftovers");
        hero.current_hp = 100;
        hero
    };
    let mut healed = Vec::new();
    for engine in [
        CombatEngine::with_seed(3),
        CombatEngine::with_seed(3).with_end_of_turn(EndOfTurnProcessor::new()),
    ] {
        let mut engine = engine;
        engine
            .initialize(
                BattleRules::singles(),
                vec![hurt_holder()],
                vec![mon("Foe", 100, 50, vec![tackle()])],
                Arc::new(PassProvider),
                Arc::new(PassProvider),
                Box::new(NullView),
            )
            .unwrap();
        engine.run_turn().await.unwrap();
        healed.push(engine.field().unwrap().occupant(player(0)).unwrap().current_hp);
    }
    assert_eq!(healed, [110, 100]);
}

/// Every spikes layer costs half the entrant's max HP.
struct SharpSpikes;

static SHARP_SPIKES: HazardData = HazardData {
    kind: HazardKind::Spikes,
    name: "Sharp Spikes",
    max_layers: 3,
    layer_fractions: &[(1, 2)],
    scaling_type: None,
    absorbed_by: None,
    affects_airborne: false,
};

impl HazardLookup for SharpSpikes {
    fn hazard(&self, kind: HazardKind) -> Option<&HazardData> {
        (kind == HazardKind::Spikes).then_some(&SHARP_SPIKES)
    }
}

#[tokio::test]
async fn injected_hazard_lookup_prices_the_refill() {
    let mut lead = mon("Lead", 96, 10, vec![tackle()]);
    lead.current_hp = 1;
    let script = ScriptedProvider::new()
        .with_action(BattleAction::use_move(player(0), 0, Some(enemy(0))));
    let logger = Arc::new(Mutex::new(BattleLogger::new()));
    let mut engine = CombatEngine::with_seed(17).with_hazard_lookup(Box::new(SharpSpikes));
    engine
        .initialize(
            BattleRules::singles(),
            vec![mon("Hero", 200, 90, vec![tackle()])],
            vec![lead, mon("Reserve", 96, 10, vec![tackle()])],
            Arc::new(script),
            Arc::new(PassProvider),
            Box::new(logger.clone()),
        )
        .unwrap();
    engine
        .field_mut()
        .unwrap()
        .side_mut(SideId::Enemy)
        .add_hazard(HazardKind::Spikes, 3);

    engine.run_turn().await.unwrap();

    let reserve = engine.field().unwrap().occupant(enemy(0)).unwrap();
    assert_eq!((reserve.name.as_str(), reserve.current_hp), ("Reserve", 48));
    let lines = logger.lock().unwrap().log_lines().to_vec();
    assert!(lines.contains(&"|-damage|p2a: Reserve|48/96".to_string()));
}

#[test]
fn raid_boss_is_scaled_at_initialize() {
    let boss = BossRules {
        hp_multiplier: 3.0,
        stat_multiplier: 1.0,
    };
    let mut engine = CombatEngine::with_seed(9);
    engine
        .initialize(
            BattleRules::raid(2, boss),
            vec![mon("A", 100, 50, vec![tackle()]), mon("B", 100, 50, vec![tackle()])],
            vec![mon("Boss", 100, 50, vec![tackle()])],
            Arc::new(PassProvider),
            Arc::new(PassProvider),
            Box::new(NullView),
        )
        .unwrap();
    let field = engine.field().unwrap();
    let boss = field.occupant(enemy(0)).unwrap();
    assert_eq!((boss.current_hp, boss.max_hp()), (300, 300));
    assert_eq!(field.active_slots().len(), 3);
}

#[tokio::test]
async fn random_battles_finish() {
    let moves = || vec![tackle(), MoveData::new("Ember", Type::Fire, MoveCategory::Special, 40)];
    let mut engine = CombatEngine::with_seed(23);
    engine
        .initialize(
            BattleRules::doubles(),
            (0..3).map(|i| mon(&format!("P{i}"), 120, 40 + i as u16, moves())).collect(),
            (0..3).map(|i| mon(&format!("E{i}"), 120, 45 + i as u16, moves())).collect(),
            Arc::new(RandomProvider::new(1)),
            Arc::new(RandomProvider::new(2)),
            Box::new(NullView),
        )
        .unwrap();
    let report = engine.run_battle().await.unwrap();
    assert_ne!(report.outcome, BattleOutcome::Ongoing);
    assert!(report.turns > 0);
}
