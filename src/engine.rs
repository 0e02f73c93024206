//! Turn orchestration: collect, order, drain, end-of-turn, durations,
//! replacements.

use crate::battle::action::BattleAction;
use crate::battle::end_of_turn::EndOfTurnProcessor;
use crate::battle::execute::ActionContext;
use crate::battle::field::{BattleField, SideId, SlotRef};
use crate::battle::order::compute_turn_order;
use crate::battle::queue::BattleQueue;
use crate::battle::residuals::ResidualEffects;
use crate::battle::rules::BattleRules;
use crate::battle::slot::ProviderId;
use crate::content::{HazardLookup, StaticContent};
use crate::error::{BattleError, Result};
use crate::model::{Creature, Status};
use crate::provider::ActionProvider;
use crate::view::{BattleEvent, BattleView};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleOutcome {
    /// The enemy side ran out of creatures.
    Victory,
    Defeat,
    Draw,
    /// Turn limit reached with both sides standing.
    Ongoing,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub turns: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: u32,
    /// Actions drained this turn, reactions included.
    pub executed: usize,
}

struct BattleState {
    field: BattleField,
    providers: Vec<Arc<dyn ActionProvider>>,
    view: Box<dyn BattleView>,
}

pub struct CombatEngine {
    rng: SmallRng,
    hazards: Box<dyn HazardLookup>,
    end_of_turn: EndOfTurnProcessor,
    state: Option<BattleState>,
}

impl CombatEngine {
    pub fn new(rng: SmallRng) -> Self {
        Self {
            rng,
            hazards: Box::new(StaticContent),
            end_of_turn: EndOfTurnProcessor::default(),
            state: None,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    pub fn with_hazard_lookup(mut self, hazards: Box<dyn HazardLookup>) -> Self {
        self.hazards = hazards;
        self
    }

    /// Replaces the built-in end-of-turn hooks.
    pub fn with_end_of_turn(mut self, end_of_turn: EndOfTurnProcessor) -> Self {
        self.end_of_turn = end_of_turn;
        self
    }

    pub fn with_residuals(mut self, hook: Box<dyn ResidualEffects>) -> Self {
        self.end_of_turn = std::mem::take(&mut self.end_of_turn).with_hook(hook);
        self
    }

    pub fn initialize(
        &mut self,
        rules: BattleRules,
        player_party: Vec<Creature>,
        enemy_party: Vec<Creature>,
        player_provider: Arc<dyn ActionProvider>,
        enemy_provider: Arc<dyn ActionProvider>,
        view: Box<dyn BattleView>,
    ) -> Result<()> {
        let mut field = BattleField::new(rules, player_party, enemy_party)?;
        let providers = vec![player_provider, enemy_provider];
        for side in SideId::BOTH {
            let battle_side = field.side_mut(side);
            for index in 0..battle_side.slots.len() {
                let badly_poisoned = battle_side
                    .occupant(index)
                    .is_some_and(|creature| creature.status == Some(Status::BadlyPoisoned));
                let slot = &mut battle_side.slots[index];
                slot.provider = Some(ProviderId(side.index()));
                if badly_poisoned {
                    slot.status_turns = 1;
                }
            }
        }
        info!(
            format = ?rules.format,
            player_slots = rules.player_slots,
            enemy_slots = rules.enemy_slots,
            "battle initialized"
        );
        self.state = Some(BattleState {
            field,
            providers,
            view,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn field(&self) -> Option<&BattleField> {
        self.state.as_ref().map(|state| &state.field)
    }

    /// Direct access for scenario setup and tooling.
    pub fn field_mut(&mut self) -> Option<&mut BattleField> {
        self.state.as_mut().map(|state| &mut state.field)
    }

    pub async fn run_turn(&mut self) -> Result<TurnReport> {
        let state = self.state.as_mut().ok_or(BattleError::NotInitialized)?;
        state.field.turn += 1;
        let turn = state.field.turn;
        info!(turn, "turn started");
        notify(state.view.as_mut(), BattleEvent::TurnStarted { turn });

        for slot in state.field.slot_refs() {
            if let Some(slot) = state.field.slot_mut(slot) {
                slot.begin_turn();
            }
        }

        let intents = collect_intents(&state.field, &state.providers).await;
        let ordered = compute_turn_order(&state.field, intents);

        let mut queue = BattleQueue::new();
        queue.enqueue_all(ordered);
        let mut ctx = ActionContext {
            rng: &mut self.rng,
            hazards: self.hazards.as_ref(),
            view: state.view.as_mut(),
        };
        let mut executed = queue.process_queue(&mut state.field, &mut ctx);

        queue.enqueue_all(self.end_of_turn.process_effects(&state.field));
        executed += queue.process_queue(&mut state.field, &mut ctx);

        for text in tick_durations(&mut state.field) {
            ctx.notify(BattleEvent::Message { text });
        }

        for slot in state.field.slot_refs() {
            if state.field.is_active(slot) || state.field.side(slot.side).bench().is_empty() {
                continue;
            }
            let provider = provider_for(&state.field, &state.providers, slot);
            let bench = state.field.side(slot.side).bench();
            let choice = match provider {
                Some(provider) => provider.choose_replacement(&state.field, slot).await,
                None => None,
            };
            let party_index = match choice {
                Some(index) if bench.contains(&index) => index,
                Some(index) => {
                    warn!(%slot, index, "replacement not on the bench; sending the first");
                    bench[0]
                }
                None => bench[0],
            };
            let mut ctx = ActionContext {
                rng: &mut self.rng,
                hazards: self.hazards.as_ref(),
                view: state.view.as_mut(),
            };
            queue.enqueue(BattleAction::switch(slot, party_index));
            executed += queue.process_queue(&mut state.field, &mut ctx);
        }

        debug!(turn, executed, "turn finished");
        Ok(TurnReport { turn, executed })
    }

    pub async fn run_battle(&mut self) -> Result<BattleReport> {
        let state = self.state.as_ref().ok_or(BattleError::NotInitialized)?;
        let turn_limit = state.field.rules.turn_limit;
        if let Some(outcome) = terminal_outcome(&state.field) {
            if outcome == BattleOutcome::Draw {
                return Ok(self.finish(outcome));
            }
        }
        loop {
            let turn = self.field().map(|field| field.turn).unwrap_or(0);
            if turn >= turn_limit {
                return Ok(self.finish(BattleOutcome::Ongoing));
            }
            self.run_turn().await?;
            if let Some(outcome) = self.field().and_then(terminal_outcome) {
                return Ok(self.finish(outcome));
            }
        }
    }

    fn finish(&mut self, outcome: BattleOutcome) -> BattleReport {
        let Some(state) = self.state.as_mut() else {
            return BattleReport { outcome, turns: 0 };
        };
        let turns = state.field.turn;
        info!(?outcome, turns, "battle finished");
        notify(state.view.as_mut(), BattleEvent::BattleEnded { outcome, turns });
        BattleReport { outcome, turns }
    }
}

fn notify(view: &mut dyn BattleView, event: BattleEvent) {
    if let Err(err) = view.notify(&event) {
        warn!(error = %err, "battle view failed; continuing");
    }
}

fn provider_for(
    field: &BattleField,
    providers: &[Arc<dyn ActionProvider>],
    slot: SlotRef,
) -> Option<Arc<dyn ActionProvider>> {
    let id = field.slot(slot)?.provider?;
    providers.get(id.0).cloned()
}

/// One intent per active slot, in slot order. Charging slots replay their
/// move without asking the provider.
async fn collect_intents(
    field: &BattleField,
    providers: &[Arc<dyn ActionProvider>],
) -> Vec<BattleAction> {
    let mut intents = Vec::new();
    for slot in field.active_slots() {
        if let Some(charging) = field.slot(slot).and_then(|state| state.charging) {
            intents.push(BattleAction::use_move(slot, charging.move_index, charging.target));
            continue;
        }
        let Some(provider) = provider_for(field, providers, slot) else {
            continue;
        };
        match provider.get_action(field, slot).await {
            Some(action) if accepts_intent(&action, slot) => intents.push(action),
            Some(action) => {
                warn!(%slot, kind = action.kind(), "rejected intent; treating as a pass")
            }
            None => debug!(%slot, "pass"),
        }
    }
    intents
}

fn accepts_intent(action: &BattleAction, slot: SlotRef) -> bool {
    match action {
        BattleAction::UseMove { user, .. } => *user == slot,
        BattleAction::Switch { slot: target, .. } => *target == slot,
        _ => false,
    }
}

/// Decrements side conditions, weather and terrain; returns expiry messages.
fn tick_durations(field: &mut BattleField) -> Vec<String> {
    let mut messages = Vec::new();
    for side in SideId::BOTH {
        for condition in field.side_mut(side).tick_conditions() {
            messages.push(format!("The {side} side's {condition:?} wore off."));
        }
    }
    if let Some(ended) = field.weather.tick() {
        messages.push(format!("The {} subsided.", ended.id()));
    }
    if let Some(ended) = field.terrain.tick() {
        messages.push(format!("The {} faded.", ended.id()));
    }
    messages
}

fn terminal_outcome(field: &BattleField) -> Option<BattleOutcome> {
    let player = field.side(SideId::Player).has_available();
    let enemy = field.side(SideId::Enemy).has_available();
    match (player, enemy) {
        (false, false) => Some(BattleOutcome::Draw),
        (true, false) => Some(BattleOutcome::Victory),
        (false, true) => Some(BattleOutcome::Defeat),
        (true, true) => None,
    }
}
