//! Action providers: whoever decides what a slot does this turn.

use crate::battle::action::BattleAction;
use crate::battle::field::{BattleField, SlotRef};
use crate::battle::targeting::get_valid_targets;
use crate::model::MoveTarget;
use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Returns an intent for one slot. Providers only read the field.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// `None` passes the turn.
    async fn get_action(&self, field: &BattleField, slot: SlotRef) -> Option<BattleAction>;

    /// Party index to send into an empty or fainted slot.
    async fn choose_replacement(&self, field: &BattleField, slot: SlotRef) -> Option<usize> {
        field.side(slot.side).bench().first().copied()
    }
}

/// Always passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassProvider;

#[async_trait]
impl ActionProvider for PassProvider {
    async fn get_action(&self, _field: &BattleField, _slot: SlotRef) -> Option<BattleAction> {
        None
    }
}

/// Replays queued intents per slot, first in first out.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<HashMap<SlotRef, VecDeque<BattleAction>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, slot: SlotRef, action: BattleAction) {
        if let Ok(mut script) = self.script.lock() {
            script.entry(slot).or_default().push_back(action);
        }
    }

    /// Queues an intent for the slot it acts from.
    pub fn with_action(self, action: BattleAction) -> Self {
        if let Some(slot) = action.actor() {
            self.push(slot, action);
        }
        self
    }

    pub fn remaining(&self, slot: SlotRef) -> usize {
        self.script
            .lock()
            .map(|script| script.get(&slot).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl ActionProvider for ScriptedProvider {
    async fn get_action(&self, _field: &BattleField, slot: SlotRef) -> Option<BattleAction> {
        self.script.lock().ok()?.get_mut(&slot)?.pop_front()
    }
}

/// Picks a random move and its first legal target.
pub struct RandomProvider {
    rng: Mutex<SmallRng>,
}

impl RandomProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl ActionProvider for RandomProvider {
    async fn get_action(&self, field: &BattleField, slot: SlotRef) -> Option<BattleAction> {
        let creature = field.occupant(slot)?;
        let indices: Vec<usize> = (0..creature.moves.len()).collect();
        let move_index = {
            let mut rng = self.rng.lock().ok()?;
            *indices.choose(&mut *rng)?
        };
        let move_data = &creature.moves[move_index];
        let target = match move_data.target {
            MoveTarget::SingleEnemy => get_valid_targets(slot, move_data, field).first().copied(),
            _ => None,
        };
        Some(BattleAction::use_move(slot, move_index, target))
    }
}
