use crate::battle::action::BattleAction;
use crate::battle::execute::{execute_action, ActionContext};
use crate::battle::field::BattleField;
use std::collections::VecDeque;

/// Turn queue. Collected actions go to the back, reactions to the front.
#[derive(Clone, Debug, Default)]
pub struct BattleQueue {
    actions: VecDeque<BattleAction>,
}

impl BattleQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: BattleAction) {
        self.actions.push_back(action);
    }

    pub fn enqueue_all(&mut self, actions: impl IntoIterator<Item = BattleAction>) {
        self.actions.extend(actions);
    }

    /// Inserts `reactions` ahead of everything queued, keeping their order.
    pub fn push_reactions(&mut self, reactions: Vec<BattleAction>) {
        for reaction in reactions.into_iter().rev() {
            self.actions.push_front(reaction);
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn peek(&self) -> Option<&BattleAction> {
        self.actions.front()
    }

    /// Drains the queue and returns how many actions were executed.
    pub fn process_queue(&mut self, field: &mut BattleField, ctx: &mut ActionContext<'_>) -> usize {
        let mut executed = 0;
        while let Some(action) = self.actions.pop_front() {
            let reactions = execute_action(field, action, ctx);
            executed += 1;
            self.push_reactions(reactions);
        }
        executed
    }
}
