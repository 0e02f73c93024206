//! Observer side of the engine. Views receive best-effort notifications;
//! a failing view never stops a turn.

use crate::battle::field::SlotRef;
use crate::engine::BattleOutcome;
use crate::model::{Stat, Status};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
pub enum BattleEvent {
    TurnStarted {
        turn: u32,
    },
    MoveUsed {
        user: SlotRef,
        user_name: String,
        move_name: String,
        target: Option<(SlotRef, String)>,
    },
    Damaged {
        target: SlotRef,
        name: String,
        amount: u16,
        hp: u16,
        max_hp: u16,
    },
    Healed {
        target: SlotRef,
        name: String,
        amount: u16,
        hp: u16,
        max_hp: u16,
    },
    StatusApplied {
        target: SlotRef,
        name: String,
        status: Status,
    },
    StatChanged {
        target: SlotRef,
        name: String,
        stat: Stat,
        change: i8,
    },
    SwitchedIn {
        slot: SlotRef,
        name: String,
        hp: u16,
        max_hp: u16,
    },
    Fainted {
        target: SlotRef,
        name: String,
    },
    Message {
        text: String,
    },
    BattleEnded {
        outcome: BattleOutcome,
        turns: u32,
    },
}

pub trait BattleView: Send {
    fn notify(&mut self, event: &BattleEvent) -> anyhow::Result<()>;
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl BattleView for NullView {
    fn notify(&mut self, _event: &BattleEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Shared views let the caller keep a handle after handing one to the engine.
impl<V: BattleView> BattleView for Arc<Mutex<V>> {
    fn notify(&mut self, event: &BattleEvent) -> anyhow::Result<()> {
        let mut view = self
            .lock()
            .map_err(|_| anyhow::anyhow!("battle view lock poisoned"))?;
        view.notify(event)
    }
}

pub fn showdown_ident(slot: SlotRef, name: &str) -> String {
    format!("{}: {name}", slot.label())
}

/// Records Showdown protocol lines.
#[derive(Clone, Debug, Default)]
pub struct BattleLogger {
    formatid: String,
    log: Vec<String>,
}

impl BattleLogger {
    pub fn new() -> Self {
        Self::new_with_format("gen9customgame")
    }

    pub fn new_with_format(formatid: impl Into<String>) -> Self {
        Self {
            formatid: formatid.into(),
            log: Vec::new(),
        }
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "formatid": self.formatid,
            "log": self.log,
        })
    }

    fn push(&mut self, line: String) {
        self.log.push(line);
    }
}

impl BattleView for BattleLogger {
    fn notify(&mut self, event: &BattleEvent) -> anyhow::Result<()> {
        match event {
            BattleEvent::TurnStarted { turn } => self.push(format!("|turn|{turn}")),
            BattleEvent::MoveUsed {
                user,
                user_name,
                move_name,
                target,
            } => {
                let target = target
                    .as_ref()
                    .map(|(slot, name)| showdown_ident(*slot, name))
                    .unwrap_or_default();
                self.push(format!(
                    "|move|{}|{move_name}|{target}",
                    showdown_ident(*user, user_name)
                ));
            }
            BattleEvent::Damaged {
                target,
                name,
                hp,
                max_hp,
                ..
            } => {
                let hp = if *hp == 0 {
                    "0 fnt".to_string()
                } else {
                    format!("{hp}/{max_hp}")
                };
                self.push(format!("|-damage|{}|{hp}", showdown_ident(*target, name)));
            }
            BattleEvent::Healed {
                target,
                name,
                hp,
                max_hp,
                ..
            } => self.push(format!(
                "|-heal|{}|{hp}/{max_hp}",
                showdown_ident(*target, name)
            )),
            BattleEvent::StatusApplied {
                target,
                name,
                status,
            } => self.push(format!(
                "|-status|{}|{}",
                showdown_ident(*target, name),
                status.id()
            )),
            BattleEvent::StatChanged {
                target,
                name,
                stat,
                change,
            } => {
                let tag = if *change >= 0 { "-boost" } else { "-unboost" };
                self.push(format!(
                    "|{tag}|{}|{stat}|{}",
                    showdown_ident(*target, name),
                    change.unsigned_abs()
                ));
            }
            BattleEvent::SwitchedIn {
                slot,
                name,
                hp,
                max_hp,
            } => self.push(format!(
                "|switch|{}|{name}|{hp}/{max_hp}",
                showdown_ident(*slot, name)
            )),
            BattleEvent::Fainted { target, name } => {
                self.push(format!("|faint|{}", showdown_ident(*target, name)))
            }
            BattleEvent::Message { text } => self.push(format!("|-message|{text}")),
            BattleEvent::BattleEnded { outcome, .. } => match outcome {
                BattleOutcome::Victory => self.push("|win|player".to_string()),
                BattleOutcome::Defeat => self.push("|win|enemy".to_string()),
                BattleOutcome::Draw => self.push("|tie|".to_string()),
                BattleOutcome::Ongoing => {}
            },
        }
        Ok(())
    }
}
