pub mod action;
pub mod damage;
pub mod end_of_turn;
pub mod execute;
pub mod field;
pub mod hazards;
pub mod order;
pub mod queue;
pub mod residuals;
pub mod rules;
pub mod side;
pub mod slot;
pub mod stages;
pub mod targeting;

pub use action::{BattleAction, DamageSource, HealSource};
pub use damage::{calculate, DamageContext, DamageOptions};
pub use end_of_turn::EndOfTurnProcessor;
pub use field::{BattleField, SideId, SlotRef, TerrainState, WeatherState};
pub use hazards::{process_hazards, HazardSweep};
pub use order::{compute_turn_order, effective_speed};
pub use queue::BattleQueue;
pub use residuals::{HeldItemResiduals, ResidualEffects};
pub use rules::{BattleFormat, BattleRules, BossRules};
pub use side::BattleSide;
pub use slot::{BattleSlot, ProviderId, VolatileFlags};
pub use stages::StatStages;
pub use targeting::get_valid_targets;
