pub mod battle;
pub mod content;
pub mod engine;
pub mod error;
pub mod model;
pub mod provider;
pub mod simulate;
pub mod types;
pub mod view;

use crate::simulate::{compute_matrix, load_teams, write_csv};
use std::path::PathBuf;
use tracing::info;

pub mod prelude {
    pub use crate::battle::{
        BattleAction, BattleField, BattleFormat, BattleRules, BossRules, DamageOptions,
        DamageSource, HealSource, SideId, SlotRef,
    };
    pub use crate::content::{HazardKind, HazardLookup, StaticContent, TerrainKind, WeatherKind};
    pub use crate::engine::{BattleOutcome, BattleReport, CombatEngine, TurnReport};
    pub use crate::error::{BattleError, Result};
    pub use crate::model::{Creature, MoveCategory, MoveData, MoveTarget, Stat, Stats, Status};
    pub use crate::provider::{ActionProvider, PassProvider, RandomProvider, ScriptedProvider};
    pub use crate::types::Type;
    pub use crate::view::{BattleEvent, BattleLogger, BattleView, NullView};
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub teams_path: PathBuf,
    pub sims_per_cell: usize,
    pub seed: u64,
    pub output_path: PathBuf,
    pub party_size: usize,
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.sims_per_cell == 0 {
        anyhow::bail!("--sims must be > 0");
    }
    if opts.party_size == 0 {
        anyhow::bail!("--party-size must be > 0");
    }
    let teams = load_teams(&opts.teams_path)?;
    info!(
        team_a = teams.team_a.len(),
        team_b = teams.team_b.len(),
        party_size = opts.party_size,
        sims = opts.sims_per_cell,
        "computing matrix"
    );
    let matrix = compute_matrix(&teams, opts.party_size, opts.sims_per_cell, opts.seed)?;
    write_csv(&matrix, &opts.output_path)?;
    println!(
        "Wrote {}x{} matrix to {}",
        matrix.len(),
        matrix.first().map(|r| r.len()).unwrap_or(0),
        opts.output_path.display()
    );
    Ok(())
}
