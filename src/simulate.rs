//! Win-rate matrix harness: every party selection of team A against every
//! selection of team B, many seeded battles per cell.

use crate::battle::rules::BattleRules;
use crate::engine::{BattleOutcome, BattleReport, CombatEngine};
use crate::error::{BattleError, Result};
use crate::model::{Creature, TeamsFile};
use crate::provider::RandomProvider;
use crate::view::NullView;
use anyhow::Context;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::debug;

fn battle_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|err| BattleError::Runtime(err.to_string()))
}

/// Runs one battle to completion with random play on both sides.
pub fn simulate_battle(
    team_a: &[Creature],
    team_b: &[Creature],
    rules: BattleRules,
    seed: u64,
) -> Result<BattleReport> {
    simulate_battle_on(&battle_runtime()?, team_a, team_b, rules, seed)
}

fn simulate_battle_on(
    runtime: &Runtime,
    team_a: &[Creature],
    team_b: &[Creature],
    rules: BattleRules,
    seed: u64,
) -> Result<BattleReport> {
    let player: Vec<Creature> = team_a.iter().cloned().map(Creature::restored).collect();
    let enemy: Vec<Creature> = team_b.iter().cloned().map(Creature::restored).collect();

    let mut engine = CombatEngine::with_seed(seed);
    engine.initialize(
        rules,
        player,
        enemy,
        Arc::new(RandomProvider::new(seed.wrapping_add(1))),
        Arc::new(RandomProvider::new(seed.wrapping_add(2))),
        Box::new(NullView),
    )?;
    runtime.block_on(engine.run_battle())
}

/// Every ascending `size`-combination of `0..len`.
pub fn choose_indices(len: usize, size: usize) -> Vec<Vec<usize>> {
    fn extend(
        start: usize,
        len: usize,
        size: usize,
        current: &mut Vec<usize>,
        out: &mut Vec<Vec<usize>>,
    ) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for next in start..len {
            current.push(next);
            extend(next + 1, len, size, current, out);
            current.pop();
        }
    }
    let mut combos = Vec::new();
    if size == 0 || size > len {
        return combos;
    }
    extend(0, len, size, &mut Vec::with_capacity(size), &mut combos);
    combos
}

fn selection_from_indices(team: &[Creature], indices: &[usize]) -> Vec<Creature> {
    indices.iter().map(|&idx| team[idx].clone()).collect()
}

struct CellResult {
    a_idx: usize,
    b_idx: usize,
    win_rate: f64,
}

/// Row per team-A selection, column per team-B selection. A draw or an
/// unfinished battle counts half a win.
pub fn compute_matrix(
    teams: &TeamsFile,
    party_size: usize,
    sims_per_cell: usize,
    seed: u64,
) -> Result<Vec<Vec<f64>>> {
    let rules = teams.rules.unwrap_or_default();
    rules.validate()?;
    let selections_a: Vec<Vec<Creature>> = choose_indices(teams.team_a.len(), party_size)
        .iter()
        .map(|idx| selection_from_indices(&teams.team_a, idx))
        .collect();
    let selections_b: Vec<Vec<Creature>> = choose_indices(teams.team_b.len(), party_size)
        .iter()
        .map(|idx| selection_from_indices(&teams.team_b, idx))
        .collect();
    let tasks: Vec<(usize, usize)> = (0..selections_a.len())
        .flat_map(|a| (0..selections_b.len()).map(move |b| (a, b)))
        .collect();

    let cell_results: Vec<CellResult> = tasks
        .par_iter()
        .map(|&(a_idx, b_idx)| -> Result<CellResult> {
            let runtime = battle_runtime()?;
            let mut cell_rng =
                SmallRng::seed_from_u64(seed ^ ((a_idx as u64) << 32) ^ (b_idx as u64));
            let a_sel = &selections_a[a_idx];
            let b_sel = &selections_b[b_idx];
            let mut a_wins = 0u64;
            let mut ties = 0u64;
            for _ in 0..sims_per_cell {
                let battle_seed = cell_rng.gen();
                match simulate_battle_on(&runtime, a_sel, b_sel, rules, battle_seed)?.outcome {
                    BattleOutcome::Victory => a_wins += 1,
                    BattleOutcome::Defeat => {}
                    BattleOutcome::Draw | BattleOutcome::Ongoing => ties += 1,
                }
            }
            let total = sims_per_cell.max(1) as f64;
            let win_rate = (a_wins as f64 + 0.5 * ties as f64) / total;
            debug!(a_idx, b_idx, win_rate, "cell finished");
            Ok(CellResult {
                a_idx,
                b_idx,
                win_rate,
            })
        })
        .collect::<Result<_>>()?;

    let mut matrix = vec![vec![0.0; selections_b.len()]; selections_a.len()];
    for cell in cell_results {
        matrix[cell.a_idx][cell.b_idx] = cell.win_rate;
    }
    Ok(matrix)
}

pub fn write_csv(matrix: &[Vec<f64>], path: &Path) -> anyhow::Result<()> {
    let mut out = String::new();
    for (row_idx, row) in matrix.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            if col_idx > 0 {
                out.push(',');
            }
            out.push_str(&format!("{value:.4}"));
        }
        if row_idx + 1 < matrix.len() {
            out.push('\n');
        }
    }
    std::fs::write(path, out)
        .with_context(|| format!("Failed to write matrix to {}", path.display()))?;
    Ok(())
}

pub fn load_teams(path: &Path) -> anyhow::Result<TeamsFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read teams file at {}", path.display()))?;
    let parsed: TeamsFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_team_sizes(&parsed)?;
    Ok(parsed)
}

pub fn validate_team_sizes(teams: &TeamsFile) -> anyhow::Result<()> {
    if teams.team_a.is_empty() || teams.team_b.is_empty() {
        anyhow::bail!("Both teams need at least one creature");
    }
    Ok(())
}
