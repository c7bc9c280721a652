use chrono::{DateTime, Utc};
use serde::Serialize;

/// Exported training result: the Pareto front of the final generation.
///
/// Write-only from the trainer's point of view; consumers deserialize it with
/// whatever tooling plays the genomes back.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChampionModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Generations actually completed (may be fewer than requested when the
    /// run was interrupted).
    pub generations: u32,
    pub champions: Vec<ChampionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChampionEntry {
    pub self_damage: f32,
    pub damage_dealt: f32,
    pub genome: Vec<f32>,
}
