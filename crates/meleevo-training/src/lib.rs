//! Multi-objective genetic engine for evolving agent genomes.
//!
//! The engine is pure: it operates on a population of genomes and fitness
//! pairs, never on the game or the live process. Fitness assignment is the
//! caller's job; the engine consumes completed `(genome, fitness)` pairs.
//!
//! # Algorithm
//!
//! One generation performs:
//!
//! 1. **Parent selection** — binary tournament with the crowded-comparison
//!    operator (lower front wins, then larger crowding distance).
//! 2. **Crossover** — simulated binary crossover bounded to `[0, 1]`,
//!    applied per pair with a configurable probability; otherwise offspring
//!    are clones.
//! 3. **Mutation** — bounded polynomial mutation, each gene with probability
//!    `1 / genome_len`, applied to every offspring.
//! 4. **Survivor selection** — non-dominated sort of parents plus offspring,
//!    fronts taken in order, the overflowing front truncated by descending
//!    crowding distance, down to exactly the steady-state population size.
//!
//! Offspring produced by variation always carry no fitness and must be
//! re-evaluated before they can take part in the next selection.
//!
//! # Objectives
//!
//! [`Fitness`] is exactly two objectives with fixed directions: damage taken
//! by the agent (minimized) and damage dealt to the opponent (maximized).
//! Fitness pairs are only ever compared through Pareto dominance plus
//! crowding distance, never by raw tuple order.

pub use self::{
    evolver::Evolver,
    genome::{GENE_HIGH, GENE_LOW, Genome, mutate_polynomial, random_genome, sbx_bounded},
    nsga2::{
        Fitness, Individual, assign_crowding_distance, crowded_better, fast_non_dominated_sort,
        select_nsga2, tournament_dcd,
    },
    summary::ObjectiveSummary,
};

pub mod evolver;
pub mod genome;
pub mod nsga2;
pub mod summary;
