//! Non-dominated sorting, crowding distance, and crowded-tournament
//! selection (NSGA-II).

use rand::Rng;

use crate::genome::Genome;

/// Number of objectives every fitness carries.
pub const OBJECTIVE_COUNT: usize = 2;

/// Episode outcome for one genome.
///
/// Objective directions are fixed: `self_damage` is minimized, `damage_dealt`
/// is maximized. Fitness values are compared only through [`dominates`] and
/// the crowded-comparison operator, never by raw tuple order.
///
/// [`dominates`]: Fitness::dominates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fitness {
    pub self_damage: f32,
    pub damage_dealt: f32,
}

impl Fitness {
    /// Pareto dominance under the objective directions: `self` dominates
    /// `other` iff it is no worse in both objectives and strictly better in
    /// at least one.
    #[must_use]
    pub fn dominates(&self, other: &Fitness) -> bool {
        let no_worse =
            self.self_damage <= other.self_damage && self.damage_dealt >= other.damage_dealt;
        let strictly_better =
            self.self_damage < other.self_damage || self.damage_dealt > other.damage_dealt;
        no_worse && strictly_better
    }

    /// Raw value of one objective; used for crowding-distance sorting where
    /// direction does not matter.
    #[must_use]
    pub fn objective(&self, index: usize) -> f32 {
        match index {
            0 => self.self_damage,
            1 => self.damage_dealt,
            _ => panic!("objective index out of range: {index}"),
        }
    }
}

/// One candidate solution: a genome plus its derived selection state.
///
/// `rank` and `crowding` are recomputed from scratch by every survivor
/// selection and are never persisted across generations. The fitness is
/// `None` until an episode has scored the genome; variation always produces
/// individuals without a fitness.
#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    fitness: Option<Fitness>,
    rank: usize,
    crowding: f32,
}

impl Individual {
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            fitness: None,
            rank: 0,
            crowding: 0.0,
        }
    }

    #[must_use]
    pub fn genome(&self) -> &[f32] {
        &self.genome
    }

    #[must_use]
    pub fn fitness(&self) -> Option<Fitness> {
        self.fitness
    }

    /// True once an episode has scored this genome and the genome has not
    /// been varied since.
    #[must_use]
    pub fn is_scored(&self) -> bool {
        self.fitness.is_some()
    }

    pub fn set_fitness(&mut self, fitness: Fitness) {
        self.fitness = Some(fitness);
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[must_use]
    pub fn crowding(&self) -> f32 {
        self.crowding
    }
}

/// Partitions scored individuals into non-domination fronts.
///
/// Front 0 is the non-dominated set; front `k` is non-dominated once fronts
/// `< k` are removed. Returns index lists into `individuals`, each front in
/// original-index order.
///
/// # Panics
///
/// Panics if any individual is unscored.
#[must_use]
pub fn fast_non_dominated_sort(individuals: &[Individual]) -> Vec<Vec<usize>> {
    let fitnesses: Vec<Fitness> = individuals
        .iter()
        .map(|ind| ind.fitness().expect("unscored individual in selection"))
        .collect();
    let n = fitnesses.len();

    let mut dominated_by = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut current_front = Vec::new();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if fitnesses[i].dominates(&fitnesses[j]) {
                dominated_by[i].push(j);
            } else if fitnesses[j].dominates(&fitnesses[i]) {
                domination_count[i] += 1;
            }
        }
        if domination_count[i] == 0 {
            current_front.push(i);
        }
    }

    let mut fronts = Vec::new();
    while !current_front.is_empty() {
        let mut next_front = Vec::new();
        for &i in &current_front {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next_front.push(j);
                }
            }
        }
        next_front.sort_unstable();
        fronts.push(std::mem::replace(&mut current_front, next_front));
    }
    fronts
}

/// Assigns crowding distances to the members of one front.
///
/// For each objective the front is sorted by that objective's value; the
/// boundary individuals get infinite distance and interior individuals
/// accumulate the range-normalized gap between their neighbors, summed over
/// both objectives.
pub fn assign_crowding_distance(individuals: &mut [Individual], front: &[usize]) {
    for &i in front {
        individuals[i].crowding = 0.0;
    }
    if front.len() <= 2 {
        for &i in front {
            individuals[i].crowding = f32::INFINITY;
        }
        return;
    }

    for objective in 0..OBJECTIVE_COUNT {
        let mut sorted = front.to_vec();
        sorted.sort_by(|&a, &b| {
            objective_value(individuals, a, objective)
                .total_cmp(&objective_value(individuals, b, objective))
        });
        let values: Vec<f32> = sorted
            .iter()
            .map(|&i| objective_value(individuals, i, objective))
            .collect();

        individuals[sorted[0]].crowding = f32::INFINITY;
        individuals[sorted[sorted.len() - 1]].crowding = f32::INFINITY;

        let range = values[values.len() - 1] - values[0];
        if range <= 0.0 {
            continue;
        }
        for k in 1..sorted.len() - 1 {
            individuals[sorted[k]].crowding += (values[k + 1] - values[k - 1]) / range;
        }
    }
}

fn objective_value(individuals: &[Individual], i: usize, objective: usize) -> f32 {
    individuals[i]
        .fitness()
        .expect("unscored individual in crowding assignment")
        .objective(objective)
}

/// Crowded-comparison operator: prefer the strictly lower front, then the
/// strictly larger crowding distance.
#[must_use]
pub fn crowded_better(a: &Individual, b: &Individual) -> bool {
    a.rank < b.rank || (a.rank == b.rank && a.crowding > b.crowding)
}

/// NSGA-II survivor selection.
///
/// Recomputes ranks and crowding distances over the whole pool, then fills
/// the next population front by front. A front that would overflow the
/// remaining capacity is truncated to its highest-crowding members, ties
/// broken by original index so selection is deterministic.
///
/// # Panics
///
/// Panics if the pool is smaller than `mu` or contains unscored individuals.
#[must_use]
pub fn select_nsga2(mut pool: Vec<Individual>, mu: usize) -> Vec<Individual> {
    assert!(pool.len() >= mu, "pool smaller than target population");

    let fronts = fast_non_dominated_sort(&pool);
    for (rank, front) in fronts.iter().enumerate() {
        for &i in front {
            pool[i].rank = rank;
        }
        assign_crowding_distance(&mut pool, front);
    }

    let mut chosen = Vec::with_capacity(mu);
    for front in &fronts {
        let remaining = mu - chosen.len();
        if front.len() <= remaining {
            chosen.extend(front.iter().copied());
        } else {
            let mut truncated = front.clone();
            truncated.sort_by(|&a, &b| {
                pool[b].crowding.total_cmp(&pool[a].crowding).then(a.cmp(&b))
            });
            chosen.extend(truncated.into_iter().take(remaining));
        }
        if chosen.len() == mu {
            break;
        }
    }

    chosen.into_iter().map(|i| pool[i].clone()).collect()
}

/// Binary tournament with the crowded-comparison operator.
///
/// Draws two individuals uniformly and returns the crowded-better one; exact
/// ties go to the first draw.
pub fn tournament_dcd<'a, R>(pool: &'a [Individual], rng: &mut R) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(!pool.is_empty());
    let a = &pool[rng.random_range(0..pool.len())];
    let b = &pool[rng.random_range(0..pool.len())];
    if crowded_better(b, a) { b } else { a }
}
