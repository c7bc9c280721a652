use rand::Rng;

use crate::{
    genome::{mutate_polynomial, sbx_bounded},
    nsga2::{Individual, tournament_dcd},
};

/// Variation pipeline producing the offspring of one generation.
///
/// Parents are drawn by crowded binary tournament, crossed over pairwise
/// with probability `crossover_prob` (clones otherwise), and every offspring
/// is mutated. Parents are never modified; offspring are new genome values
/// with no fitness, so they must be evaluated before the next selection.
#[derive(Debug, Clone, Copy)]
pub struct Evolver {
    /// Probability that a parent pair is crossed over at all.
    pub crossover_prob: f32,
    /// Spread exponent of the simulated binary crossover.
    pub crossover_eta: f32,
    /// Spread exponent of the polynomial mutation.
    pub mutation_eta: f32,
    /// Per-gene mutation probability (typically `1 / genome_len`).
    pub mutation_gene_prob: f32,
}

impl Evolver {
    /// Produces `count` offspring from the current population.
    ///
    /// The population must have gone through survivor selection so ranks and
    /// crowding distances are current.
    #[must_use]
    pub fn vary<R>(&self, population: &[Individual], count: usize, rng: &mut R) -> Vec<Individual>
    where
        R: Rng + ?Sized,
    {
        let mut offspring = Vec::with_capacity(count);
        while offspring.len() < count {
            let parent1 = tournament_dcd(population, rng);
            let parent2 = tournament_dcd(population, rng);

            let (mut genome1, mut genome2) = if rng.random::<f32>() <= self.crossover_prob {
                sbx_bounded(parent1.genome(), parent2.genome(), self.crossover_eta, rng)
            } else {
                (parent1.genome().to_vec(), parent2.genome().to_vec())
            };
            mutate_polynomial(&mut genome1, self.mutation_eta, self.mutation_gene_prob, rng);
            mutate_polynomial(&mut genome2, self.mutation_eta, self.mutation_gene_prob, rng);

            offspring.push(Individual::new(genome1));
            if offspring.len() < count {
                offspring.push(Individual::new(genome2));
            }
        }
        offspring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{genome::random_genome, nsga2::Fitness, nsga2::select_nsga2};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    fn evolver() -> Evolver {
        Evolver {
            crossover_prob: 0.9,
            crossover_eta: 20.0,
            mutation_eta: 20.0,
            mutation_gene_prob: 1.0 / 30.0,
        }
    }

    fn ranked_population(rng: &mut Pcg32, size: usize) -> Vec<Individual> {
        let population: Vec<Individual> = (0..size)
            .map(|i| {
                let mut ind = Individual::new(random_genome(rng, 30));
                #[expect(clippy::cast_precision_loss)]
                ind.set_fitness(Fitness {
                    self_damage: i as f32,
                    damage_dealt: i as f32,
                });
                ind
            })
            .collect();
        select_nsga2(population, size)
    }

    #[test]
    fn offspring_count_matches_request_even_when_odd() {
        let mut rng = Pcg32::seed_from_u64(21);
        let population = ranked_population(&mut rng, 6);
        assert_eq!(evolver().vary(&population, 6, &mut rng).len(), 6);
        assert_eq!(evolver().vary(&population, 5, &mut rng).len(), 5);
    }

    #[test]
    fn offspring_are_unscored() {
        let mut rng = Pcg32::seed_from_u64(22);
        let population = ranked_population(&mut rng, 4);
        let offspring = evolver().vary(&population, 4, &mut rng);
        assert!(offspring.iter().all(|ind| !ind.is_scored()));
    }

    #[test]
    fn offspring_genes_stay_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(23);
        let population = ranked_population(&mut rng, 8);
        for ind in evolver().vary(&population, 32, &mut rng) {
            assert!(ind.genome().iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn parents_are_left_untouched_by_variation() {
        let mut rng = Pcg32::seed_from_u64(24);
        let population = ranked_population(&mut rng, 4);
        let genomes_before: Vec<Vec<f32>> =
            population.iter().map(|ind| ind.genome().to_vec()).collect();
        let _ = evolver().vary(&population, 8, &mut rng);
        for (ind, before) in population.iter().zip(&genomes_before) {
            assert_eq!(ind.genome(), before.as_slice());
        }
    }

    #[test]
    fn guaranteed_crossover_blends_distinct_parents() {
        // Two length-4 parents, eta = 20, crossover probability 1: offspring
        // stay in bounds and at least one gene differs from both parents.
        let mut rng = Pcg32::seed_from_u64(25);
        let mut parent1 = Individual::new(vec![0.1, 0.2, 0.3, 0.4]);
        parent1.set_fitness(Fitness {
            self_damage: 1.0,
            damage_dealt: 2.0,
        });
        let mut parent2 = Individual::new(vec![0.9, 0.8, 0.7, 0.6]);
        parent2.set_fitness(Fitness {
            self_damage: 2.0,
            damage_dealt: 3.0,
        });
        let population = select_nsga2(vec![parent1, parent2], 2);
        let always_cross = Evolver {
            crossover_prob: 1.0,
            crossover_eta: 20.0,
            mutation_eta: 20.0,
            mutation_gene_prob: 0.0,
        };
        let mut differed = false;
        for _ in 0..50 {
            for child in always_cross.vary(&population, 2, &mut rng) {
                assert!(child.genome().iter().all(|g| (0.0..=1.0).contains(g)));
                let p1 = population[0].genome();
                let p2 = population[1].genome();
                if child
                    .genome()
                    .iter()
                    .enumerate()
                    .any(|(i, g)| (g - p1[i]).abs() > 1e-6 && (g - p2[i]).abs() > 1e-6)
                {
                    differed = true;
                }
            }
        }
        assert!(differed);
    }
}
