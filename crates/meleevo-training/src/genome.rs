//! Genome construction and the bounded real-valued variation operators.
//!
//! A genome is a fixed-length vector of reals in `[0, 1]`; variation always
//! produces new genome values (parents are never mutated in place) and keeps
//! every gene inside the bounds by clamping, never by rejection sampling.

use rand::Rng;

pub type Genome = Vec<f32>;

/// Lower gene bound.
pub const GENE_LOW: f32 = 0.0;
/// Upper gene bound.
pub const GENE_HIGH: f32 = 1.0;

/// Parents closer than this per gene are treated as identical and the gene is
/// inherited unchanged.
const SBX_EPS: f32 = 1e-6;

/// Generates a genome with every gene uniform in `[0, 1]`.
pub fn random_genome<R>(rng: &mut R, len: usize) -> Genome
where
    R: Rng + ?Sized,
{
    (0..len).map(|_| rng.random_range(GENE_LOW..=GENE_HIGH)).collect()
}

/// Simulated binary crossover, bounded to `[0, 1]`.
///
/// Each gene independently crosses over with probability 0.5; a crossed gene
/// pair is blended around the parent values with a spread controlled by
/// `eta` (larger `eta` keeps children closer to their parents). Children are
/// clamped to the gene bounds and swapped with probability 0.5 so neither
/// child is biased toward the lower parent.
///
/// # Panics
///
/// Panics if the parents have different lengths.
#[must_use]
pub fn sbx_bounded<R>(parent1: &[f32], parent2: &[f32], eta: f32, rng: &mut R) -> (Genome, Genome)
where
    R: Rng + ?Sized,
{
    assert_eq!(parent1.len(), parent2.len());
    let mut child1 = parent1.to_vec();
    let mut child2 = parent2.to_vec();

    for i in 0..child1.len() {
        if rng.random::<f32>() > 0.5 {
            continue;
        }
        let x1 = f32::min(parent1[i], parent2[i]);
        let x2 = f32::max(parent1[i], parent2[i]);
        if x2 - x1 <= SBX_EPS {
            continue;
        }

        let u = rng.random::<f32>();
        let c1 = spread_child(x1, x2, x1 - GENE_LOW, u, eta, -1.0).clamp(GENE_LOW, GENE_HIGH);
        let c2 = spread_child(x1, x2, GENE_HIGH - x2, u, eta, 1.0).clamp(GENE_LOW, GENE_HIGH);
        if rng.random::<f32>() <= 0.5 {
            (child1[i], child2[i]) = (c2, c1);
        } else {
            (child1[i], child2[i]) = (c1, c2);
        }
    }

    (child1, child2)
}

/// One SBX child: `0.5 * (x1 + x2 + sign * beta_q * (x2 - x1))` where
/// `beta_q` follows the bounded spread-factor distribution for the draw `u`
/// and `bound_gap` is the distance from the child's parent to its bound.
fn spread_child(x1: f32, x2: f32, bound_gap: f32, u: f32, eta: f32, sign: f32) -> f32 {
    let beta = 1.0 + 2.0 * bound_gap / (x2 - x1);
    let alpha = 2.0 - beta.powf(-(eta + 1.0));
    let beta_q = if u <= 1.0 / alpha {
        (u * alpha).powf(1.0 / (eta + 1.0))
    } else {
        (1.0 / (2.0 - u * alpha)).powf(1.0 / (eta + 1.0))
    };
    0.5 * ((x1 + x2) + sign * beta_q * (x2 - x1))
}

/// Polynomial mutation, bounded to `[0, 1]`.
///
/// Each gene mutates independently with probability `gene_prob`; a mutated
/// gene moves by a polynomial-shaped delta whose magnitude shrinks as `eta`
/// grows and as the gene approaches a bound, then is clamped.
pub fn mutate_polynomial<R>(genome: &mut [f32], eta: f32, gene_prob: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let range = GENE_HIGH - GENE_LOW;
    let mut_pow = 1.0 / (eta + 1.0);
    for gene in genome {
        if rng.random::<f32>() > gene_prob {
            continue;
        }
        let x = *gene;
        let delta_low = (x - GENE_LOW) / range;
        let delta_high = (GENE_HIGH - x) / range;
        let u = rng.random::<f32>();
        let delta_q = if u < 0.5 {
            let xy = 1.0 - delta_low;
            let val = 2.0 * u + (1.0 - 2.0 * u) * xy.powf(eta + 1.0);
            val.powf(mut_pow) - 1.0
        } else {
            let xy = 1.0 - delta_high;
            let val = 2.0 * (1.0 - u) + 2.0 * (u - 0.5) * xy.powf(eta + 1.0);
            1.0 - val.powf(mut_pow)
        };
        *gene = (x + delta_q * range).clamp(GENE_LOW, GENE_HIGH);
    }
}
