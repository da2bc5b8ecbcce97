//! Parameter-vector operations for the genetic algorithm.
//!
//! Free functions over raw `f32` slices implementing initialization, complete
//! crossover, and uniform mutation. The [`algorithm`](crate::algorithm)
//! module composes these into the per-generation operator pipeline.
//!
//! All arithmetic clamps into `[-PARAM_LIMIT, PARAM_LIMIT]`, so no operation
//! can introduce a non-finite parameter value.

use rand::Rng;
use rand_distr::Uniform;

/// Random initialization draws each parameter uniformly from
/// `[-INIT_RANGE, INIT_RANGE]`.
pub const INIT_RANGE: f32 = 1.0;

/// Hard bound on parameter magnitude after any perturbation.
pub const PARAM_LIMIT: f32 = 1.0e6;

/// Generates a random parameter vector, uniform in `[-INIT_RANGE, INIT_RANGE]`.
pub fn random<R>(rng: &mut R, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    (0..len)
        .map(|_| rng.random_range(-INIT_RANGE..=INIT_RANGE))
        .collect()
}

/// Complete crossover: for every position independently, swaps the two
/// parents' values with probability `swap_probability`.
///
/// Returns the two offspring vectors; each is a position-wise recombination
/// of the parents.
///
/// # Panics
///
/// Panics if the parent vectors have different lengths.
pub fn complete_crossover<R>(
    p1: &[f32],
    p2: &[f32],
    swap_probability: f32,
    rng: &mut R,
) -> (Vec<f32>, Vec<f32>)
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    let mut c1 = p1.to_vec();
    let mut c2 = p2.to_vec();
    for i in 0..c1.len() {
        if rng.random_bool(f64::from(swap_probability)) {
            std::mem::swap(&mut c1[i], &mut c2[i]);
        }
    }
    (c1, c2)
}

/// Applies one mutation pass to a parameter vector in-place.
///
/// For each position, with probability `gene_probability`, adds a
/// perturbation drawn uniformly from `[-amount, amount]`. The result is
/// clamped to `[-PARAM_LIMIT, PARAM_LIMIT]`.
pub fn mutate<R>(parameters: &mut [f32], gene_probability: f32, amount: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let perturbation =
        Uniform::new_inclusive(-amount, amount).expect("mutation amount is non-negative");
    for p in parameters {
        if rng.random_bool(f64::from(gene_probability)) {
            *p = (*p + rng.sample(perturbation)).clamp(-PARAM_LIMIT, PARAM_LIMIT);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_random_stays_in_init_range() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let params = random(&mut rng, 1000);
        assert_eq!(params.len(), 1000);
        assert!(params.iter().all(|p| (-INIT_RANGE..=INIT_RANGE).contains(p)));
    }

    #[test]
    fn test_crossover_probability_zero_keeps_parents() {
        let mut rng = Pcg64Mcg::seed_from_u64(2);
        let p1 = [1.0, 2.0, 3.0];
        let p2 = [4.0, 5.0, 6.0];
        let (c1, c2) = complete_crossover(&p1, &p2, 0.0, &mut rng);
        assert_eq!(c1, p1);
        assert_eq!(c2, p2);
    }

    #[test]
    fn test_crossover_probability_one_swaps_everything() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let p1 = [1.0, 2.0, 3.0];
        let p2 = [4.0, 5.0, 6.0];
        let (c1, c2) = complete_crossover(&p1, &p2, 1.0, &mut rng);
        assert_eq!(c1, p2);
        assert_eq!(c2, p1);
    }

    #[test]
    fn test_crossover_offspring_are_positionwise_recombinations() {
        let mut rng = Pcg64Mcg::seed_from_u64(4);
        let p1 = [1.0, 2.0, 3.0, 4.0];
        let p2 = [5.0, 6.0, 7.0, 8.0];
        let (c1, c2) = complete_crossover(&p1, &p2, 0.5, &mut rng);
        for i in 0..4 {
            assert!(
                (c1[i] == p1[i] && c2[i] == p2[i]) || (c1[i] == p2[i] && c2[i] == p1[i]),
                "position {i} is not a swap or a keep"
            );
        }
    }

    #[test]
    fn test_mutate_probability_zero_is_noop() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let mut params = [1.0, -2.0, 0.5];
        mutate(&mut params, 0.0, 10.0, &mut rng);
        assert_eq!(params, [1.0, -2.0, 0.5]);
    }

    #[test]
    fn test_mutate_perturbation_is_bounded() {
        let mut rng = Pcg64Mcg::seed_from_u64(6);
        let amount = 0.25;
        let before = random(&mut rng, 100);
        let mut after = before.clone();
        mutate(&mut after, 1.0, amount, &mut rng);
        for (b, a) in std::iter::zip(&before, &after) {
            assert!((a - b).abs() <= amount + f32::EPSILON);
            assert!(a.is_finite());
        }
    }
}
