use super::{Hmm, HmmError};
use rand::Rng;

/// Model where every distribution is uniform
pub fn flat_start(num_states: usize, num_symbols: usize) -> Result<Hmm, HmmError> {
    check_dimensions(num_states, num_symbols)?;

    let state_prob = 1.0 / num_states as f64;
    Hmm::new(
        vec![state_prob; num_states],
        vec![vec![state_prob; num_states]; num_states],
        vec![vec![1.0 / num_symbols as f64; num_symbols]; num_states],
    )
}

/// Model with uniformly drawn parameters, each distribution normalized to sum to one
pub fn random_start<R: Rng + ?Sized>(
    num_states: usize,
    num_symbols: usize,
    rng: &mut R,
) -> Result<Hmm, HmmError> {
    check_dimensions(num_states, num_symbols)?;

    let init = random_distribution(num_states, rng);
    let trans = (0..num_states)
        .map(|_| random_distribution(num_states, rng))
        .collect();
    let ems = (0..num_states)
        .map(|_| random_distribution(num_symbols, rng))
        .collect();

    Hmm::new(init, trans, ems)
}

fn random_distribution<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f64> {
    // Strictly positive weights
    let weights: Vec<f64> = (0..len).map(|_| rng.random::<f64>() + f64::EPSILON).collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

fn check_dimensions(num_states: usize, num_symbols: usize) -> Result<(), HmmError> {
    if num_states == 0 {
        return Err(HmmError::model("model has no states"));
    }
    if num_symbols == 0 {
        return Err(HmmError::model("emission matrix has no symbols"));
    }
    Ok(())
}
