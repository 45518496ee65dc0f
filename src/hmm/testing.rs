//! Brute-force and reference implementations used to cross-check the engine

use super::Hmm;
use itertools::Itertools;
use rand::Rng;

pub fn random_observations<R: Rng + ?Sized>(
    num_symbols: usize,
    len: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..len).map(|_| rng.random_range(0..num_symbols)).collect()
}

/// Every state sequence of length `len`
pub fn all_paths(num_states: usize, len: usize) -> impl Iterator<Item = Vec<usize>> {
    (0..len).map(|_| 0..num_states).multi_cartesian_product()
}

/// P(observations, states | model)
pub fn joint_probability(hmm: &Hmm, states: &[usize], observations: &[usize]) -> f64 {
    let ems = hmm.observation_probabilities();
    let trans = hmm.transition_probabilities();
    let mut prob = hmm.initial_probabilities()[states[0]] * ems[states[0]][observations[0]];
    for (t, (prev, state)) in states.iter().tuple_windows().enumerate() {
        prob *= trans[*prev][*state] * ems[*state][observations[t + 1]];
    }
    prob
}

pub fn brute_force_likelihood(hmm: &Hmm, observations: &[usize]) -> f64 {
    all_paths(hmm.num_states(), observations.len())
        .map(|states| joint_probability(hmm, &states, observations))
        .sum()
}

/// Independent log-space Viterbi written against the public accessors only.
/// Returns the best path and its log probability.
pub fn reference_viterbi(hmm: &Hmm, observations: &[usize]) -> (Vec<usize>, f64) {
    let lp = |p: f64| p.ln();
    let n = hmm.num_states();
    let ems = hmm.observation_probabilities();
    let trans = hmm.transition_probabilities();

    let mut scores: Vec<f64> = (0..n)
        .map(|s| lp(hmm.initial_probabilities()[s]) + lp(ems[s][observations[0]]))
        .collect();
    let mut backpointers: Vec<Vec<usize>> = Vec::with_capacity(observations.len());

    for symbol in &observations[1..] {
        let mut next = Vec::with_capacity(n);
        let mut pointers = Vec::with_capacity(n);
        for to in 0..n {
            let (from, score) = (0..n)
                .map(|from| (from, scores[from] + lp(trans[from][to])))
                .fold((0, f64::NEG_INFINITY), |best, cand| {
                    if cand.1 > best.1 {
                        cand
                    } else {
                        best
                    }
                });
            pointers.push(from);
            next.push(score + lp(ems[to][*symbol]));
        }
        backpointers.push(pointers);
        scores = next;
    }

    let (mut state, best) = scores
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, cand| {
            if cand.1 > best.1 {
                cand
            } else {
                best
            }
        });
    let mut path = vec![state];
    for pointers in backpointers.iter().rev() {
        state = pointers[state];
        path.push(state);
    }
    path.reverse();
    (path, best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force_helpers_agree_on_single_state_model() {
        let hmm = Hmm::new(vec![1.0], vec![vec![1.0]], vec![vec![0.25, 0.75]]).unwrap();
        let observations = [1, 0, 1];
        assert_eq!(all_paths(1, 3).count(), 1);
        let expected = 0.75 * 0.25 * 0.75;
        assert!((brute_force_likelihood(&hmm, &observations) - expected).abs() < 1e-15);
        let (path, best) = reference_viterbi(&hmm, &observations);
        assert_eq!(path, vec![0, 0, 0]);
        assert!((best.exp() - expected).abs() < 1e-15);
    }
}
