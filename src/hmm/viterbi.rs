use super::{Hmm, HmmError, MatF64, MatInt};

/// Most probable state path together with the tables it was traced from
#[derive(Debug, Clone, PartialEq)]
pub struct ViterbiPath {
    pub states: Vec<usize>,
    /// Score of the best path; a natural log when produced by [`Hmm::decode_log`]
    pub probability: f64,
    pub delta: MatF64,
    pub phi: MatInt,
}

impl Hmm {
    /// Runs the Viterbi algorithm on the observations to find the optimal state sequence
    pub fn decode(&self, observations: &[usize]) -> Result<ViterbiPath, HmmError> {
        self.check_observations(observations)?;
        let (delta, phi) = self.generate_mats(observations);
        Ok(traceback(delta, phi))
    }

    // rows: time, columns: states
    fn generate_mats(&self, observations: &[usize]) -> (MatF64, MatInt) {
        let mut delta = vec![vec![0.0; self.num_states()]; observations.len()];
        let mut phi = vec![vec![0; self.num_states()]; observations.len()];

        for state in 0..self.num_states() {
            delta[0][state] = self.init(state) * self.ems(state, observations[0]);
        }

        for t in 1..observations.len() {
            for state in 0..self.num_states() {
                let prev = &delta[t - 1];
                let (best_state, best_score) = argmax(
                    (0..self.num_states())
                        .map(|prev_state| prev[prev_state] * self.trans(prev_state, state)),
                );
                phi[t][state] = best_state;
                delta[t][state] = best_score * self.ems(state, observations[t]);
            }
        }

        (delta, phi)
    }
}

/// Index and value of the largest score; the lowest index wins ties
pub(crate) fn argmax(scores: impl Iterator<Item = f64>) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (index, score) in scores.enumerate() {
        if index == 0 || score > best.1 {
            best = (index, score);
        }
    }
    best
}

pub(crate) fn traceback(delta: MatF64, phi: MatInt) -> ViterbiPath {
    let last = delta.len() - 1;
    let (last_state, probability) = argmax(delta[last].iter().copied());

    let mut states = vec![0; delta.len()];
    states[last] = last_state;
    for t in (0..last).rev() {
        states[t] = phi[t + 1][states[t + 1]];
    }

    ViterbiPath {
        states,
        probability,
        delta,
        phi,
    }
}
