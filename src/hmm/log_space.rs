use super::viterbi::{argmax, traceback};
use super::{Hmm, HmmError, MatF64, ViterbiPath};

// lp = log probability

/// Numerically stable `ln(sum(exp(x)))`; `-inf` for empty input or all `-inf` terms
pub fn log_sum_exp(lps: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = lps.clone().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + lps.map(|lp| (lp - max).exp()).sum::<f64>().ln()
}

/// Log of the total likelihood from a log-domain forward table
pub fn log_total_likelihood(log_alpha: &[Vec<f64>]) -> f64 {
    log_alpha
        .last()
        .map_or(f64::NEG_INFINITY, |row| log_sum_exp(row.iter().copied()))
}

impl Hmm {
    /// Forward algorithm carried out on natural-log probabilities
    pub fn evaluate_log(&self, observations: &[usize]) -> Result<MatF64, HmmError> {
        self.check_observations(observations)?;

        let mut log_alpha =
            vec![vec![f64::NEG_INFINITY; self.num_states()]; observations.len()];

        for state in 0..self.num_states() {
            log_alpha[0][state] = self.init(state).ln() + self.ems(state, observations[0]).ln();
        }

        for t in 1..observations.len() {
            for state in 0..self.num_states() {
                let prev = &log_alpha[t - 1];
                let in_lp = log_sum_exp(
                    (0..self.num_states())
                        .map(|prev_state| prev[prev_state] + self.trans(prev_state, state).ln()),
                );
                log_alpha[t][state] = in_lp + self.ems(state, observations[t]).ln();
            }
        }

        Ok(log_alpha)
    }

    /// Viterbi decoding on natural-log probabilities.
    ///
    /// `probability` and `delta` of the returned path are logs. Tie-breaking
    /// matches [`Hmm::decode`].
    pub fn decode_log(&self, observations: &[usize]) -> Result<ViterbiPath, HmmError> {
        self.check_observations(observations)?;

        let mut delta = vec![vec![f64::NEG_INFINITY; self.num_states()]; observations.len()];
        let mut phi = vec![vec![0; self.num_states()]; observations.len()];

        for state in 0..self.num_states() {
            delta[0][state] = self.init(state).ln() + self.ems(state, observations[0]).ln();
        }

        for t in 1..observations.len() {
            for state in 0..self.num_states() {
                let prev = &delta[t - 1];
                let (best_state, best_lp) = argmax(
                    (0..self.num_states())
                        .map(|prev_state| prev[prev_state] + self.trans(prev_state, state).ln()),
                );
                phi[t][state] = best_state;
                delta[t][state] = best_lp + self.ems(state, observations[t]).ln();
            }
        }

        Ok(traceback(delta, phi))
    }
}
