use super::{Hmm, HmmError, MatF64};

impl Hmm {
    /// Runs the forward algorithm and returns the full alpha table
    /// (rows: time, columns: states).
    ///
    /// Probabilities are multiplied directly, so long sequences underflow
    /// to zero; use [`Hmm::evaluate_log`] for those.
    pub fn evaluate(&self, observations: &[usize]) -> Result<MatF64, HmmError> {
        self.check_observations(observations)?;

        let mut alpha = vec![vec![0.0; self.num_states()]; observations.len()];

        for state in 0..self.num_states() {
            alpha[0][state] = self.init(state) * self.ems(state, observations[0]);
        }

        for t in 1..observations.len() {
            let symbol = observations[t];
            for state in 0..self.num_states() {
                let incoming: f64 = (0..self.num_states())
                    .map(|prev_state| alpha[t - 1][prev_state] * self.trans(prev_state, state))
                    .sum();
                alpha[t][state] = incoming * self.ems(state, symbol);
            }
        }

        Ok(alpha)
    }

    /// Probability of the observation sequence under the model
    pub fn likelihood(&self, observations: &[usize]) -> Result<f64, HmmError> {
        self.evaluate(observations).map(|alpha| total_likelihood(&alpha))
    }
}

/// Sums the final row of a forward table
pub fn total_likelihood(alpha: &[Vec<f64>]) -> f64 {
    alpha.last().map_or(0.0, |row| row.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::init::random_start;
    use crate::hmm::model::tests::make_weather_hmm;
    use crate::hmm::testing::{brute_force_likelihood, random_observations};
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn forward_table_matches_hand_computation() {
        let hmm = make_weather_hmm();
        let alpha = hmm.evaluate(&[0, 3, 5]).unwrap();

        assert_eq!(alpha.len(), 3);
        assert_relative_eq!(alpha[0][0], 0.30, max_relative = 1e-12);
        assert_relative_eq!(alpha[0][1], 0.015, max_relative = 1e-12);
        assert_eq!(alpha[0][2], 0.0);
        assert_relative_eq!(alpha[1][0], 0.01065, max_relative = 1e-12);
        assert_relative_eq!(alpha[1][1], 0.0414, max_relative = 1e-12);
        assert_relative_eq!(alpha[1][2], 0.0033, max_relative = 1e-12);
        assert_eq!(alpha[2][0], 0.0);
        assert_eq!(alpha[2][1], 0.0);
        assert_relative_eq!(alpha[2][2], 0.006597, max_relative = 1e-12);
        assert_relative_eq!(total_likelihood(&alpha), 0.006597, max_relative = 1e-12);
    }

    #[test]
    fn recurrence_uses_model_emissions() {
        // Two models that differ only in emissions must give different tables
        let trans = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        let a = Hmm::new(
            vec![0.5, 0.5],
            trans.clone(),
            vec![vec![0.9, 0.1], vec![0.1, 0.9]],
        )
        .unwrap();
        let b = Hmm::new(vec![0.5, 0.5], trans, vec![vec![0.2, 0.8], vec![0.8, 0.2]]).unwrap();

        let alpha_a = a.evaluate(&[0, 0]).unwrap();
        let alpha_b = b.evaluate(&[0, 0]).unwrap();
        assert_relative_eq!(alpha_a[1][0], 0.25 * 0.9, max_relative = 1e-12);
        assert_relative_eq!(alpha_b[1][0], 0.25 * 0.2, max_relative = 1e-12);
    }

    #[test]
    fn forward_sum_equals_sum_over_all_paths() {
        let hmm = Hmm::new(
            vec![0.6, 0.4],
            vec![vec![0.7, 0.3], vec![0.4, 0.6]],
            vec![vec![0.5, 0.4, 0.1], vec![0.1, 0.3, 0.6]],
        )
        .unwrap();
        let observations = [0, 1, 2];

        let expected = brute_force_likelihood(&hmm, &observations);
        assert_relative_eq!(
            hmm.likelihood(&observations).unwrap(),
            expected,
            max_relative = 1e-12
        );
    }

    #[test]
    fn forward_sum_matches_enumeration_on_random_models() {
        let mut rng = StdRng::seed_from_u64(42);
        for num_states in 1..=3 {
            let hmm = random_start(num_states, 4, &mut rng).unwrap();
            for len in 1..=5 {
                let observations = random_observations(4, len, &mut rng);
                assert_relative_eq!(
                    hmm.likelihood(&observations).unwrap(),
                    brute_force_likelihood(&hmm, &observations),
                    max_relative = 1e-9
                );
            }
        }
    }

    #[test]
    fn alpha_is_non_negative_for_stochastic_models() {
        let mut rng = StdRng::seed_from_u64(7);
        let hmm = random_start(5, 8, &mut rng).unwrap();
        let observations = random_observations(8, 40, &mut rng);
        let alpha = hmm.evaluate(&observations).unwrap();
        assert!(alpha.iter().flatten().all(|v| *v >= 0.0));
    }

    #[test]
    fn single_observation_table() {
        let hmm = make_weather_hmm();
        let alpha = hmm.evaluate(&[3]).unwrap();
        assert_eq!(alpha.len(), 1);
        assert_relative_eq!(
            total_likelihood(&alpha),
            0.5 * 0.05 + 0.3 * 0.6 + 0.2 * 0.1,
            max_relative = 1e-12
        );
    }

    #[test]
    fn evaluate_empty_sequence_err() {
        let hmm = make_weather_hmm();
        assert_eq!(
            hmm.evaluate(&[]),
            Err(HmmError::InvalidInput(
                "empty observation sequence".to_string()
            ))
        );
    }

    #[test]
    fn evaluate_out_of_range_symbol_err() {
        let hmm = make_weather_hmm();
        assert!(matches!(
            hmm.evaluate(&[0, 9]),
            Err(HmmError::InvalidInput(_))
        ));
    }

    #[test]
    fn total_likelihood_of_empty_table_is_zero() {
        assert_eq!(total_likelihood(&[]), 0.0);
    }
}
