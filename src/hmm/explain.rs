use super::{Hmm, HmmError, ViterbiPath};

/// How one cell of a forward or Viterbi table was computed.
///
/// At t = 0 `terms` holds the single initial probability. Later, `terms[k]`
/// is the previous cell of state `k` times the transition from `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellTrace {
    pub terms: Vec<f64>,
    pub emission: f64,
    pub value: f64,
    /// Viterbi back-pointer; `None` for forward cells and at t = 0
    pub predecessor: Option<usize>,
}

/// Cell traces indexed by time, then state
pub type TraceTable = Vec<Vec<CellTrace>>;

impl Hmm {
    /// Forward table with the predecessor terms that were summed into each cell
    pub fn explain_evaluate(&self, observations: &[usize]) -> Result<TraceTable, HmmError> {
        let alpha = self.evaluate(observations)?;
        let table = (0..alpha.len())
            .map(|t| {
                (0..self.num_states())
                    .map(|state| CellTrace {
                        terms: self.cell_terms(&alpha, t, state),
                        emission: self.ems(state, observations[t]),
                        value: alpha[t][state],
                        predecessor: None,
                    })
                    .collect()
            })
            .collect();
        Ok(table)
    }

    /// Decoded path and the candidate terms each Viterbi cell maximised over
    pub fn explain_decode(
        &self,
        observations: &[usize],
    ) -> Result<(ViterbiPath, TraceTable), HmmError> {
        let path = self.decode(observations)?;
        let table = (0..path.delta.len())
            .map(|t| {
                (0..self.num_states())
                    .map(|state| CellTrace {
                        terms: self.cell_terms(&path.delta, t, state),
                        emission: self.ems(state, observations[t]),
                        value: path.delta[t][state],
                        predecessor: (t > 0).then(|| path.phi[t][state]),
                    })
                    .collect()
            })
            .collect();
        Ok((path, table))
    }

    fn cell_terms(&self, table: &[Vec<f64>], t: usize, state: usize) -> Vec<f64> {
        if t == 0 {
            return vec![self.init(state)];
        }
        (0..self.num_states())
            .map(|prev_state| table[t - 1][prev_state] * self.trans(prev_state, state))
            .collect()
    }
}
