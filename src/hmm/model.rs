use super::HmmError;

// List of abbreviations
// init = initial state probabilities
// trans = state transition probabilities
// ems = emission (observation) probabilities

pub type MatF64 = Vec<Vec<f64>>;
pub type MatInt = Vec<Vec<usize>>;

/// Discrete HMM over `num_states` hidden states and `num_symbols` observable symbols.
///
/// Parameters are raw probabilities and are never modified after construction,
/// so a single model can be shared across threads and decoded concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Hmm {
    num_states: usize,
    num_symbols: usize,
    init: Vec<f64>,
    trans: MatF64,
    ems: MatF64,
}

impl Hmm {
    /// Builds a model from an initial distribution, a transition matrix
    /// (row = from, column = to) and an emission matrix (row = state, column = symbol).
    ///
    /// Rows are not required to sum to one; see [`Hmm::check_stochastic`].
    pub fn new(init: Vec<f64>, trans: MatF64, ems: MatF64) -> Result<Hmm, HmmError> {
        if trans.iter().any(|row| row.len() != trans.len()) {
            return Err(HmmError::model("transition matrix not square"));
        }

        if init.len() != trans.len() {
            return Err(HmmError::model(format!(
                "dimension mismatch: {} initial probabilities for {} states",
                init.len(),
                trans.len()
            )));
        }

        let num_states = init.len();
        if num_states == 0 {
            return Err(HmmError::model("model has no states"));
        }

        if ems.len() != num_states {
            return Err(HmmError::model(format!(
                "dimension mismatch: {} emission rows for {} states",
                ems.len(),
                num_states
            )));
        }

        let num_symbols = ems[0].len();
        if num_symbols == 0 {
            return Err(HmmError::model("emission matrix has no symbols"));
        }
        if let Some(state) = ems.iter().position(|row| row.len() != num_symbols) {
            return Err(HmmError::model(format!(
                "emission row {} has {} symbols, expected {}",
                state,
                ems[state].len(),
                num_symbols
            )));
        }

        Ok(Hmm {
            num_states,
            num_symbols,
            init,
            trans,
            ems,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    pub fn initial_probabilities(&self) -> &[f64] {
        &self.init
    }

    pub fn transition_probabilities(&self) -> &MatF64 {
        &self.trans
    }

    pub fn observation_probabilities(&self) -> &MatF64 {
        &self.ems
    }

    pub(crate) fn init(&self, state: usize) -> f64 {
        self.init[state]
    }

    pub(crate) fn trans(&self, from: usize, to: usize) -> f64 {
        self.trans[from][to]
    }

    pub(crate) fn ems(&self, state: usize, symbol: usize) -> f64 {
        self.ems[state][symbol]
    }

    /// Checks that the initial vector and every transition and emission row
    /// is a probability distribution within `tolerance`
    pub fn check_stochastic(&self, tolerance: f64) -> Result<(), HmmError> {
        check_distribution(&self.init, tolerance).map_err(|e| {
            HmmError::model(format!("initial probabilities {}", e))
        })?;

        for (state, row) in self.trans.iter().enumerate() {
            check_distribution(row, tolerance)
                .map_err(|e| HmmError::model(format!("transition row {} {}", state, e)))?;
        }

        for (state, row) in self.ems.iter().enumerate() {
            check_distribution(row, tolerance)
                .map_err(|e| HmmError::model(format!("emission row {} {}", state, e)))?;
        }

        Ok(())
    }

    /// Rejects empty sequences and symbols the emission matrix has no column for
    pub(crate) fn check_observations(&self, observations: &[usize]) -> Result<(), HmmError> {
        if observations.is_empty() {
            return Err(HmmError::input("empty observation sequence"));
        }

        if let Some((t, symbol)) = observations
            .iter()
            .enumerate()
            .find(|(_, symbol)| **symbol >= self.num_symbols)
        {
            return Err(HmmError::input(format!(
                "symbol index out of range: {} at position {} (model has {} symbols)",
                symbol, t, self.num_symbols
            )));
        }

        Ok(())
    }
}

fn check_distribution(probs: &[f64], tolerance: f64) -> Result<(), String> {
    if let Some(p) = probs.iter().find(|p| p.is_nan() || **p < 0.0) {
        return Err(format!("contains invalid probability {}", p));
    }

    let total: f64 = probs.iter().sum();
    if (total - 1.0).abs() > tolerance {
        return Err(format!("sums to {}, expected 1.0", total));
    }

    Ok(())
}
