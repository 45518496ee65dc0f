use super::{open_text_reader, Alphabet, Result};
use crate::hmm::Hmm;
use itertools::Itertools;
use std::{
    io::{BufRead, Write},
    path::Path,
};

/// Model parameters together with the optional names of its states and symbols
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFile {
    pub hmm: Hmm,
    pub states: Option<Alphabet>,
    pub symbols: Option<Alphabet>,
}

impl ModelFile {
    pub fn state_name(&self, state: usize) -> String {
        match self.states.as_ref().and_then(|a| a.name(state)) {
            Some(name) => name.to_string(),
            None => state.to_string(),
        }
    }
}

pub fn read_model(path: &Path) -> Result<ModelFile> {
    let reader = open_text_reader(path)?;
    parse_model(reader).map_err(|e| format!("Model {}: {}", path.display(), e))
}

pub fn parse_model<R: BufRead>(reader: R) -> Result<ModelFile> {
    let mut init: Option<Vec<f64>> = None;
    let mut trans = Vec::new();
    let mut ems = Vec::new();
    let mut states = None;
    let mut symbols = None;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Error reading line {}: {}", line_number + 1, e))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let key = fields.next().unwrap_or_default();
        let values = fields.collect_vec();
        let at_line = |e: String| format!("{} at line {}", e, line_number + 1);

        match key {
            "initial" => {
                if init.is_some() {
                    return Err(at_line("Duplicate initial probabilities".to_string()));
                }
                init = Some(parse_probs(&values).map_err(at_line)?);
            }
            "transition" => trans.push(parse_probs(&values).map_err(at_line)?),
            "emission" => ems.push(parse_probs(&values).map_err(at_line)?),
            "states" => {
                if states.is_some() {
                    return Err(at_line("Duplicate state names".to_string()));
                }
                states = Some(Alphabet::new(values).map_err(at_line)?);
            }
            "symbols" => {
                if symbols.is_some() {
                    return Err(at_line("Duplicate symbol names".to_string()));
                }
                symbols = Some(Alphabet::new(values).map_err(at_line)?);
            }
            _ => return Err(at_line(format!("Unknown model directive '{}'", key))),
        }
    }

    let init = init.ok_or("Missing initial probabilities")?;
    let hmm = Hmm::new(init, trans, ems)?;

    if let Some(states) = &states {
        if states.len() != hmm.num_states() {
            return Err(format!(
                "{} state names given for {} states",
                states.len(),
                hmm.num_states()
            ));
        }
    }
    if let Some(symbols) = &symbols {
        if symbols.len() != hmm.num_symbols() {
            return Err(format!(
                "{} symbol names given for {} symbols",
                symbols.len(),
                hmm.num_symbols()
            ));
        }
    }

    Ok(ModelFile {
        hmm,
        states,
        symbols,
    })
}

fn parse_probs(values: &[&str]) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err("Expected at least one probability".to_string());
    }
    values
        .iter()
        .map(|v| {
            v.parse::<f64>()
                .map_err(|e| format!("Could not parse probability '{}': {}", v, e))
        })
        .collect()
}

pub fn write_model<W: Write>(writer: &mut W, model: &ModelFile) -> Result<()> {
    let join = |row: &[f64]| row.iter().map(|p| p.to_string()).join(" ");
    let hmm = &model.hmm;

    let mut lines = Vec::new();
    if let Some(states) = &model.states {
        lines.push(format!("states {}", states.names().join(" ")));
    }
    if let Some(symbols) = &model.symbols {
        lines.push(format!("symbols {}", symbols.names().join(" ")));
    }
    lines.push(format!("initial {}", join(hmm.initial_probabilities())));
    for row in hmm.transition_probabilities() {
        lines.push(format!("transition {}", join(row)));
    }
    for row in hmm.observation_probabilities() {
        lines.push(format!("emission {}", join(row)));
    }

    for line in lines {
        writeln!(writer, "{}", line).map_err(|e| format!("Failed to write model: {}", e))?;
    }
    Ok(())
}
