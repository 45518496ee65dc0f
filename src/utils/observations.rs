use super::{open_text_reader, Alphabet, Result};
use crossbeam_channel::Sender;
use std::{
    io::{BufRead, BufReader, Read as ioRead},
    path::Path,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub id: String,
    pub symbols: Vec<usize>,
}

/// Parses a `<id> <sym>,<sym>,...` line. Blank and `#` lines yield `None`.
///
/// Symbols are looked up in `alphabet` when one is given and parsed as
/// indices otherwise. Indices are not range checked here.
pub fn parse_record(
    line: &str,
    alphabet: Option<&Alphabet>,
) -> Result<Option<ObservationRecord>> {
    const EXPECTED_FIELD_COUNT: usize = 2;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let split_line: Vec<&str> = line.split_whitespace().collect();
    let (id, encoded) = match &split_line[..] {
        [id, encoded] => (*id, *encoded),
        _ => {
            return Err(format!(
                "Expected {} fields in the format 'id symbols', found {}: {}",
                EXPECTED_FIELD_COUNT,
                split_line.len(),
                line
            ))
        }
    };

    let symbols = encoded
        .split(',')
        .map(|token| decode_symbol(token, alphabet))
        .collect::<Result<Vec<usize>>>()
        .map_err(|e| format!("Sequence {}: {}", id, e))?;

    Ok(Some(ObservationRecord {
        id: id.to_string(),
        symbols,
    }))
}

fn decode_symbol(token: &str, alphabet: Option<&Alphabet>) -> Result<usize> {
    match alphabet {
        Some(alphabet) => alphabet
            .index_of(token)
            .ok_or_else(|| format!("Unknown symbol '{}'", token)),
        None => token
            .parse::<usize>()
            .map_err(|_| format!("Invalid symbol index '{}'", token)),
    }
}

/// Iterates over the records of an observation file, tagging errors with their line
pub fn get_records<'a>(
    reader: BufReader<Box<dyn ioRead + Send>>,
    alphabet: Option<&'a Alphabet>,
) -> impl Iterator<Item = Result<ObservationRecord>> + 'a {
    reader
        .lines()
        .enumerate()
        .filter_map(move |(line_number, result_line)| {
            result_line
                .map_err(|e| e.to_string())
                .and_then(|line| parse_record(&line, alphabet))
                .map_err(|e| format!("Error at observation line {}: {}", line_number + 1, e))
                .transpose()
        })
}

/// Streams records into `sender`, numbering them by their position in the file
pub fn stream_records_into_channel(
    path: &Path,
    alphabet: Option<&Alphabet>,
    sender: Sender<(usize, Result<ObservationRecord>)>,
) -> Result<()> {
    let reader = open_text_reader(path)?;
    for (index, record) in get_records(reader, alphabet).enumerate() {
        if sender.send((index, record)).is_err() {
            return Err("Observation receiver disconnected".to_string());
        }
    }
    Ok(())
}
