use super::batch::{format_cell, load_model, run_batch};
use crate::cli::InferenceArgs;
use crate::utils::{ModelFile, ObservationRecord, Result};
use itertools::Itertools;

pub fn decode(args: InferenceArgs) -> Result<()> {
    let model = load_model(&args)?;
    if args.explain {
        run_batch(
            &args,
            &model,
            "#id\ttime\tstate\tdelta\temission\tterms\tbest_previous\ton_path",
            explain_record,
        )?;
        return Ok(());
    }

    let header = if args.log_space {
        "#id\tlog_probability\tstates"
    } else {
        "#id\tprobability\tstates"
    };
    let log_space = args.log_space;
    run_batch(&args, &model, header, |model, record| {
        decode_record(model, record, log_space)
    })?;
    Ok(())
}

fn decode_record(
    model: &ModelFile,
    record: &ObservationRecord,
    log_space: bool,
) -> Result<String> {
    let path = if log_space {
        model.hmm.decode_log(&record.symbols)?
    } else {
        model.hmm.decode(&record.symbols)?
    };
    log::trace!("{} delta: {:?}", record.id, path.delta);
    log::trace!("{} phi: {:?}", record.id, path.phi);

    let states = path.states.iter().map(|s| model.state_name(*s)).join(",");
    let probability = if log_space {
        format!("{:.6}", path.probability)
    } else {
        format!("{:e}", path.probability)
    };
    Ok(format!("{}\t{}\t{}", record.id, probability, states))
}

/// One row per Viterbi cell with its back-pointer and whether the decoded path
/// passes through it
fn explain_record(model: &ModelFile, record: &ObservationRecord) -> Result<String> {
    let (path, table) = model.hmm.explain_decode(&record.symbols)?;
    let rows = table
        .iter()
        .enumerate()
        .flat_map(|(time, row)| {
            let on_path = path.states[time];
            row.iter().enumerate().map(move |(state, cell)| {
                let best_previous = match cell.predecessor {
                    Some(previous) => model.state_name(previous),
                    None => ".".to_string(),
                };
                format!(
                    "{}\t{}\t{}",
                    format_cell(model, &record.id, time, state, cell),
                    best_previous,
                    u8::from(state == on_path)
                )
            })
        })
        .join("\n");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_model;
    use std::io::Cursor;

    const WEATHER_MODEL: &str = "\
initial 0.5 0.3 0.2
transition 0.7 0.2 0.1
transition 0.2 0.6 0.2
transition 0.1 0.4 0.5
emission 0.6 0.2 0.1 0.05 0.05 0.0
emission 0.05 0.1 0.2 0.6 0.05 0.0
emission 0.0 0.0 0.1 0.1 0.2 0.6
";

    fn record(symbols: Vec<usize>) -> ObservationRecord {
        ObservationRecord {
            id: "seq1".to_string(),
            symbols,
        }
    }

    #[test]
    fn decode_line_with_state_indices() {
        let model = parse_model(Cursor::new(WEATHER_MODEL)).unwrap();
        let line = decode_record(&model, &record(vec![0, 3, 5]), false).unwrap();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[0], "seq1");
        assert!((fields[1].parse::<f64>().unwrap() - 0.00432).abs() < 1e-12);
        assert_eq!(fields[2], "0,1,2");
    }

    #[test]
    fn decode_line_with_state_names() {
        let model =
            parse_model(Cursor::new(format!("states hot mild cold\n{}", WEATHER_MODEL))).unwrap();
        let line = decode_record(&model, &record(vec![0, 3, 5]), true).unwrap();
        assert!(line.ends_with("\thot,mild,cold"));
        assert!(line.contains(&format!("{:.6}", 0.00432f64.ln())));
    }

    #[test]
    fn explain_rows_follow_back_pointers() {
        let model =
            parse_model(Cursor::new(format!("states hot mild cold\n{}", WEATHER_MODEL))).unwrap();
        let rows = explain_record(&model, &record(vec![0, 3, 5])).unwrap();
        let rows: Vec<Vec<&str>> = rows.lines().map(|row| row.split('\t').collect()).collect();
        assert_eq!(rows.len(), 9);

        assert_eq!(&rows[0][..3], &["seq1", "0", "hot"]);
        assert_eq!(&rows[0][5..], &["5e-1", ".", "1"]);

        let last = &rows[8];
        assert_eq!(&last[..3], &["seq1", "2", "cold"]);
        assert!((last[3].parse::<f64>().unwrap() - 0.00432).abs() < 1e-12);
        assert_eq!(last[4], "6e-1");
        let terms: Vec<f64> = last[5].split(',').map(|t| t.parse().unwrap()).collect();
        for (term, expected) in terms.iter().zip([0.00105, 0.0072, 0.0015]) {
            assert!((term - expected).abs() < 1e-12);
        }
        assert_eq!(&last[6..], &["mild", "1"]);

        let on_path: Vec<&str> = rows
            .iter()
            .filter(|row| row[7] == "1")
            .map(|row| row[2])
            .collect();
        assert_eq!(on_path, vec!["hot", "mild", "cold"]);
    }

    #[test]
    fn empty_sequence_err() {
        let model = parse_model(Cursor::new(WEATHER_MODEL)).unwrap();
        assert_eq!(
            decode_record(&model, &record(vec![]), false),
            Err("InvalidInput: empty observation sequence".to_string())
        );
    }
}
