use super::batch::{format_cell, load_model, run_batch};
use crate::cli::InferenceArgs;
use crate::hmm::{log_total_likelihood, total_likelihood};
use crate::utils::{ModelFile, ObservationRecord, Result};
use itertools::Itertools;

pub fn evaluate(args: InferenceArgs) -> Result<()> {
    let model = load_model(&args)?;
    if args.explain {
        run_batch(
            &args,
            &model,
            "#id\ttime\tstate\talpha\temission\tterms",
            explain_record,
        )?;
        return Ok(());
    }

    let header = if args.log_space {
        "#id\tlog_likelihood"
    } else {
        "#id\tlikelihood"
    };
    let log_space = args.log_space;
    run_batch(&args, &model, header, |model, record| {
        evaluate_record(model, record, log_space)
    })?;
    Ok(())
}

/// One row per forward cell; `terms` are the predecessor products summed into it
fn explain_record(model: &ModelFile, record: &ObservationRecord) -> Result<String> {
    let table = model.hmm.explain_evaluate(&record.symbols)?;
    let rows = table
        .iter()
        .enumerate()
        .flat_map(|(time, row)| {
            row.iter()
                .enumerate()
                .map(move |(state, cell)| format_cell(model, &record.id, time, state, cell))
        })
        .join("\n");
    Ok(rows)
}

fn evaluate_record(
    model: &ModelFile,
    record: &ObservationRecord,
    log_space: bool,
) -> Result<String> {
    let line = if log_space {
        let log_alpha = model.hmm.evaluate_log(&record.symbols)?;
        log::trace!("{} log alpha: {:?}", record.id, log_alpha);
        format!("{}\t{:.6}", record.id, log_total_likelihood(&log_alpha))
    } else {
        let alpha = model.hmm.evaluate(&record.symbols)?;
        log::trace!("{} alpha: {:?}", record.id, alpha);
        format!("{}\t{:e}", record.id, total_likelihood(&alpha))
    };
    Ok(line)
}
