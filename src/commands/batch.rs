use crate::cli::InferenceArgs;
use crate::hmm::CellTrace;
use crate::utils::{
    create_writer, read_model, stream_records_into_channel, ModelFile, ObservationRecord, Result,
};
use crossbeam_channel::{bounded, Receiver};
use itertools::Itertools;
use rayon::{
    iter::{ParallelBridge, ParallelIterator},
    ThreadPoolBuilder,
};
use std::{collections::BTreeMap, io::Write, thread};

const CHANNEL_BUFFER_SIZE: usize = 2048;

#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub written: usize,
    pub failed: usize,
}

/// Loads the model and, if requested, verifies its distributions
pub fn load_model(args: &InferenceArgs) -> Result<ModelFile> {
    let model = read_model(&args.model_path)?;
    if args.strict {
        model
            .hmm
            .check_stochastic(args.tolerance)
            .map_err(|e| format!("Model {}: {}", args.model_path.display(), e))?;
    }
    log::info!(
        "Loaded model with {} states and {} symbols",
        model.hmm.num_states(),
        model.hmm.num_symbols()
    );
    Ok(model)
}

/// Streams every observation record through `process` on a thread pool and
/// writes the produced lines in input order. Records that fail are logged and skipped.
pub fn run_batch<F>(
    args: &InferenceArgs,
    model: &ModelFile,
    header: &str,
    process: F,
) -> Result<BatchSummary>
where
    F: Fn(&ModelFile, &ObservationRecord) -> Result<String> + Sync,
{
    let writer = create_writer(args.output_path.as_deref())?;
    run_batch_into(writer, args, model, header, process)
}

/// Same as [`run_batch`] with an explicit destination. A failed write stops
/// the pool and is returned ahead of any other error.
pub fn run_batch_into<W, F>(
    mut writer: W,
    args: &InferenceArgs,
    model: &ModelFile,
    header: &str,
    process: F,
) -> Result<BatchSummary>
where
    W: Write + Send + 'static,
    F: Fn(&ModelFile, &ObservationRecord) -> Result<String> + Sync,
{
    writeln!(writer, "{}", header).map_err(|e| format!("Failed to write header: {}", e))?;

    let (sender_record, receiver_record) = bounded(CHANNEL_BUFFER_SIZE);
    let observations_path = args.observations_path.clone();
    let alphabet = model.symbols.clone();
    let record_stream_thread = thread::spawn(move || {
        stream_records_into_channel(&observations_path, alphabet.as_ref(), sender_record)
    });

    let (sender_result, receiver_result) = bounded(CHANNEL_BUFFER_SIZE);
    let writer_thread = thread::spawn(move || write_in_order(receiver_result, &mut writer));

    log::debug!(
        "Initializing thread pool with {} threads...",
        args.num_threads
    );
    let pool = initialize_thread_pool(args.num_threads)?;
    let sent = pool.install(|| {
        receiver_record
            .into_iter()
            .par_bridge()
            .try_for_each_with(&sender_result, |s, (index, record)| {
                let line = match record {
                    Ok(record) => process_record(model, &record, &process),
                    Err(err) => {
                        log::error!("{}", err);
                        None
                    }
                };
                s.send((index, line))
                    .map_err(|e| format!("Failed to send result to writer thread: {}", e))
            })
    });

    // Clean-up
    drop(sender_result);
    let written = writer_thread.join().expect("Writer thread panicked");
    log::trace!("Writer thread finished");
    let streamed = record_stream_thread
        .join()
        .expect("Observation stream thread panicked");
    log::trace!("Observation stream thread finished");

    let summary = written?;
    sent?;
    streamed?;

    log::info!(
        "Processed {} sequences, {} failed",
        summary.written + summary.failed,
        summary.failed
    );
    Ok(summary)
}

fn process_record<F>(model: &ModelFile, record: &ObservationRecord, process: &F) -> Option<String>
where
    F: Fn(&ModelFile, &ObservationRecord) -> Result<String>,
{
    match process(model, record) {
        Ok(line) => Some(line),
        Err(err) => {
            log::error!("Error processing sequence {}: {}", record.id, err);
            None
        }
    }
}

/// Writes lines tagged with their input position, buffering out-of-order
/// arrivals. `None` marks a failed record and only advances the position.
pub fn write_in_order<W: Write>(
    receiver: Receiver<(usize, Option<String>)>,
    writer: &mut W,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let mut pending = BTreeMap::new();
    let mut next_index = 0;

    for (index, line) in &receiver {
        pending.insert(index, line);
        while let Some(line) = pending.remove(&next_index) {
            match line {
                Some(line) => {
                    writeln!(writer, "{}", line).map_err(|e| format!("Failed to write: {}", e))?;
                    summary.written += 1;
                }
                None => summary.failed += 1,
            }
            next_index += 1;
        }
    }

    if !pending.is_empty() {
        return Err(format!(
            "{} results never became writable after position {}",
            pending.len(),
            next_index
        ));
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;
    Ok(summary)
}

/// Tab-separated `id, time, state, value, emission, terms` row for one table cell
pub fn format_cell(
    model: &ModelFile,
    id: &str,
    time: usize,
    state: usize,
    cell: &CellTrace,
) -> String {
    format!(
        "{}\t{}\t{}\t{:e}\t{:e}\t{}",
        id,
        time,
        model.state_name(state),
        cell.value,
        cell.emission,
        cell.terms.iter().map(|term| format!("{:e}", term)).join(",")
    )
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("dhmm-{}", i))
        .start_handler(|_thread_index| {
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}
