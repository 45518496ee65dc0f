mod error;
mod explain;
mod forward;
pub mod init;
mod log_space;
mod model;
#[cfg(test)]
mod testing;
mod viterbi;

pub use error::HmmError;
pub use explain::{CellTrace, TraceTable};
pub use forward::total_likelihood;
pub use init::{flat_start, random_start};
pub use log_space::{log_sum_exp, log_total_likelihood};
pub use model::{Hmm, MatF64, MatInt};
pub use viterbi::ViterbiPath;
