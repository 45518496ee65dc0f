mod alphabet;
mod io_utils;
mod model_file;
mod observations;
mod readers;
mod util;

pub use alphabet::Alphabet;
pub use io_utils::create_writer;
pub use model_file::{parse_model, read_model, write_model, ModelFile};
pub use observations::{
    get_records, parse_record, stream_records_into_channel, ObservationRecord,
};
pub use readers::open_text_reader;
pub use util::{handle_error_and_exit, Result};
