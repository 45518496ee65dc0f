use crate::utils::Result;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

/// Buffered writer to `output_path`, or to stdout when no path is given
pub fn create_writer(output_path: Option<&Path>) -> Result<BufWriter<Box<dyn Write + Send>>> {
    let sink: Box<dyn Write + Send> = match output_path {
        Some(path) => Box::new(
            File::create(path)
                .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?,
        ),
        None => Box::new(io::stdout()),
    };
    Ok(BufWriter::new(sink))
}
