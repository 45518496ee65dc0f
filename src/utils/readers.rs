use super::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

/// Opens a plain or gzip-compressed (`.gz`/`.gzip`) text file
pub fn open_text_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead + Send>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}
