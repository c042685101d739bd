use std::path::Path;

use crate::error::{CliError, convert_io_error};

pub fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| convert_io_error(e, path.to_path_buf()))
}
