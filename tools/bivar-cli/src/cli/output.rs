use std::fs;
use std::io::{self, Write};
use std::path::Path;

use bivarcontours_numeric::{JsonSink, RenderPayload, RenderSink};

use super::error::CliError;

/// Serializes the payload to `out`, or to stdout when no path is given.
///
/// The file is written from the serialized bytes as they are.
pub fn emit_payload(
    payload: &RenderPayload,
    out: Option<&Path>,
    pretty: bool,
) -> Result<(), CliError> {
    match out {
        Some(path) => {
            let write_error = |message: String| CliError::Write {
                path: path.to_path_buf(),
                message,
            };
            let mut sink = JsonSink::new(Vec::new(), pretty);
            sink.emit(payload).map_err(write_error)?;
            fs::write(path, sink.into_inner()).map_err(|e| write_error(e.to_string()))
        }
        None => {
            let stdout = io::stdout();
            let mut sink = JsonSink::new(stdout.lock(), pretty);
            sink.emit(payload).map_err(CliError::Stdout)?;
            sink.into_inner().flush().map_err(|e| CliError::Stdout(e.to_string()))
        }
    }
}
