//! Line-oriented URL file reading.

use std::io;
use std::path::Path;

use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;

/// Opens `path` and yields one URL per usable line.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
/// A line without an `http://` or `https://` scheme gets `https://`
/// prefixed. The stream is lazy and single-pass: lines are read from disk
/// as the dispatcher pulls them.
///
/// # Errors
///
/// Returns an error if the file cannot be opened. Read errors after that
/// are logged and the affected line is skipped.
pub async fn file_urls(
    path: impl AsRef<Path>,
) -> io::Result<impl Stream<Item = String> + Send + 'static> {
    let file = File::open(path).await?;
    let lines = LinesStream::new(BufReader::new(file).lines());

    Ok(lines.filter_map(|line| async move {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Failed to read line from URL file: {e}");
                return None;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Some(trimmed.to_string())
        } else {
            Some(format!("https://{trimmed}"))
        }
    }))
}
