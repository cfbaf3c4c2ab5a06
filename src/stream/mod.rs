//! Line splitting for child process output.
//!
//! Download and separation tools redraw their progress line in place with
//! `\r`, so a plain `lines()` reader would see one huge line at the end of
//! the download. [`LineReader`] treats a lone `\r` as a line break as well,
//! hands each line out as soon as its terminator arrives, and decodes every
//! line lossily, so invalid UTF-8 never aborts a run.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader yielding lines split on `\n`, `\r\n` and `\r`.
pub struct LineReader<R> {
    reader: BufReader<R>,
    partial: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            partial: Vec::new(),
        }
    }

    /// Next non-empty line, or `None` at end of stream.
    ///
    /// An unterminated trailing fragment is returned once the stream ends.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(self.take_partial());
            }

            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(pos) => {
                    self.partial.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    // `\r\n` leaves an empty fragment behind the `\r`.
                    if let Some(line) = self.take_partial() {
                        return Ok(Some(line));
                    }
                }
                None => {
                    let len = available.len();
                    self.partial.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }

    fn take_partial(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        Some(line)
    }
}
