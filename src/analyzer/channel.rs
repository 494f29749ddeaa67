//! Line-oriented bridge to the analyzer's stdin/stdout.
//!
//! # Responsibilities
//! - Own both pipe endpoints for the lifetime of the service
//! - Write one terminated line, read back one line
//! - Strip the trailing terminator from the answer
//!
//! # Design Decisions
//! - No locking here: callers hold the admission slot (see `resilience::gate`)
//! - Endpoints are boxed so tests can substitute in-memory pipes
//! - Line breaks inside the input are flattened to spaces, since one input
//!   line must produce exactly one output line
//! - An exchange dropped between writing its line and reading the answer
//!   (aborted or panicked) leaves the channel out of sync; every later
//!   exchange fails with an I/O error instead of reading a stale answer

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::ExchangeError;

type PipeWriter = Box<dyn AsyncWrite + Send + Unpin>;
type PipeReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;

/// Exclusive owner of the analyzer's input and output streams.
pub struct PipeChannel {
    writer: PipeWriter,
    reader: PipeReader,
    exchanges: u64,
    /// Set while a line is written but its answer not yet read.
    pending: bool,
}

impl PipeChannel {
    /// Wrap the write end (analyzer input) and read end (analyzer output).
    pub fn new<W, R>(writer: W, reader: R) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            writer: Box::new(writer),
            reader: BufReader::new(Box::new(reader)),
            exchanges: 0,
            pending: false,
        }
    }

    /// Submit one line and wait for the analyzer's answer.
    ///
    /// Fails with [`ExchangeError::EmptyInput`] before any I/O when `line` is
    /// empty, and with [`ExchangeError::Io`] when the pipe breaks, the
    /// analyzer closes its output, or the answer is not valid UTF-8.
    pub async fn exchange(&mut self, line: &str) -> Result<String, ExchangeError> {
        if line.is_empty() {
            return Err(ExchangeError::EmptyInput);
        }

        if self.pending {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "analyzer output out of sync after an interrupted exchange",
            )
            .into());
        }

        let mut framed = flatten_line(line);
        framed.push('\n');
        self.pending = true;
        self.writer.write_all(framed.as_bytes()).await?;
        self.writer.flush().await?;

        let mut buf = Vec::new();
        let read = self.reader.read_until(b'\n', &mut buf).await?;
        if read == 0 || buf.last() != Some(&b'\n') {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "analyzer closed its output",
            )
            .into());
        }

        self.pending = false;
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        self.exchanges += 1;
        String::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
    }

    /// Number of answer lines consumed from the analyzer so far.
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    /// False once an exchange was interrupted mid-flight.
    pub fn is_in_sync(&self) -> bool {
        !self.pending
    }
}

impl std::fmt::Debug for PipeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeChannel")
            .field("exchanges", &self.exchanges)
            .field("in_sync", &!self.pending)
            .finish_non_exhaustive()
    }
}

fn flatten_line(line: &str) -> String {
    line.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
