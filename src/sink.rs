//! Output destinations.
//!
//! The bar only needs two capabilities from where it draws: accept text, and say whether
//! it is an interactive terminal. [`Sink`] captures exactly that.
//!
//! * [`StreamSink`] wraps any [`std::io::Write`] (standard error by default). Terminal
//!   detection uses [`IsTerminal`] for the standard streams and can be overridden for
//!   anything else.
//! * [`MemorySink`] collects output in memory, handy for tests and for embedding the
//!   bar's text elsewhere.

use std::{
    io::{self, IsTerminal, Stderr, Stdout, Write},
    sync::Arc,
};

use parking_lot::Mutex;

/// A destination for rendered lines.
pub trait Sink: Send + 'static {
    /// Writes `text` verbatim.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying destination. The bar drops the frame and
    /// carries on.
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Returns `true` if the destination is an interactive terminal. Bars drawing to a
    /// non-terminal stay silent.
    fn is_terminal(&self) -> bool;
}

/// A [`Sink`] over any [`Write`] implementation.
#[derive(Debug)]
pub struct StreamSink<W> {
    inner: W,
    tty: bool,
}

impl<W: Write + IsTerminal> StreamSink<W> {
    /// Wraps `inner`, detecting whether it is a terminal.
    pub fn new(inner: W) -> Self {
        let tty = inner.is_terminal();
        Self { inner, tty }
    }
}

impl StreamSink<Stderr> {
    /// Standard error, the default destination.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl StreamSink<Stdout> {
    /// Standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> StreamSink<W> {
    /// Wraps `inner` with an explicit terminal flag.
    pub const fn with_terminal(inner: W, tty: bool) -> Self {
        Self { inner, tty }
    }

    /// Consumes the sink, returning the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send + 'static> Sink for StreamSink<W> {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.inner.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn is_terminal(&self) -> bool {
        self.tty
    }
}

/// A cloneable in-memory [`Sink`]. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
    tty: bool,
}

impl MemorySink {
    /// A buffer that reports itself as a terminal, so bars draw into it.
    #[must_use]
    pub fn terminal() -> Self {
        Self {
            buffer: Arc::default(),
            tty: true,
        }
    }

    /// A buffer that reports itself as piped, so bars stay silent.
    #[must_use]
    pub fn piped() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    #[must_use]
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Empties the buffer.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.buffer.lock().push_str(text);
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.tty
    }
}
