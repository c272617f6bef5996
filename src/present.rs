//! Presentation sinks
//!
//! Every emitted signal is logged by the poll loop. Sinks registered on the
//! loop additionally receive each signal, e.g. to print a colored line.

use std::io::{self, Write};

use crate::color::colorize;
use crate::signal::Signal;

/// Destination for emitted signals
pub trait SignalSink: Send {
    /// Write one signal. An error aborts the remainder of the current cycle.
    fn write(&mut self, signal: &Signal) -> io::Result<()>;
}

/// Prints signal messages, optionally wrapped in the signal's ANSI color
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    use_color: bool,
}

impl ConsoleSink<io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout(use_color: bool) -> Self {
        Self::new(io::stdout(), use_color)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> SignalSink for ConsoleSink<W> {
    fn write(&mut self, signal: &Signal) -> io::Result<()> {
        writeln!(
            self.out,
            "{}",
            colorize(&signal.message, signal.color, self.use_color)
        )?;
        self.out.flush()
    }
}
