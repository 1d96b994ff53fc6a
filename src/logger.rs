// Licensed under the Apache-2.0 license

//! Logging seam for the slave driver.
//!
//! Driver types take a `L: Logger = NoOpLogger` parameter; the default
//! compiles all log points away. [`WriteLogger`] adapts any
//! `embedded_io::Write` sink, typically a UART.

/// Sink for driver log lines.
pub trait Logger {
    fn log(&mut self, args: core::fmt::Arguments<'_>);
}

/// Logger that discards everything. The default for driver types.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _args: core::fmt::Arguments<'_>) {}
}

/// Logger writing one line per record to an `embedded_io::Write` sink.
///
/// Write errors are swallowed; logging must never disturb the driver.
pub struct WriteLogger<W: embedded_io::Write> {
    sink: W,
}

impl<W: embedded_io::Write> WriteLogger<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Give the sink back, consuming the logger.
    pub fn release(self) -> W {
        self.sink
    }
}

impl<W: embedded_io::Write> Logger for WriteLogger<W> {
    fn log(&mut self, args: core::fmt::Arguments<'_>) {
        let _ = self.sink.write_fmt(args);
        let _ = self.sink.write_all(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        data: Vec<u8>,
    }

    impl embedded_io::ErrorType for Recorder {
        type Error = core::convert::Infallible;
    }

    impl embedded_io::Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_write_logger_appends_line_ending() {
        let mut logger = WriteLogger::new(Recorder { data: Vec::new() });
        logger.log(format_args!("i2c0: slave enabled at 0x{:02x}", 0x2A));
        let sink = logger.release();
        assert_eq!(sink.data, b"i2c0: slave enabled at 0x2a\r\n");
    }

    #[test]
    fn test_noop_logger_discards() {
        let mut logger = NoOpLogger;
        logger.log(format_args!("dropped"));
    }
}
