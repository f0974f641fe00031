use std::{
    fs,
    io::{self, ErrorKind, Read},
    path::Path,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use log::info;
use serialport::{FlowControl, SerialPort};

/// Non-blocking source of NMEA bytes.
pub trait ByteSource {
    /// Copies whatever is available right now into `output`. `Ok(0)` means "nothing yet".
    fn read_available(&mut self, output: &mut [u8]) -> io::Result<usize>;

    /// Whether no more data will ever come. A serial port never runs dry.
    fn is_finished(&self) -> bool {
        false
    }
}

pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    pub fn open(port: &str, baud: u32) -> Result<Self> {
        let builder = serialport::new(port, baud)
            .timeout(Duration::from_millis(1))
            .flow_control(FlowControl::None);
        info!("Opening {} at {} baud", port, baud);
        let port = builder
            .open()
            .with_context(|| format!("Failed to open port: {}", port))?;
        Ok(Self { port })
    }
}

impl ByteSource for SerialSource {
    /// Reads the serial port, converting timeouts into "no data received"
    fn read_available(&mut self, output: &mut [u8]) -> io::Result<usize> {
        match self.port.read(output) {
            Ok(b) => Ok(b),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

/// Plays back a recorded NMEA log one line at a time.
pub struct ReplaySource {
    data: Vec<u8>,
    pos: usize,
    line_delay: Duration,
    next_line_at: Instant,
}

impl ReplaySource {
    pub fn open(path: &Path, line_delay: Duration) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        info!("Replaying {} ({} bytes)", path.display(), data.len());
        Ok(Self::from_bytes(data, line_delay))
    }

    pub fn from_bytes(data: Vec<u8>, line_delay: Duration) -> Self {
        Self {
            data,
            pos: 0,
            line_delay,
            next_line_at: Instant::now(),
        }
    }
}

impl ByteSource for ReplaySource {
    fn is_finished(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn read_available(&mut self, output: &mut [u8]) -> io::Result<usize> {
        let now = Instant::now();
        if self.is_finished() || now < self.next_line_at {
            return Ok(0);
        }
        let rest = &self.data[self.pos..];
        let line_len = rest
            .iter()
            .position(|b| *b == b'\n')
            .map_or(rest.len(), |pos| pos + 1);
        let n = line_len.min(output.len());
        output[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        if n == line_len {
            self.next_line_at = now + self.line_delay;
        }
        Ok(n)
    }
}
