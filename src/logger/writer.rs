//! Destinations for rendered records

use parking_lot::Mutex;
use std::io::{self, Write};

/// Sink for rendered log text
pub trait LogWriter: Send + Sync {
    fn write(&self, text: &str) -> io::Result<()>;
}

/// Writes to the process standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutWriter;

impl LogWriter for StdoutWriter {
    fn write(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }
}

/// Collects rendered records in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    entries: Mutex<Vec<String>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every text written so far, in order
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl LogWriter for MemoryWriter {
    fn write(&self, text: &str) -> io::Result<()> {
        self.entries.lock().push(text.to_string());
        Ok(())
    }
}
