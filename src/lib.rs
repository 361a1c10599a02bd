pub mod api;
pub mod config;
pub mod core;

pub use crate::config::PipelineConfig;
pub use crate::core::error::{PipelineError, Result};

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Copies every log line to stderr and a log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Installs the `env_logger` backend. `RUST_LOG` wins over `debug`; with a
/// `log_file` the output is appended there as well as to stderr. Calling it
/// twice is harmless.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> io::Result<()> {
    let level = if debug { "debug" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
    }

    let _ = builder.try_init();
    Ok(())
}
