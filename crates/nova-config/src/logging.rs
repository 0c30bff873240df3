use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Once, OnceLock};

use parking_lot::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;

use crate::LoggingConfig;

/// Ring buffer of formatted log lines.
#[derive(Debug)]
pub struct LogBuffer {
    capacity: usize,
    inner: Mutex<VecDeque<String>>,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(8_192))),
        }
    }

    pub fn push_line(&self, line: String) {
        let mut inner = self.inner.lock();
        if inner.len() == self.capacity {
            inner.pop_front();
        }
        inner.push_back(line);
    }

    pub fn last_lines(&self, n: usize) -> Vec<String> {
        let inner = self.inner.lock();
        inner.iter().rev().take(n).cloned().rev().collect()
    }
}

struct LogBufferMakeWriter {
    buffer: Arc<LogBuffer>,
}

impl<'a> MakeWriter<'a> for LogBufferMakeWriter {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter {
            buffer: self.buffer.clone(),
            bytes: Vec::new(),
        }
    }
}

/// Collects one formatted event and splits it into lines on drop.
struct LogBufferWriter {
    buffer: Arc<LogBuffer>,
    bytes: Vec<u8>,
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogBufferWriter {
    fn drop(&mut self) {
        if self.bytes.is_empty() {
            return;
        }

        let text = String::from_utf8_lossy(&self.bytes);
        for line in text.split_terminator('\n') {
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.buffer.push_line(line.to_owned());
            }
        }
    }
}

struct MutexFileMakeWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl<'a> MakeWriter<'a> for MutexFileMakeWriter {
    type Writer = MutexFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        MutexFileWriter {
            guard: self.file.lock(),
        }
    }
}

struct MutexFileWriter<'a> {
    guard: parking_lot::MutexGuard<'a, std::fs::File>,
}

impl Write for MutexFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.guard.flush()
    }
}

static TRACING_INIT: Once = Once::new();
static GLOBAL_LOG_BUFFER: OnceLock<Arc<LogBuffer>> = OnceLock::new();

pub fn global_log_buffer() -> Arc<LogBuffer> {
    GLOBAL_LOG_BUFFER
        .get_or_init(|| Arc::new(LogBuffer::new(LoggingConfig::default_buffer_lines())))
        .clone()
}

/// Install the global tracing subscriber.
///
/// Events always land in the in-memory [`LogBuffer`]; stderr and file sinks
/// are added according to `config`. Safe to call multiple times; only the
/// first call installs a subscriber.
pub fn init_tracing(config: &LoggingConfig) -> Arc<LogBuffer> {
    let buffer = GLOBAL_LOG_BUFFER
        .get_or_init(|| Arc::new(LogBuffer::new(config.buffer_lines)))
        .clone();

    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config.file.as_ref().and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        let file_open_failed = config.file.is_some() && file.is_none();

        let mut make_writer = BoxMakeWriter::new(LogBufferMakeWriter {
            buffer: buffer.clone(),
        });
        if config.stderr {
            // Test output capture only sees `eprint!`; `TestWriter` goes through it.
            if cfg!(debug_assertions) {
                make_writer = BoxMakeWriter::new(
                    make_writer.and(tracing_subscriber::fmt::writer::TestWriter::with_stderr),
                );
            } else {
                make_writer = BoxMakeWriter::new(make_writer.and(std::io::stderr));
            }
        }
        if let Some(file) = file {
            let file = Arc::new(Mutex::new(file));
            make_writer = BoxMakeWriter::new(make_writer.and(MutexFileMakeWriter { file }));
        }

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() && file_open_failed {
            if let Some(path) = config.file.as_ref() {
                tracing::warn!(
                    target: "nova.config",
                    path = %path.display(),
                    "failed to open log file; file logging disabled"
                );
            }
        }
    });

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(config: &LoggingConfig, emit: impl FnOnce()) -> String {
        let buffer = Arc::new(LogBuffer::new(64));
        let subscriber = tracing_subscriber::registry()
            .with(config.config_env_filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(LogBufferMakeWriter {
                        buffer: buffer.clone(),
                    })
                    .with_ansi(false),
            );
        tracing::subscriber::with_default(subscriber, emit);
        buffer.last_lines(64).join("\n")
    }

    #[test]
    fn logging_level_parses_simple_levels() {
        let config = LoggingConfig {
            level: "DEBUG".to_owned(),
            ..Default::default()
        };
        let text = capture(&config, || {
            tracing::trace!("not visible");
            tracing::debug!("visible");
        });
        assert!(!text.contains("not visible"), "{text}");
        assert!(text.contains("visible"), "{text}");
    }

    #[test]
    fn logging_level_parses_target_directives() {
        let config = LoggingConfig {
            level: "warn,nova.typeck=trace".to_owned(),
            ..Default::default()
        };
        let text = capture(&config, || {
            tracing::trace!(target: "nova.typeck", "typeck trace");
            tracing::info!(target: "nova.classpath", "classpath info");
        });
        assert!(text.contains("typeck trace"), "{text}");
        assert!(!text.contains("classpath info"), "{text}");
    }

    #[test]
    fn log_buffer_keeps_most_recent_lines() {
        let buffer = LogBuffer::new(2);
        for i in 0..3 {
            buffer.push_line(format!("line {i}"));
        }
        assert_eq!(buffer.last_lines(10), vec!["line 1", "line 2"]);
    }
}
