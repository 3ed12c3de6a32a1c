use std::{
    fs::File,
    io::{LineWriter, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use eyre::Context;

use super::{LogSink, LoggerError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct FileSink {
    file: Mutex<Option<LineWriter<File>>>,
    file_path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

        Ok(Self {
            file: Mutex::new(Some(LineWriter::new(file))),
            file_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl LogSink for FileSink {
    fn write(&self, text: &str) -> eyre::Result<()> {
        let mut file = lock(&self.file);
        let file = file.as_mut().ok_or(LoggerError::SinkClosed)?;

        file.write_all(text.as_bytes())?;
        file.flush().context("Can't flush file")
    }

    fn flush(&self) {
        if let Some(file) = lock(&self.file).as_mut() {
            let _ = file.flush();
        }
    }

    fn is_closable(&self) -> bool {
        true
    }

    fn close(&self) -> eyre::Result<()> {
        match lock(&self.file).take() {
            Some(mut file) => file.flush().context("Can't flush file on close"),
            None => Ok(()),
        }
    }
}

pub struct StderrSink {
    handle: std::io::Stderr,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            handle: std::io::stderr(),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write(&self, text: &str) -> eyre::Result<()> {
        let mut writer = self.handle.lock();

        writer.write_all(text.as_bytes())?;
        writer.flush().context("Can't flush stderr")
    }

    fn flush(&self) {
        let _ = self.handle.lock().flush();
    }
}

pub struct StdoutSink {
    handle: std::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            handle: std::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write(&self, text: &str) -> eyre::Result<()> {
        let mut writer = self.handle.lock();

        writer.write_all(text.as_bytes())?;
        writer.flush().context("Can't flush stdout")
    }

    fn flush(&self) {
        let _ = self.handle.lock().flush();
    }
}

/// Adapts any `io::Write` into a sink.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write(&self, text: &str) -> eyre::Result<()> {
        lock(&self.writer)
            .write_all(text.as_bytes())
            .context("Failed writing to log writer")
    }

    fn flush(&self) {
        let _ = lock(&self.writer).flush();
    }
}

/// In-memory buffer sink. Closing it is observable, writes after close fail.
#[derive(Default)]
pub struct MemorySink {
    buf: Mutex<String>,
    closed: Mutex<bool>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        lock(&self.buf).clone()
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.buf).lines().map(str::to_string).collect()
    }

    pub fn is_closed(&self) -> bool {
        *lock(&self.closed)
    }
}

impl LogSink for MemorySink {
    fn write(&self, text: &str) -> eyre::Result<()> {
        if self.is_closed() {
            return Err(LoggerError::SinkClosed.into());
        }
        lock(&self.buf).push_str(text);
        Ok(())
    }

    fn is_closable(&self) -> bool {
        true
    }

    fn close(&self) -> eyre::Result<()> {
        *lock(&self.closed) = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct NullSink {}

impl NullSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl LogSink for NullSink {
    fn write(&self, _text: &str) -> eyre::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_and_rejects_writes_after_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");

        let sink = FileSink::new(&path).unwrap();
        sink.write("one\n").unwrap();
        sink.write("two\n").unwrap();
        assert!(sink.is_closable());
        sink.close().unwrap();

        let err = sink.write("three\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoggerError>(),
            Some(&LoggerError::SinkClosed)
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");

        // Reopening appends rather than truncating.
        let sink = FileSink::new(&path).unwrap();
        sink.write("four\n").unwrap();
        assert_eq!(std::fs::read_to_string(sink.path()).unwrap(), "one\ntwo\nfour\n");
    }

    #[test]
    fn file_sink_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileSink::new(dir.path().join("missing").join("app.log"));
        assert!(result.is_err());
    }

    #[test]
    fn writer_sink_forwards_bytes() {
        let sink = WriterSink::new(Vec::new());
        sink.write("abc\n").unwrap();
        assert!(!sink.is_closable());
        assert_eq!(sink.into_inner(), b"abc\n");
    }

    #[test]
    fn memory_sink_records_close() {
        let sink = MemorySink::new();
        sink.write("a\nb\n").unwrap();
        assert_eq!(sink.lines(), vec!["a", "b"]);

        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(sink.write("c\n").is_err());
        assert_eq!(sink.contents(), "a\nb\n");
    }
}
