use std::{
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use eyre::Context;

use super::{
    formatters::DefaultFormatter,
    logger::Config,
    terminate::{ProcessExit, Terminate},
    Callsite, Emit, LogFormatter, LogSink, LoggerError, Record, Severity,
};

/// Lines handed to the worker without waiting. Zero makes every write a
/// rendezvous, so producers block while the worker is busy with the sink.
const QUEUE_CAPACITY: usize = 0;

enum Command {
    Write(String),
    /// Answered once every line queued before it has been written.
    Sync(mpsc::Sender<()>),
}

/// Logger that serialises all writes through a single background worker.
///
/// Producers format and enqueue; the worker is the only thread that ever writes
/// to the sink.
pub struct QueuedLogger {
    name: String,
    tx: Mutex<Option<mpsc::SyncSender<Command>>>,
    sink: Arc<dyn LogSink>,
    formatter: Box<dyn LogFormatter>,
    terminator: Arc<dyn Terminate>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedLogger {
    /// Starts a worker writing to `sink`. Fails for an empty `name`.
    pub fn create(name: impl Into<String>, sink: Arc<dyn LogSink>) -> eyre::Result<Self> {
        Self::with_terminator(name, sink, Arc::new(ProcessExit))
    }

    pub fn with_terminator(
        name: impl Into<String>,
        sink: Arc<dyn LogSink>,
        terminator: Arc<dyn Terminate>,
    ) -> eyre::Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LoggerError::EmptyName.into());
        }

        let (tx, rx) = mpsc::sync_channel::<Command>(QUEUE_CAPACITY);
        let worker_sink = sink.clone();

        let worker = thread::Builder::new()
            .name(format!("{}-logger", name))
            .spawn(move || run(rx, worker_sink))
            .context("Failed spawning logger worker")?;

        Ok(Self {
            name,
            tx: Mutex::new(Some(tx)),
            sink,
            formatter: Box::new(DefaultFormatter::new(Config::new())),
            terminator,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, command: Command) -> eyre::Result<()> {
        let tx = self
            .tx
            .lock()
            .map_err(|e| eyre::eyre!(e.to_string()))?
            .clone()
            .ok_or(LoggerError::WorkerGone)?;

        tx.send(command).map_err(|_| LoggerError::WorkerGone.into())
    }

    /// Blocks until everything queued so far has reached the sink.
    pub fn sync(&self) -> eyre::Result<()> {
        let (done_tx, done_rx) = mpsc::channel();
        self.send(Command::Sync(done_tx))?;
        done_rx.recv().map_err(|_| LoggerError::WorkerGone.into())
    }

    /// Stops the worker once it drained the queue. Later messages are dropped.
    pub fn stop(&self) {
        if let Ok(mut tx) = self.tx.lock() {
            tx.take();
        }
        let worker = self.worker.lock().ok().and_then(|mut worker| worker.take());
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

fn run(rx: mpsc::Receiver<Command>, sink: Arc<dyn LogSink>) {
    while let Ok(command) = rx.recv() {
        match command {
            Command::Write(line) => {
                let _ = sink.write(&line);
            }
            Command::Sync(done) => {
                sink.flush();
                let _ = done.send(());
            }
        }
    }

    sink.flush();
}

impl Emit for QueuedLogger {
    fn emit(&self, severity: Severity, message: String, callsite: Callsite) {
        let mut line = self.formatter.format(&Record {
            severity,
            message: &message,
            callsite,
        });
        line.push('\n');

        let _ = self.send(Command::Write(line));
    }

    fn shutdown(&self) {
        let _ = self.sync();
        self.stop();
        if self.sink.is_closable() {
            let _ = self.sink.close();
        }
        self.terminator.terminate(1);
    }
}

impl Drop for QueuedLogger {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::logging::{MemorySink, RecordingTerminator};

    #[test]
    fn empty_name_is_rejected() {
        let err = QueuedLogger::create("", Arc::new(MemorySink::new()))
            .err()
            .unwrap();
        assert_eq!(
            err.downcast_ref::<LoggerError>(),
            Some(&LoggerError::EmptyName)
        );
    }

    #[test]
    fn worker_writes_lines_in_order() {
        let sink = Arc::new(MemorySink::new());
        let logger = QueuedLogger::create("svc", sink.clone()).unwrap();

        logger.info(&[&"one"]);
        logger.error_formatted(format_args!("two {}", 2));
        logger.info_line(&[&"three"]);
        logger.sync().unwrap();

        let out = sink.contents();
        let lines: Vec<_> = out.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("INFO : ") && lines[0].ends_with(": one"));
        assert!(lines[1].starts_with("ERROR: ") && lines[1].ends_with(": two 2"));
        assert!(out.ends_with(": three\n\n"));
    }

    #[test]
    fn stop_drains_the_queue() {
        let sink = Arc::new(MemorySink::new());
        let logger = QueuedLogger::create("svc", sink.clone()).unwrap();

        for i in 0..50 {
            logger.info_formatted(format_args!("m{}", i));
        }
        logger.stop();

        assert_eq!(sink.lines().len(), 50);
        assert!(logger.sync().is_err());
    }

    #[test]
    fn fatal_writes_before_closing_and_exits() {
        let sink = Arc::new(MemorySink::new());
        let terminator = Arc::new(RecordingTerminator::new());
        let logger =
            QueuedLogger::with_terminator("svc", sink.clone(), terminator.clone()).unwrap();

        logger.info(&[&"before"]);
        logger.fatal(&[&"the end"]);

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("FATAL: ") && lines[1].ends_with(": the end"));
        assert!(sink.is_closed());
        assert_eq!(terminator.codes(), vec![1]);
    }

    /// Sink whose writes wait until the gate is opened by dropping its sender.
    struct GatedSink {
        gate: Mutex<mpsc::Receiver<()>>,
        entered: Mutex<mpsc::Sender<()>>,
        writes: Mutex<usize>,
    }

    impl LogSink for GatedSink {
        fn write(&self, _text: &str) -> eyre::Result<()> {
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.gate.lock().unwrap().recv();
            *self.writes.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    fn producers_block_while_the_worker_is_busy() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let (entered_tx, entered_rx) = mpsc::channel();
        let sink = Arc::new(GatedSink {
            gate: Mutex::new(gate_rx),
            entered: Mutex::new(entered_tx),
            writes: Mutex::new(0),
        });
        let logger = Arc::new(QueuedLogger::create("svc", sink.clone()).unwrap());

        let (done_tx, done_rx) = mpsc::channel();
        let producer = {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..3 {
                    logger.info_formatted(format_args!("m{}", i));
                }
                done_tx.send(()).unwrap();
            })
        };

        entered_rx.recv().unwrap();
        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

        drop(gate_tx);
        done_rx.recv().unwrap();
        producer.join().unwrap();
        logger.sync().unwrap();

        assert_eq!(*sink.writes.lock().unwrap(), 3);
    }

    #[test]
    fn concurrent_producers_are_serialised() {
        let sink = Arc::new(MemorySink::new());
        let logger = Arc::new(QueuedLogger::create("svc", sink.clone()).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let logger = logger.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        logger.info_formatted(format_args!("t{} m{}", t, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        logger.sync().unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 400);
        assert!(lines.iter().all(|l| l.starts_with("INFO : ")));
    }
}
