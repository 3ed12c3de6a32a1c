use std::sync::Mutex;

/// How a logger ends the process after a fatal message.
pub trait Terminate: Sync + Send {
    fn terminate(&self, code: i32);
}

/// Exits the real process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Terminate for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code)
    }
}

/// Records requested exit codes instead of exiting. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn codes(&self) -> Vec<i32> {
        self.codes
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }
}

impl Terminate for RecordingTerminator {
    fn terminate(&self, code: i32) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.push(code);
        }
    }
}
