use std::sync::Arc;

use log::LevelFilter;
use multilog::{logging::RecordingTerminator, Builder, MemorySink};

#[test]
fn log_macros_reach_the_default_logger() {
    let primary = Arc::new(MemorySink::new());
    multilog::configure(
        Builder::new("bridge", primary.clone())
            .with_stderr_sink(Arc::new(MemorySink::new()))
            .with_terminator(Arc::new(RecordingTerminator::new())),
    );
    multilog::init_log_bridge(LevelFilter::Info).unwrap();

    log::info!("hello from log");
    log::warn!("warnings count as info");
    log::error!("broken pipe");
    log::debug!("filtered out");

    let lines = primary.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("INFO : ") && lines[0].contains("log_bridge.rs:"));
    assert!(lines[1].starts_with("INFO : ") && lines[1].ends_with("warnings count as info"));
    assert!(lines[2].starts_with("ERROR: ") && lines[2].ends_with("broken pipe"));

    // The bridge can only be installed once per process.
    assert!(multilog::init_log_bridge(LevelFilter::Info).is_err());
}
