//! Native system log backend.
//!
//! On Unix this talks to the local syslog daemon over its datagram socket using the
//! BSD (RFC 3164) message layout. Other platforms report
//! [`LoggerError::PlatformUnsupported`].

use std::sync::Arc;

use super::{LogSink, LoggerError};

/// Info and error channels into the platform system log.
pub struct SystemLogSinks {
    pub info: Arc<dyn LogSink>,
    pub error: Arc<dyn LogSink>,
}

pub trait SystemLog: Sync + Send {
    fn setup(&self, name: &str) -> eyre::Result<SystemLogSinks>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSystemLog;

#[cfg(unix)]
impl SystemLog for NativeSystemLog {
    fn setup(&self, name: &str) -> eyre::Result<SystemLogSinks> {
        let conn = Arc::new(unix::Connection::open()?);

        Ok(SystemLogSinks {
            info: Arc::new(unix::SyslogSink::new(conn.clone(), name, unix::SEVERITY_INFO)),
            error: Arc::new(unix::SyslogSink::new(conn, name, unix::SEVERITY_ERR)),
        })
    }
}

#[cfg(not(unix))]
impl SystemLog for NativeSystemLog {
    fn setup(&self, _name: &str) -> eyre::Result<SystemLogSinks> {
        Err(LoggerError::PlatformUnsupported.into())
    }
}

#[cfg(unix)]
mod unix {
    use std::{
        os::unix::net::UnixDatagram,
        sync::{Arc, Mutex},
    };

    use eyre::Context;

    use super::{LogSink, LoggerError};

    const FACILITY_USER: u8 = 1;
    pub(super) const SEVERITY_ERR: u8 = 3;
    pub(super) const SEVERITY_INFO: u8 = 6;

    const SOCKET_PATHS: [&str; 3] = ["/dev/log", "/var/run/syslog", "/var/run/log"];

    pub(super) struct Connection {
        socket: Mutex<Option<UnixDatagram>>,
    }

    impl Connection {
        pub(super) fn open() -> eyre::Result<Self> {
            let mut last_err = None;

            for path in SOCKET_PATHS {
                let socket = UnixDatagram::unbound().context("Failed creating syslog socket")?;
                match socket.connect(path) {
                    Ok(()) => {
                        return Ok(Self {
                            socket: Mutex::new(Some(socket)),
                        })
                    }
                    Err(err) => last_err = Some(format!("{}: {}", path, err)),
                }
            }

            Err(LoggerError::SystemLogUnavailable(
                last_err.unwrap_or_else(|| "no syslog socket".to_string()),
            )
            .into())
        }

        fn send(&self, datagram: &str) -> eyre::Result<()> {
            let socket = self
                .socket
                .lock()
                .map_err(|e| eyre::eyre!(e.to_string()))?;
            let socket = socket.as_ref().ok_or(LoggerError::SinkClosed)?;

            socket
                .send(datagram.as_bytes())
                .context("Failed sending to syslog")?;
            Ok(())
        }

        fn close(&self) {
            if let Ok(mut socket) = self.socket.lock() {
                socket.take();
            }
        }
    }

    pub(super) struct SyslogSink {
        conn: Arc<Connection>,
        tag: String,
        severity: u8,
    }

    impl SyslogSink {
        pub(super) fn new(conn: Arc<Connection>, tag: &str, severity: u8) -> Self {
            Self {
                conn,
                tag: tag.to_string(),
                severity,
            }
        }

        pub(super) fn datagram(&self, text: &str) -> String {
            let priority = FACILITY_USER * 8 + self.severity;
            let timestamp = chrono::Local::now().format("%b %e %H:%M:%S");

            format!(
                "<{}>{} {}[{}]: {}",
                priority,
                timestamp,
                self.tag,
                std::process::id(),
                text.trim_end_matches('\n'),
            )
        }
    }

    impl LogSink for SyslogSink {
        fn write(&self, text: &str) -> eyre::Result<()> {
            self.conn.send(&self.datagram(text))
        }

        fn is_closable(&self) -> bool {
            true
        }

        fn close(&self) -> eyre::Result<()> {
            self.conn.close();
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn pair() -> (Arc<Connection>, UnixDatagram) {
            let (ours, theirs) = UnixDatagram::pair().unwrap();
            let conn = Arc::new(Connection {
                socket: Mutex::new(Some(ours)),
            });
            (conn, theirs)
        }

        #[test]
        fn datagram_carries_priority_tag_and_pid() {
            let (conn, _peer) = pair();
            let sink = SyslogSink::new(conn, "svc", SEVERITY_ERR);

            let datagram = sink.datagram("disk full\n");

            assert!(datagram.starts_with("<11>"));
            assert!(datagram.ends_with(&format!("svc[{}]: disk full", std::process::id())));
        }

        #[test]
        fn sends_over_socket_until_closed() {
            let (conn, peer) = pair();
            let sink = SyslogSink::new(conn, "svc", SEVERITY_INFO);

            sink.write("hello\n").unwrap();
            let mut buf = [0u8; 512];
            let n = peer.recv(&mut buf).unwrap();
            let got = std::str::from_utf8(&buf[..n]).unwrap();
            assert!(got.starts_with("<14>"));
            assert!(got.ends_with(": hello"));

            sink.close().unwrap();
            assert!(sink.write("late\n").is_err());
        }
    }
}
