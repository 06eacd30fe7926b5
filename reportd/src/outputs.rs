use std::io;
use std::net::UdpSocket;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Downstream sink for encoded report frames.
pub trait OutputLink {
    /// Short name for diagnostics.
    fn label(&self) -> &str;
    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()>;
}

/// Shared handle to a sink. The report cycle only holds these weakly; the
/// host owns the links.
pub type SharedOutputLink = Arc<Mutex<dyn OutputLink + Send>>;

#[derive(Debug, Error)]
pub enum OutputSpecError {
    #[error("unsupported output spec `{0}`, expected udp:HOST:PORT")]
    Unsupported(String),
    #[error("failed to set up udp output `{spec}`")]
    Udp {
        spec: String,
        #[source]
        source: io::Error,
    },
}

/// Sink sending one datagram per frame.
pub struct UdpLink {
    label: String,
    socket: UdpSocket,
}

impl UdpLink {
    /// `addr` is `HOST:PORT`. The socket is connected up front so writes are
    /// a plain `send`.
    pub fn new(addr: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(addr)?;
        Ok(Self {
            label: format!("udp:{addr}"),
            socket,
        })
    }
}

impl OutputLink for UdpLink {
    fn label(&self) -> &str {
        &self.label
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.socket.send(frame)?;
        Ok(())
    }
}

/// Open the link described by a `--out` spec.
pub fn open_output(spec: &str) -> Result<SharedOutputLink, OutputSpecError> {
    match spec.split_once(':') {
        Some(("udp", addr)) => {
            let link = UdpLink::new(addr).map_err(|source| OutputSpecError::Udp {
                spec: spec.to_owned(),
                source,
            })?;
            Ok(Arc::new(Mutex::new(link)))
        }
        _ => Err(OutputSpecError::Unsupported(spec.to_owned())),
    }
}
