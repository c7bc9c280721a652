use std::{fs, io, os::unix::net::UnixDatagram, path::PathBuf, str};

use meleevo_state::RawEvent;

/// The event stream failed in a way the episode cannot recover from.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EventStreamError {
    /// The producer closed the stream before the episode finished.
    #[display("event stream closed by producer")]
    Closed,
    #[display("event stream I/O failure: {_0}")]
    Io(io::Error),
}

/// Source of game-state change events, polled once per scheduling tick.
///
/// `poll` never blocks: it returns `Ok(None)` when nothing new has arrived
/// since the last call. Events are surfaced in production order and must be
/// applied in that order.
pub trait EventSource {
    fn poll(&mut self) -> Result<Option<RawEvent>, EventStreamError>;
}

/// Non-blocking receiver for Dolphin's MemoryWatcher datagrams.
///
/// Dolphin sends one datagram per changed address, payload
/// `"<address>\n<value>\0"` with both fields in hex. The socket file is
/// created on bind (replacing any stale one from a previous run) and removed
/// again on drop, so each generation gets a fresh channel.
#[derive(Debug)]
pub struct MemoryWatcher {
    socket: UnixDatagram,
    path: PathBuf,
}

impl MemoryWatcher {
    pub fn bind(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        if path.exists() {
            fs::remove_file(&path)?;
        }
        let socket = UnixDatagram::bind(&path)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, path })
    }
}

impl EventSource for MemoryWatcher {
    fn poll(&mut self) -> Result<Option<RawEvent>, EventStreamError> {
        let mut buf = [0u8; 1024];
        match self.socket.recv(&mut buf) {
            Ok(received) => match parse_datagram(&buf[..received]) {
                Some(event) => Ok(Some(event)),
                None => {
                    log::warn!("skipping malformed watcher datagram ({received} bytes)");
                    Ok(None)
                }
            },
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(EventStreamError::Io(err)),
        }
    }
}

impl Drop for MemoryWatcher {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Decodes one watcher datagram into an event.
///
/// Returns `None` for payloads that are not two newline-separated fields;
/// those are skipped without advancing the game state.
fn parse_datagram(payload: &[u8]) -> Option<RawEvent> {
    let text = str::from_utf8(payload).ok()?;
    let text = text.trim_end_matches('\0');
    let (address, value) = text.split_once('\n')?;
    let value = value.trim_end_matches('\n');
    if address.is_empty() || value.is_empty() {
        return None;
    }
    Some(RawEvent::new(address, value))
}
