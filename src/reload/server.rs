//! WebSocket server broadcasting reload notifications.

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::{core::is_shutdown, debug, log};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Text frame that tells the client to reload.
pub const RELOAD_MESSAGE: &str = "reload";

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Accepts live reload clients and broadcasts to them.
pub struct ReloadServer {
    clients: Clients,
    port: u16,
}

impl ReloadServer {
    /// Bind on `base_port` (or the next free port) and accept clients on a
    /// background thread.
    pub fn start(base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        if port != base_port {
            log!("reload"; "port {} in use, using {} instead", base_port, port);
        }

        let clients: Clients = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::clone(&clients);
        std::thread::spawn(move || accept_loop(&listener, &accepted));

        Ok(Self { clients, port })
    }

    /// Port the server actually listens on.
    pub fn port(&self) -> u16 {
        self.port
    }

    #[cfg(test)]
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Tell every connected browser to reload. Dead clients are dropped.
    pub fn broadcast_reload(&self) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            debug!("reload"; "no clients connected");
            return;
        }

        let msg = Message::Text(RELOAD_MESSAGE.into());
        clients.retain_mut(|ws| match ws.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "broadcast to {} clients", clients.len());
    }
}

fn accept_loop(listener: &TcpListener, clients: &Clients) {
    while !is_shutdown() {
        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("reload"; "client connected: {}", addr);
                // Blocking mode for the handshake and writes
                let _ = stream.set_nonblocking(false);
                match tungstenite::accept(stream) {
                    Ok(ws) => clients.lock().push(ws),
                    Err(e) => debug!("reload"; "handshake failed: {}", e),
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                log!("reload"; "accept error: {}", e);
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }

    for mut ws in clients.lock().drain(..) {
        let _ = ws.close(None);
    }
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_skips_taken_port() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        match try_bind_port(port, 3) {
            Ok((_, actual)) => assert_ne!(actual, port),
            // neighbouring ports may be taken on a busy machine
            Err(e) => assert!(e.to_string().contains("after 3 attempts")),
        }
    }

    #[test]
    fn test_client_receives_reload() {
        let server = ReloadServer::start(45_729).unwrap();
        let url = format!("ws://127.0.0.1:{}/", server.port());
        let (mut client, _) = tungstenite::connect(url).unwrap();

        for _ in 0..50 {
            if server.client_count() == 1 {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        assert_eq!(server.client_count(), 1);

        server.broadcast_reload();
        let msg = client.read().unwrap();
        assert_eq!(msg, Message::Text(RELOAD_MESSAGE.into()));
    }
}
