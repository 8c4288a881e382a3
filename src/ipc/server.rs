//! Unix domain socket server for IPC
//!
//! Request-response communication plus push notifications: subscribed
//! clients receive every composer event as it happens (mode changes, live
//! transcript updates, toasts, created notes). Composition commands are
//! forwarded to the composer over its command channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::composer::{ComposerCommand, CompositionMode};
use crate::events::ComposerEvent;

use super::protocol::{ComposerStatus, Notification, Request, Response};

const MAX_FRAME_LEN: usize = 1024 * 1024;

/// IPC Server handling client connections
pub struct Server {
    socket_path: PathBuf,
    listener: Option<UnixListener>,
    state: Arc<RwLock<ServerState>>,
    /// Channel for forwarding composition commands to the composer
    command_tx: mpsc::Sender<ComposerCommand>,
    /// Handle used to open one event subscription per subscribed client
    event_tx: broadcast::Sender<ComposerEvent>,
    shutdown_tx: broadcast::Sender<()>,
}

/// Shared server state
struct ServerState {
    status: ComposerStatus,
    start_time: std::time::Instant,
}

impl Server {
    /// Create a new IPC server
    pub fn new(
        socket_path: &Path,
        command_tx: mpsc::Sender<ComposerCommand>,
        event_tx: broadcast::Sender<ComposerEvent>,
        dictation_available: bool,
    ) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }

        // Remove stale socket if it exists
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Set socket permissions to owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let status = ComposerStatus {
            dictation_available,
            ..ComposerStatus::default()
        };
        let state = Arc::new(RwLock::new(ServerState {
            status,
            start_time: std::time::Instant::now(),
        }));

        info!(?socket_path, "IPC server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener: Some(listener),
            state,
            command_tx,
            event_tx,
            shutdown_tx,
        })
    }

    /// Track a composer event so status queries reflect the current mode
    pub async fn apply_event(&self, event: &ComposerEvent) {
        if let ComposerEvent::ModeChanged { to, .. } = event {
            let mut state = self.state.write().await;
            state.status.mode = *to;
            state.status.recording = *to == CompositionMode::Recording;
            debug!(mode = %to, "status updated");
        }
    }

    /// Run the server, accepting connections
    pub async fn run(&self) -> Result<()> {
        let listener = self.listener.as_ref().context("server not initialized")?;

        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("client connected");
                    let state = Arc::clone(&self.state);
                    let command_tx = self.command_tx.clone();
                    let event_tx = self.event_tx.clone();
                    let mut shutdown_rx = self.shutdown_tx.subscribe();

                    tokio::spawn(async move {
                        tokio::select! {
                            result = Self::handle_client(stream, state, command_tx, event_tx) => {
                                if let Err(e) = result {
                                    warn!(?e, "client handler error");
                                }
                            }
                            _ = shutdown_rx.recv() => {
                                debug!("client handler shutting down");
                            }
                        }
                    });
                }
                Err(e) => {
                    error!(?e, "accept error");
                }
            }
        }
    }

    /// Handle a single client connection
    ///
    /// The read half processes requests; a writer task serializes everything
    /// the client sees (responses and notifications) onto one outbound queue
    /// so pushed events never interleave with a response frame.
    async fn handle_client(
        stream: UnixStream,
        state: Arc<RwLock<ServerState>>,
        command_tx: mpsc::Sender<ComposerCommand>,
        event_tx: broadcast::Sender<ComposerEvent>,
    ) -> Result<()> {
        let (mut reader, writer) = stream.into_split();
        let (out_tx, out_rx) = mpsc::channel::<Vec<u8>>(32);

        tokio::spawn(Self::write_frames(writer, out_rx));

        let mut subscribed = false;
        let mut len_buf = [0u8; 4];

        loop {
            // Read message length (4-byte little-endian)
            match reader.read_exact(&mut len_buf).await {
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    debug!("client disconnected");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len > MAX_FRAME_LEN {
                warn!(len, "message too large, disconnecting");
                return Ok(());
            }

            // Read message body
            let mut msg_buf = vec![0u8; len];
            reader.read_exact(&mut msg_buf).await?;

            // Parse request
            let request: Request =
                serde_json::from_slice(&msg_buf).context("failed to parse request")?;

            debug!(?request, "received request");

            // Process request
            let (response, subscribe) = Self::process_request(request, &state, &command_tx).await;
            if subscribe && !subscribed {
                subscribed = true;
                tokio::spawn(Self::forward_events(event_tx.subscribe(), out_tx.clone()));
                debug!("client subscribed to notifications");
            }

            // Queue response
            if out_tx.send(encode_frame(&response)?).await.is_err() {
                debug!("client writer gone");
                return Ok(());
            }
        }
    }

    /// Drain the outbound queue into the socket
    async fn write_frames(mut writer: OwnedWriteHalf, mut out_rx: mpsc::Receiver<Vec<u8>>) {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = writer.write_all(&frame).await {
                debug!(?e, "client write failed");
                break;
            }
        }
    }

    /// Forward composer events to a subscribed client's outbound queue
    async fn forward_events(
        mut events: broadcast::Receiver<ComposerEvent>,
        out_tx: mpsc::Sender<Vec<u8>>,
    ) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let frame = match encode_frame(&Notification::Event(event)) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(?e, "failed to encode notification");
                            continue;
                        }
                    };
                    if out_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "client notification stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Process a request and return a response
    /// Returns (Response, should_subscribe)
    async fn process_request(
        request: Request,
        state: &Arc<RwLock<ServerState>>,
        command_tx: &mpsc::Sender<ComposerCommand>,
    ) -> (Response, bool) {
        match request {
            Request::Ping => (Response::Pong, false),

            Request::GetStatus => {
                let mut state = state.write().await;
                state.status.uptime_secs = state.start_time.elapsed().as_secs();
                (Response::Status(state.status.clone()), false)
            }

            Request::Subscribe => (Response::Subscribed, true),

            other => match other.to_command() {
                Some(command) => {
                    debug!(?command, "forwarding command to composer");
                    match command_tx.send(command).await {
                        Ok(()) => (Response::Accepted, false),
                        Err(_) => (
                            Response::Error {
                                code: "composer_unavailable".to_string(),
                                message: "composer is not running".to_string(),
                            },
                            false,
                        ),
                    }
                }
                None => (
                    Response::Error {
                        code: "unsupported".to_string(),
                        message: "unsupported request".to_string(),
                    },
                    false,
                ),
            },
        }
    }

    /// Gracefully shutdown the server
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        // Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(?e, "failed to remove socket file");
            }
        }

        info!("IPC server shutdown complete");
    }
}

/// Encode a length-prefixed JSON frame
fn encode_frame<T: serde::Serialize>(msg: &T) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(msg)?;
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn test_state() -> Arc<RwLock<ServerState>> {
        Arc::new(RwLock::new(ServerState {
            status: ComposerStatus::default(),
            start_time: Instant::now(),
        }))
    }

    #[tokio::test]
    async fn ping_gets_pong() {
        let (command_tx, _command_rx) = mpsc::channel(4);
        let (response, subscribe) =
            Server::process_request(Request::Ping, &test_state(), &command_tx).await;
        assert!(matches!(response, Response::Pong));
        assert!(!subscribe);
    }

    #[tokio::test]
    async fn subscribe_is_flagged() {
        let (command_tx, _command_rx) = mpsc::channel(4);
        let (response, subscribe) =
            Server::process_request(Request::Subscribe, &test_state(), &command_tx).await;
        assert!(matches!(response, Response::Subscribed));
        assert!(subscribe);
    }

    #[tokio::test]
    async fn composition_requests_are_forwarded() {
        let (command_tx, mut command_rx) = mpsc::channel(4);
        let (response, _) =
            Server::process_request(Request::Submit, &test_state(), &command_tx).await;
        assert!(matches!(response, Response::Accepted));
        assert_eq!(command_rx.recv().await, Some(ComposerCommand::Submit));
    }

    #[tokio::test]
    async fn forwarding_fails_when_composer_is_gone() {
        let (command_tx, command_rx) = mpsc::channel(4);
        drop(command_rx);
        let (response, _) =
            Server::process_request(Request::StartRecording, &test_state(), &command_tx).await;
        assert!(matches!(response, Response::Error { .. }));
    }

    #[test]
    fn frames_are_length_prefixed() {
        let frame = encode_frame(&Response::Pong).unwrap();
        let len = u32::from_le_bytes(frame[..4].try_into().unwrap()) as usize;
        assert_eq!(len, frame.len() - 4);

        let decoded: Response = serde_json::from_slice(&frame[4..]).unwrap();
        assert!(matches!(decoded, Response::Pong));
    }
}
