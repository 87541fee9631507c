//! WebSocket Game Server
//!
//! Accepts WebSocket connections on any path, feeds their events into the
//! shared session, and runs the tick driver next to the accept loop.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument};

use crate::config::ServerConfig;
use crate::network::connection::{ConnectionHandle, Outbound};
use crate::network::driver::TickDriver;
use crate::network::session::{SessionCoordinator, SessionError};

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// The one session every connection joins.
    session: Arc<RwLock<SessionCoordinator>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let session = SessionCoordinator::from_seed(config.rng_seed);

        Self {
            config,
            session: Arc::new(RwLock::new(session)),
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!(
            "Game server v{} listening on {}",
            self.config.version,
            listener.local_addr()?
        );

        let driver = TickDriver::new(self.session.clone(), self.config.tick_period());
        let driver_handle = tokio::spawn(driver.run(self.shutdown_tx.subscribe()));

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("New connection from {}", addr);
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        // Driver listens on the same signal
        let _ = driver_handle.await;

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let session = self.session.clone();
        let buffer = self.config.outbound_buffer;
        let shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            match Self::serve_socket(stream, addr, session, buffer, shutdown_rx).await {
                Ok(()) => {}
                Err(GameServerError::Session(e)) => info!("Client {} turned away: {}", addr, e),
                Err(e) => error!("Connection {} failed: {}", addr, e),
            }
        });
    }

    async fn serve_socket(
        stream: TcpStream,
        addr: SocketAddr,
        session: Arc<RwLock<SessionCoordinator>>,
        buffer: usize,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), GameServerError> {
        let ws_stream = accept_async(stream).await?;
        let (ws_sender, mut ws_receiver) = ws_stream.split();

        let (handle, out_rx) = ConnectionHandle::channel(buffer);
        let id = handle.id();

        let mut writer = spawn_writer(ws_sender, out_rx, addr);

        let slot = session.write().await.on_open(handle)?;
        info!("Client {} connected as player {} ({})", addr, slot, id);

        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            session.write().await.on_message(id, &text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("Client {} disconnected", addr);
                            break;
                        }
                        Some(Err(e)) => {
                            error!("WebSocket error for {}: {}", addr, e);
                            break;
                        }
                        // Binary, ping and pong frames carry nothing for the game
                        Some(Ok(_)) => {}
                    }
                }
                // A dead writer means the socket is unusable
                _ = &mut writer => {
                    debug!("Writer for {} stopped", addr);
                    break;
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }

        session.write().await.on_close(id);
        info!("Client {} cleaned up", addr);

        Ok(())
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Shared session.
    pub fn session(&self) -> Arc<RwLock<SessionCoordinator>> {
        self.session.clone()
    }

    /// Number of players currently holding a slot.
    pub async fn player_count(&self) -> usize {
        self.session.read().await.player_count()
    }
}

/// Drain a connection's outbound queue into its socket.
///
/// Ends when asked to close, when the session drops the handle, or on the
/// first failed send.
fn spawn_writer<S>(
    mut sink: S,
    mut out_rx: mpsc::Receiver<Outbound>,
    addr: SocketAddr,
) -> JoinHandle<()>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: std::fmt::Display,
{
    tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            match frame {
                Outbound::Text(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        error!("Send to {} failed: {}", addr, e);
                        return;
                    }
                }
                Outbound::Close => break,
            }
        }
        let _ = sink.close().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::protocol::ServerMessage;
    use std::time::Duration;
    use tokio::time::timeout;
    use crate::game::state::StateSnapshot;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    fn test_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            rng_seed: Some(7),
            ..Default::default()
        }
    }

    async fn start() -> (Arc<GameServer>, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(GameServer::new(test_config()));

        let s = server.clone();
        tokio::spawn(async move { s.serve(listener).await });

        (server, addr)
    }

    /// First broadcast showing a running round.
    async fn next_running_state(ws: &mut Client) -> StateSnapshot {
        timeout(Duration::from_secs(2), async {
            while let Some(frame) = ws.next().await {
                let Ok(Message::Text(text)) = frame else { continue };
                if let Ok(ServerMessage::State(snapshot)) = ServerMessage::from_json(&text) {
                    if snapshot.running {
                        return snapshot;
                    }
                }
            }
            panic!("connection ended before the round started");
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = GameServer::new(test_config());
        assert_eq!(server.player_count().await, 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn test_two_players_then_full() {
        let (server, addr) = start().await;
        let url = format!("ws://{}/", addr);

        let (mut p1, _) = connect_async(&url).await.unwrap();
        let init = timeout(Duration::from_secs(2), p1.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(init, Message::Text(r#"{"type":"init","player_number":1}"#.to_string()));

        let (mut p2, _) = connect_async(format!("ws://{}/any/path", addr)).await.unwrap();
        let init = timeout(Duration::from_secs(2), p2.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(init, Message::Text(r#"{"type":"init","player_number":2}"#.to_string()));

        // Third connection is closed without any text frame
        let (mut p3, _) = connect_async(&url).await.unwrap();
        let frame = timeout(Duration::from_secs(2), p3.next()).await.unwrap();
        assert!(
            !matches!(frame, Some(Ok(Message::Text(_)))),
            "third client got {:?}",
            frame
        );
        assert_eq!(server.player_count().await, 2);

        // Player 1 starts the round; both see it running
        p1.send(Message::Text(r#"{"type":"start_game"}"#.to_string())).await.unwrap();

        for ws in [&mut p1, &mut p2] {
            let snapshot = next_running_state(ws).await;

            assert!(snapshot.game_started);
            assert_eq!(snapshot.obstacles.len(), 2);
        }

        server.shutdown();
    }

    #[tokio::test]
    async fn test_slot_freed_on_disconnect() {
        let (server, addr) = start().await;
        let url = format!("ws://{}/", addr);

        let (mut p1, _) = connect_async(&url).await.unwrap();
        let _ = timeout(Duration::from_secs(2), p1.next()).await.unwrap();
        assert_eq!(server.player_count().await, 1);

        p1.close(None).await.unwrap();
        drop(p1);

        timeout(Duration::from_secs(2), async {
            while server.player_count().await > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        // A newcomer gets slot 1 again
        let (mut p2, _) = connect_async(&url).await.unwrap();
        let init = timeout(Duration::from_secs(2), p2.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(init, Message::Text(r#"{"type":"init","player_number":1}"#.to_string()));

        let session = server.session();
        assert!(!session.read().await.state().running);
        assert_eq!(session.read().await.player_count(), 1);

        server.shutdown();
    }

    #[tokio::test]
    async fn test_dropped_socket_leaves_other_player_playing() {
        let (server, addr) = start().await;
        let url = format!("ws://{}/", addr);

        let (mut p1, _) = connect_async(&url).await.unwrap();
        let _ = timeout(Duration::from_secs(2), p1.next()).await.unwrap();
        let (mut p2, _) = connect_async(&url).await.unwrap();
        let init = timeout(Duration::from_secs(2), p2.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(init, Message::Text(r#"{"type":"init","player_number":2}"#.to_string()));

        // Tear down the TCP stream without a close handshake
        drop(p1);

        timeout(Duration::from_secs(2), async {
            while server.player_count().await > 1 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        p2.send(Message::Text(r#"{"type":"start_game"}"#.to_string())).await.unwrap();

        let snapshot = next_running_state(&mut p2).await;

        assert!(snapshot.game_started);
        assert_eq!(server.player_count().await, 1);

        server.shutdown();
    }

    #[tokio::test]
    async fn test_writer_stops_on_failed_send() {
        let failing = Box::pin(futures_util::sink::unfold((), |(), _msg: Message| async {
            Err::<(), _>(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
        }));
        let (handle, out_rx) = ConnectionHandle::channel(4);
        let writer = spawn_writer(failing, out_rx, "127.0.0.1:1".parse().unwrap());

        handle.send("frame").unwrap();
        timeout(Duration::from_secs(2), writer).await.unwrap().unwrap();

        // Queue is gone with the writer
        assert_eq!(handle.send("late"), Err(crate::network::SendError::Closed));
    }

    #[tokio::test]
    async fn test_writer_forwards_frames_then_closes() {
        let (sink_tx, mut sink_rx) = mpsc::unbounded_channel::<Message>();
        let sink = Box::pin(futures_util::sink::unfold(sink_tx, |tx, msg: Message| async move {
            tx.send(msg).map_err(|_| tokio_tungstenite::tungstenite::Error::ConnectionClosed)?;
            Ok::<_, tokio_tungstenite::tungstenite::Error>(tx)
        }));
        let (handle, out_rx) = ConnectionHandle::channel(4);
        let writer = spawn_writer(sink, out_rx, "127.0.0.1:1".parse().unwrap());

        handle.send("one").unwrap();
        handle.close().unwrap();
        timeout(Duration::from_secs(2), writer).await.unwrap().unwrap();

        assert_eq!(sink_rx.recv().await, Some(Message::Text("one".to_string())));
    }
}
