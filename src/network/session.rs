//! Session Coordination
//!
//! One session: one game state, one connection registry, and the send
//! handles of the players in it. Every event (connection opened, message
//! received, connection closed, tick) is a method taking `&mut self`; the
//! server keeps the coordinator behind a single `RwLock` and takes the write
//! guard for each of them, so no two mutations ever interleave.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::core::rng::DeterministicRng;
use crate::game::input::apply_movement;
use crate::game::state::{GameState, Slot, StateSnapshot};
use crate::game::tick::TickResult;
use crate::network::connection::{ConnectionHandle, ConnectionId, SendError};
use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::network::registry::{ConnectionRegistry, RegistryError};

/// Unique session identifier.
pub type SessionId = uuid::Uuid;

/// Where the session is in its round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No round running and no winner.
    Lobby,
    /// Round in progress.
    Active,
    /// A winner has been declared; players may restart.
    RoundOver,
}

impl SessionPhase {
    /// Derive the phase from the game flags.
    pub fn of(state: &GameState) -> Self {
        if state.running {
            SessionPhase::Active
        } else if state.winner.is_some() {
            SessionPhase::RoundOver
        } else {
            SessionPhase::Lobby
        }
    }
}

/// Session errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    /// Both player slots are taken.
    #[error("Session is full")]
    SessionFull,
}

impl From<RegistryError> for SessionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Full => SessionError::SessionFull,
        }
    }
}

/// Owns the match and routes connection events into it.
pub struct SessionCoordinator {
    /// Unique session identifier.
    pub id: SessionId,
    state: GameState,
    registry: ConnectionRegistry,
    /// Send handles of registered connections.
    connections: BTreeMap<ConnectionId, ConnectionHandle>,
    phase: SessionPhase,
}

impl SessionCoordinator {
    /// Create a session drawing randomness from `rng`.
    pub fn new(id: SessionId, rng: DeterministicRng) -> Self {
        let state = GameState::new(rng);
        let phase = SessionPhase::of(&state);

        Self {
            id,
            state,
            registry: ConnectionRegistry::new(),
            connections: BTreeMap::new(),
            phase,
        }
    }

    /// Create a session with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::new(uuid::Uuid::new_v4(), DeterministicRng::new(seed))
    }

    /// Create a session from an optional configured seed.
    ///
    /// Without one, the generator is seeded from the session id and the clock.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let id = uuid::Uuid::new_v4();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        match seed {
            Some(seed) => info!("Session {} created (seed {})", id, seed),
            None => info!("Session {} created (derived seed)", id),
        }
        Self::new(id, session_rng(&id, seed, nanos))
    }

    // =========================================================================
    // CONNECTION EVENTS
    // =========================================================================

    /// A connection opened.
    ///
    /// On success the connection is sent its `init` message and joins the
    /// broadcast set. When both slots are taken the handle is closed
    /// straight away and nothing is sent.
    pub fn on_open(&mut self, handle: ConnectionHandle) -> Result<Slot, SessionError> {
        let id = handle.id();

        let slot = match self.registry.register(id) {
            Ok(slot) => slot,
            Err(e) => {
                info!("Rejecting connection {}: {}", id, e);
                let _ = handle.close();
                return Err(e.into());
            }
        };

        match ServerMessage::init(slot).to_json() {
            Ok(text) => {
                if let Err(e) = handle.send(text) {
                    warn!("Failed to queue init for {}: {}", id, e);
                }
            }
            Err(e) => warn!("Failed to serialize init: {}", e),
        }

        self.connections.insert(id, handle);
        info!("Connection {} assigned slot {}", id, slot);

        Ok(slot)
    }

    /// A text frame arrived from `id`.
    ///
    /// Messages from unregistered connections, unparsable payloads and
    /// unknown types are dropped. Returns whether the message was applied.
    pub fn on_message(&mut self, id: ConnectionId, text: &str) -> bool {
        let slot = match self.registry.slot_of(id) {
            Some(slot) => slot,
            None => {
                debug!("Dropping message from unregistered connection {}", id);
                return false;
            }
        };

        let msg = match ClientMessage::from_json(text) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Invalid message from {}: {}", id, e);
                return false;
            }
        };

        match msg {
            ClientMessage::StartGame => {
                info!("Player {} started a round", slot);
                self.state.start_game();
            }
            ClientMessage::Movement { key } => {
                if !apply_movement(&mut self.state, slot, &key) {
                    debug!("Movement {:?} from player {} had no effect", key, slot);
                }
            }
        }

        self.sync_phase();
        self.broadcast();
        true
    }

    /// A connection closed (cleanly or not).
    ///
    /// When the last player leaves the game returns to the lobby.
    pub fn on_close(&mut self, id: ConnectionId) -> Option<Slot> {
        self.connections.remove(&id);
        let slot = self.registry.unregister(id)?;

        info!("Player {} ({}) left", slot, id);

        if self.registry.is_empty() {
            info!("Session {} empty, resetting", self.id);
            self.state.reset_game();
            self.sync_phase();
        }

        Some(slot)
    }

    /// One fixed-rate step: physics, then an unconditional broadcast.
    pub fn tick(&mut self) -> TickResult {
        let result = self.state.update();

        for event in &result.events {
            if event.is_notable() {
                info!("Session {}: {:?}", self.id, event);
            } else {
                debug!("Session {}: {:?}", self.id, event);
            }
        }

        self.sync_phase();
        self.broadcast();
        result
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Current broadcast projection.
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Read-only view of the match.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Number of registered players.
    pub fn player_count(&self) -> usize {
        self.registry.len()
    }

    /// Slot held by `id`.
    pub fn slot_of(&self, id: ConnectionId) -> Option<Slot> {
        self.registry.slot_of(id)
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Serialize the snapshot once and queue it on every registered
    /// connection. Never waits: a client with a full buffer misses this frame.
    fn broadcast(&self) {
        if self.connections.is_empty() {
            return;
        }

        let text = match ServerMessage::State(self.state.snapshot()).to_json() {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to serialize state: {}", e);
                return;
            }
        };

        for (id, handle) in &self.connections {
            match handle.send(text.clone()) {
                Ok(()) => {}
                Err(SendError::Full) => warn!("Dropping state frame for slow client {}", id),
                Err(SendError::Closed) => debug!("Connection {} already gone", id),
            }
        }
    }

    fn sync_phase(&mut self) {
        let phase = SessionPhase::of(&self.state);
        if phase != self.phase {
            info!("Session {} phase {:?} -> {:?}", self.id, self.phase, phase);
            self.phase = phase;
        }
    }
}

/// Generator for session `id`: the configured seed if any, otherwise one
/// derived from the id and `entropy`.
fn session_rng(id: &SessionId, seed: Option<u64>, entropy: u128) -> DeterministicRng {
    match seed {
        Some(seed) => DeterministicRng::new(seed),
        None => DeterministicRng::from_session(id.as_bytes(), entropy),
    }
}
