//! Network Layer
//!
//! WebSocket server for real-time two-player communication.
//! Connections only produce events; all match state lives in `game/`
//! behind the session coordinator.

pub mod connection;
pub mod driver;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;

pub use connection::{ConnectionHandle, ConnectionId, Outbound, SendError};
pub use driver::TickDriver;
pub use protocol::{ClientMessage, ControlMessage, ServerMessage};
pub use registry::{ConnectionRegistry, RegistryError, MAX_PLAYERS};
pub use server::{GameServer, GameServerError};
pub use session::{SessionCoordinator, SessionError, SessionId, SessionPhase};
