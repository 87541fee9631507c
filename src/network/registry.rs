//! Connection Registry
//!
//! Assigns player slots to live connections. The first connection gets
//! slot 1, the second slot 2; anything beyond that is turned away.

use crate::game::state::Slot;
use crate::network::connection::ConnectionId;

/// Maximum number of players in a session.
pub const MAX_PLAYERS: usize = 2;

/// Registry errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Both slots are taken.
    #[error("Registry is full")]
    Full,
}

/// Insertion-ordered mapping from connection to slot.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: Vec<(ConnectionId, Slot)>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_PLAYERS),
        }
    }

    /// Assign `id` the next slot (current count + 1).
    ///
    /// An id that is already registered keeps its slot.
    pub fn register(&mut self, id: ConnectionId) -> Result<Slot, RegistryError> {
        if let Some(slot) = self.slot_of(id) {
            return Ok(slot);
        }

        let next = u8::try_from(self.entries.len() + 1).map_err(|_| RegistryError::Full)?;
        let slot = Slot::try_from(next).map_err(|_| RegistryError::Full)?;

        self.entries.push((id, slot));
        Ok(slot)
    }

    /// Remove `id`, returning the slot it held.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Slot> {
        let index = self.entries.iter().position(|(entry, _)| *entry == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Slot held by `id`, if registered.
    pub fn slot_of(&self, id: ConnectionId) -> Option<Slot> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, slot)| *slot)
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered connections in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, Slot)> + '_ {
        self.entries.iter().copied()
    }
}
