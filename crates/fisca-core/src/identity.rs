//! # Identity Newtypes
//!
//! Identifiers handed out by the persistence service. Both are plain
//! integers on the wire; the newtypes keep a client id from being passed
//! where a record id is expected.

use serde::{Deserialize, Serialize};

/// Identifier of a client in the client-management subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub i64);

/// Identifier of a persisted payment or declaration record.
///
/// A record carrying a `RecordId` is updated in place by the persistence
/// layer; a record without one is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl ClientId {
    /// Access the inner integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl RecordId {
    /// Access the inner integer.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client:{}", self.0)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record:{}", self.0)
    }
}
