//! # Client Projection
//!
//! The engine sees a client only through its legal form, which drives
//! eligibility restrictions. Everything else about the client belongs to
//! the client-management subsystem.

use serde::{Deserialize, Serialize};

use crate::identity::ClientId;

/// Whether a client is a natural person or a registered legal entity.
///
/// Values the engine does not know deserialize to `Unrecognized` instead of
/// failing, and satisfy no restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalForm {
    /// Natural person ("personne physique").
    #[serde(alias = "PERSONNE_PHYSIQUE")]
    Individual,
    /// Registered company or other legal entity ("personne morale").
    #[serde(alias = "PERSONNE_MORALE")]
    LegalEntity,
    /// Any other value found in persisted client data.
    #[serde(other)]
    Unrecognized,
}

impl LegalForm {
    /// Return the wire representation of this legal form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::LegalEntity => "LEGAL_ENTITY",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for LegalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal client projection consumed by the eligibility resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    /// Client identity.
    pub client_id: ClientId,
    /// Legal form.
    pub legal_form: LegalForm,
}

impl ClientProfile {
    /// Create a client profile.
    pub fn new(client_id: ClientId, legal_form: LegalForm) -> Self {
        Self {
            client_id,
            legal_form,
        }
    }
}
