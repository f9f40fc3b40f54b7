use crate::catalog_store::{CartridgeType, ComponentKind};
use thiserror::Error;

/// Errors produced by the matching engine.
///
/// `MissingElectricalSpec` is recovered inside the engine (the SUT analysis is
/// dropped); every other variant aborts the match request.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("{kind} '{id}' not found")]
    ComponentNotFound { kind: ComponentKind, id: String },

    #[error("Invalid mass: {0}")]
    InvalidMass(String),

    #[error("Invalid compliance: {0}")]
    InvalidCompliance(String),

    #[error("Missing electrical specification: {0}")]
    MissingElectricalSpec(String),

    #[error("Cannot estimate cartridge weight: no {cartridge_type} cartridges with a measured weight {criteria}")]
    InsufficientReferenceData {
        cartridge_type: CartridgeType,
        criteria: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl MatchingError {
    /// Stable machine-readable code, used in HTTP error bodies and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            MatchingError::ComponentNotFound { .. } => "component_not_found",
            MatchingError::InvalidMass(_) => "invalid_mass",
            MatchingError::InvalidCompliance(_) => "invalid_compliance",
            MatchingError::MissingElectricalSpec(_) => "missing_electrical_spec",
            MatchingError::InsufficientReferenceData { .. } => "insufficient_reference_data",
            MatchingError::InvalidRequest(_) => "invalid_request",
            MatchingError::Store(_) => "store_error",
        }
    }
}
