use thiserror::Error;

use crate::circuit::{GateId, GateKind};

pub type Result<T, E = SimulationError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid input: expected {expected} inputs, got {got}")]
    InputCount { expected: usize, got: usize },

    #[error("invalid input: no gate named '{0}'")]
    UnknownInput(GateId),

    #[error("invalid input: gate '{id}' is {kind}, not INPUT")]
    NotAnInput { id: GateId, kind: GateKind },

    /// Truth tables enumerate every input combination so they are capped.
    #[error("truth table would need {count} inputs but at most {max} are supported")]
    TooManyInputs { count: usize, max: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl SimulationError {
    /// Whether this is one of the input-shape validation failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SimulationError::InputCount { .. } | SimulationError::UnknownInput(_) | SimulationError::NotAnInput { .. })
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed json: {0}")]
    Json(#[from] json::Error),

    #[error("{0}")]
    Malformed(String),

    #[error("invalid gate type '{0}'")]
    UnknownGateType(String),
}

impl DocumentError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        DocumentError::Malformed(message.into())
    }
}
