use thiserror::Error;

/// Errors surfaced by the round engine.
///
/// Nothing here is fatal: a `ProtocolViolation` means the caller should
/// fetch a fresh snapshot and call `RoundCtrl::reload`, everything else
/// is recoverable in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    /// An authoritative event referenced a ply that is not the next one.
    #[error("protocol violation: event for ply {got}, expected ply {expected}")]
    ProtocolViolation { expected: u32, got: u32 },

    /// A step lookup outside the recorded history.
    #[error("no step recorded for ply {0}")]
    StepNotFound(u32),

    /// A square string on the wire could not be parsed.
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    /// A piece role string on the wire could not be parsed.
    #[error("invalid piece role: {0}")]
    InvalidRole(String),

    /// A color string on the wire could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A uci move string on the wire was too short or malformed.
    #[error("invalid uci move: {0}")]
    InvalidUci(String),
}
