//! Client-side engine for one live two-player chess(-variant) round.
//!
//! Keeps the local view of an in-progress game consistent with the
//! authoritative server history while supporting independent history
//! replay, locally-ticked clocks with server correction, optimistic
//! move submission with optional two-phase confirmation, and
//! reconciliation from a full snapshot after a connection loss.
//!
//! The engine owns all round state; rendering, sound, notifications,
//! promotion dialogs and the transport itself are collaborators behind
//! the traits in [`interface`].

pub mod clock;
pub mod error;
pub mod game;
pub mod interface;
pub mod models;
pub mod round;

pub use error::RoundError;
pub use round::{RoundCtrl, UserMove};
