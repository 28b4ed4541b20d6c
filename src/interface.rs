use chess::{Color, Piece, Square};
use serde_json::Value;

use crate::models::game_state::DestsMap;

/// Sound cue classification. The engine decides which cue applies, the
/// sound collaborator plays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    Move,
    Capture,
    Check,
    Explosion,
    Confirmation,
    Berserk,
}

/// A state transition that happened while disconnected, surfaced once
/// by the reconnection merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Draw,
    Takeback,
    Rematch,
}

/// A piece as the rendering collaborator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceOn {
    pub role: Piece,
    pub color: Color,
}

/// Interactivity descriptor: which color may move, and where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movable {
    pub color: Option<Color>,
    pub dests: DestsMap,
}

/// Position descriptor consumed by the rendering collaborator. Fields
/// left `None` are unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardConfig {
    pub fen: Option<String>,
    pub last_move: Option<(Square, Square)>,
    pub check: bool,
    pub turn_color: Option<Color>,
    pub movable: Option<Movable>,
}

/// Outbound message channel. Delivery is assumed reliable, ordered and
/// duplicate-free per game channel; `ackable` requests an
/// application-level acknowledgement.
pub trait Transport {
    fn send(&mut self, event: &str, payload: Value, ackable: bool);
}

/// The board rendering collaborator. The engine pushes position,
/// highlight and interactivity updates and queries occupancy for drop
/// validation and promotion detection.
pub trait BoardView {
    /// Apply a position/interactivity descriptor.
    fn set(&mut self, config: BoardConfig);
    /// Freeze the board: no piece is movable, any premove is dropped.
    fn stop(&mut self);
    /// Animate an authoritative move.
    fn api_move(&mut self, from: Square, to: Square);
    /// Place a reserve piece.
    fn new_piece(&mut self, piece: PieceOn, at: Square);
    /// Point piece changes: `None` clears a square.
    fn set_pieces(&mut self, changes: Vec<(Square, Option<PieceOn>)>);
    fn piece_at(&self, at: Square) -> Option<PieceOn>;
    /// Play the queued premove if one exists and is now legal.
    fn play_premove(&mut self) -> bool;
    fn cancel_premove(&mut self);
}

/// Sound, desktop-notification and peripheral hooks. All methods
/// default to no-ops so hosts implement only what they surface.
pub trait Notifier {
    fn sound(&mut self, _cue: SoundCue) {}
    /// It is the viewer's move and no premove fired.
    fn your_turn(&mut self) {}
    /// An offer arrived (possibly while disconnected).
    fn offer_received(&mut self, _offer: Offer) {}
    /// The viewer's own move was confirmed; advance any queued
    /// precomputed continuation.
    fn advance_forecast(&mut self) {}
    /// Some round state changed; schedule a redraw.
    fn state_changed(&mut self) {}
}
