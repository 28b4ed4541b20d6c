use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::game_state::{GameStatus, Prefs, Variant};
use crate::models::steps::{Pocket, Step};

/// Authoritative clock values in seconds, sent alongside moves and
/// snapshots. Local ticking is only an interpolation of these.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ClockData {
    pub white: f64,
    pub black: f64,
}

/// Real-time clock configuration from the snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeClockData {
    pub white: f64,
    pub black: f64,
    #[serde(default)]
    pub initial: f64,
    #[serde(default)]
    pub increment: f64,
    /// Server marked the clock as already running.
    #[serde(default)]
    pub running: bool,
}

/// Correspondence clock configuration from the snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorrespondenceData {
    #[serde(default)]
    pub days_per_turn: u32,
    pub white: f64,
    pub black: f64,
}

/// Special-rule capture square (en-passant equivalent).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnPassantData {
    pub key: String,
    pub color: String,
}

/// Promotion side effect: the pawn on `key` becomes `role`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PromotionData {
    pub key: String,
    pub role: String,
}

/// Castling side effect: king and rook from/to squares.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CastleData {
    pub king: [String; 2],
    pub rook: [String; 2],
    pub color: String,
}

/// One authoritative move or drop confirmation from the server.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MoveEvent {
    pub ply: u32,
    pub fen: String,
    pub san: String,
    pub uci: String,
    #[serde(default)]
    pub check: bool,
    #[serde(default)]
    pub status: Option<GameStatus>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub w_draw: bool,
    #[serde(default)]
    pub b_draw: bool,
    /// Legal destinations, present only when it becomes this client's
    /// turn. Absent or empty also encodes "not your turn".
    #[serde(default)]
    pub dests: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub drops: Option<Vec<String>>,
    #[serde(default)]
    pub enpassant: Option<EnPassantData>,
    #[serde(default)]
    pub promotion: Option<PromotionData>,
    #[serde(default)]
    pub castle: Option<CastleData>,
    #[serde(default)]
    pub clock: Option<ClockData>,
    #[serde(default)]
    pub threefold: bool,
    #[serde(default)]
    pub crazyhouse: Option<Pocket>,
}

/// Game header inside a full snapshot.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    pub id: Uuid,
    pub variant: Variant,
    pub turns: u32,
    #[serde(default)]
    pub started_at_turn: u32,
    pub player: String,
    pub status: GameStatus,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub threefold: bool,
}

/// One side inside a full snapshot.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SideData {
    pub color: String,
    #[serde(default)]
    pub ai: bool,
    #[serde(default)]
    pub spectator: bool,
    #[serde(default)]
    pub offering_draw: bool,
    #[serde(default)]
    pub proposing_takeback: bool,
    #[serde(default)]
    pub offering_rematch: bool,
    #[serde(default)]
    pub on_game: bool,
    #[serde(default)]
    pub berserk: bool,
}

/// A freshly fetched full game snapshot, used at construction and after
/// a reconnection.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub game: GameData,
    pub player: SideData,
    pub opponent: SideData,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub clock: Option<RealTimeClockData>,
    #[serde(default)]
    pub correspondence: Option<CorrespondenceData>,
    #[serde(default)]
    pub possible_moves: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub possible_drops: Option<Vec<String>>,
    #[serde(default)]
    pub pref: Option<Prefs>,
    #[serde(default)]
    pub forecast_count: Option<u32>,
}

/// Outbound move payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveMessage {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// Outbound drop payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DropMessage {
    pub role: String,
    pub pos: String,
}
