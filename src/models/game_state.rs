use std::collections::HashMap;

use chess::{Color, Square};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RoundError;
use crate::game::utils::{color_from_str, parse_dests, parse_square};
use crate::models::messages::{CorrespondenceData, GameSnapshot, RealTimeClockData, SideData};
use crate::models::steps::StepLog;

/// Server-provided legal destinations, origin square to targets.
pub type DestsMap = HashMap<Square, Vec<Square>>;

/// Game status as reported by the server.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Created,
    Started,
    Aborted,
    Mate,
    Resign,
    Stalemate,
    Timeout,
    Draw,
}

impl GameStatus {
    /// True while moves can still be played.
    pub fn playing(self) -> bool {
        matches!(self, GameStatus::Created | GameStatus::Started)
    }
}

/// Variant identifier. Only the variants with client-visible side
/// effects are distinguished; everything else behaves like standard.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Standard,
    Chess960,
    Atomic,
    Crazyhouse,
}

/// Authoritative game header, mutated only by the sync engine and the
/// reconnection merge.
#[derive(Debug, Clone)]
pub struct GameMeta {
    pub id: Uuid,
    pub variant: Variant,
    /// Ply of the current turn.
    pub turns: u32,
    pub started_at_turn: u32,
    /// Color to move.
    pub player: Color,
    pub status: GameStatus,
    pub winner: Option<Color>,
    /// Threefold repetition is claimable.
    pub threefold: bool,
}

/// Per-side metadata for the viewer or their opponent.
#[derive(Debug, Clone)]
pub struct SideState {
    pub color: Color,
    pub ai: bool,
    pub spectator: bool,
    pub offering_draw: bool,
    pub proposing_takeback: bool,
    pub offering_rematch: bool,
    pub on_game: bool,
    pub berserk: bool,
}

/// Local policy preferences for this viewer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct Prefs {
    #[serde(default)]
    pub submit_move: bool,
    #[serde(default)]
    pub confirm_resign: bool,
}

/// Per-color tournament berserk flags. Once set, never cleared for the
/// lifetime of the view.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoneBerserk {
    white: bool,
    black: bool,
}

impl GoneBerserk {
    pub fn get(&self, color: Color) -> bool {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    pub fn set(&mut self, color: Color) {
        match color {
            Color::White => self.white = true,
            Color::Black => self.black = true,
        }
    }
}

/// All authoritative state for one game view, built from a snapshot and
/// then mutated only by `api_move` and `reload`.
#[derive(Debug, Clone)]
pub struct RoundData {
    pub game: GameMeta,
    pub player: SideState,
    pub opponent: SideState,
    pub steps: StepLog,
    /// Present only when it is this viewer's turn.
    pub possible_moves: Option<DestsMap>,
    /// Crazyhouse drop targets; `None` means any empty square.
    pub possible_drops: Option<Vec<Square>>,
    pub clock: Option<RealTimeClockData>,
    pub correspondence: Option<CorrespondenceData>,
    pub prefs: Prefs,
    /// Number of precomputed continuation moves, stale after any
    /// authoritative move.
    pub forecast_count: Option<u32>,
}

fn side_from_data(side: &SideData) -> Result<SideState, RoundError> {
    Ok(SideState {
        color: color_from_str(&side.color)?,
        ai: side.ai,
        spectator: side.spectator,
        offering_draw: side.offering_draw,
        proposing_takeback: side.proposing_takeback,
        offering_rematch: side.offering_rematch,
        on_game: side.on_game || side.ai,
        berserk: side.berserk,
    })
}

impl RoundData {
    /// Build engine state from a wire snapshot, parsing all string
    /// squares and colors at the boundary.
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<RoundData, RoundError> {
        let player = side_from_data(&snapshot.player)?;
        let possible_moves = match &snapshot.possible_moves {
            Some(raw) => Some(parse_dests(raw)?),
            None => None,
        };
        let possible_drops = match &snapshot.possible_drops {
            Some(raw) => Some(
                raw.iter()
                    .map(|s| parse_square(s))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        Ok(RoundData {
            game: GameMeta {
                id: snapshot.game.id,
                variant: snapshot.game.variant,
                turns: snapshot.game.turns,
                started_at_turn: snapshot.game.started_at_turn,
                player: color_from_str(&snapshot.game.player)?,
                status: snapshot.game.status,
                winner: match &snapshot.game.winner {
                    Some(w) => Some(color_from_str(w)?),
                    None => None,
                },
                threefold: snapshot.game.threefold,
            },
            player,
            opponent: side_from_data(&snapshot.opponent)?,
            steps: StepLog::new(snapshot.steps.clone()),
            possible_moves,
            possible_drops,
            clock: snapshot.clock.clone(),
            correspondence: snapshot.correspondence.clone(),
            prefs: snapshot.pref.unwrap_or_default(),
            forecast_count: snapshot.forecast_count,
        })
    }

    /// The side playing the given color.
    pub fn side_mut(&mut self, color: Color) -> &mut SideState {
        if self.player.color == color {
            &mut self.player
        } else {
            &mut self.opponent
        }
    }

    pub fn side(&self, color: Color) -> &SideState {
        if self.player.color == color {
            &self.player
        } else {
            &self.opponent
        }
    }
}
