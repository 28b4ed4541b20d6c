use std::collections::HashMap;
use std::str::FromStr;

use chess::{Color, File, Piece, Rank, Square};

use crate::error::RoundError;
use crate::interface::SoundCue;
use crate::models::game_state::{DestsMap, RoundData};

/// Convert a chess color to its wire representation
pub fn color_to_string(color: Color) -> String {
    match color {
        Color::White => "white".to_string(),
        Color::Black => "black".to_string(),
    }
}

/// Parse a wire color string
pub fn color_from_str(s: &str) -> Result<Color, RoundError> {
    match s {
        "white" => Ok(Color::White),
        "black" => Ok(Color::Black),
        _ => Err(RoundError::InvalidColor(s.to_string())),
    }
}

/// Color to move at the given ply. Even plies are white's turn.
pub fn color_to_move_at(ply: u32) -> Color {
    if ply % 2 == 0 {
        Color::White
    } else {
        Color::Black
    }
}

/// Parse a wire square like "e4"
pub fn parse_square(s: &str) -> Result<Square, RoundError> {
    Square::from_str(&s.to_lowercase()).map_err(|_| RoundError::InvalidSquare(s.to_string()))
}

/// Parse a wire piece role, full name or single letter
pub fn role_from_str(s: &str) -> Result<Piece, RoundError> {
    match s.to_lowercase().as_str() {
        "pawn" | "p" => Ok(Piece::Pawn),
        "knight" | "n" => Ok(Piece::Knight),
        "bishop" | "b" => Ok(Piece::Bishop),
        "rook" | "r" => Ok(Piece::Rook),
        "queen" | "q" => Ok(Piece::Queen),
        "king" | "k" => Ok(Piece::King),
        _ => Err(RoundError::InvalidRole(s.to_string())),
    }
}

/// Wire name of a piece role
pub fn role_name(role: Piece) -> &'static str {
    match role {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

/// A parsed coordinate move: either an origin/destination move or a
/// reserve-piece drop ("Q@e4").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciMove {
    Move {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    },
    Drop {
        role: Piece,
        to: Square,
    },
}

/// Parse a coordinate move string. Slices go through `get` so a
/// non-ascii string is an error, not a panic.
pub fn parse_uci(uci: &str) -> Result<UciMove, RoundError> {
    let invalid = || RoundError::InvalidUci(uci.to_string());
    let bytes = uci.as_bytes();
    if bytes.len() >= 4 && bytes[1] == b'@' {
        let role = role_from_str(uci.get(0..1).ok_or_else(invalid)?)?;
        let to = parse_square(uci.get(2..4).ok_or_else(invalid)?)?;
        return Ok(UciMove::Drop { role, to });
    }
    if bytes.len() < 4 {
        return Err(invalid());
    }
    let from = parse_square(uci.get(0..2).ok_or_else(invalid)?)?;
    let to = parse_square(uci.get(2..4).ok_or_else(invalid)?)?;
    let promotion = if bytes.len() > 4 {
        Some(role_from_str(uci.get(4..5).ok_or_else(invalid)?)?)
    } else {
        None
    };
    Ok(UciMove::Move {
        from,
        to,
        promotion,
    })
}

/// Squares to highlight as the last move for a coordinate move string.
/// Drops highlight their destination square twice.
pub fn uci_to_last_move(uci: &str) -> Option<(Square, Square)> {
    match parse_uci(uci).ok()? {
        UciMove::Move { from, to, .. } => Some((from, to)),
        UciMove::Drop { to, .. } => Some((to, to)),
    }
}

/// Parse the server-provided destination map
pub fn parse_dests(raw: &HashMap<String, Vec<String>>) -> Result<DestsMap, RoundError> {
    let mut dests = DestsMap::new();
    for (from, targets) in raw {
        let from = parse_square(from)?;
        let targets = targets
            .iter()
            .map(|t| parse_square(t))
            .collect::<Result<Vec<_>, _>>()?;
        dests.insert(from, targets);
    }
    Ok(dests)
}

/// Sound cue classification for a move notation: capture or plain move,
/// plus a check cue when the notation marks check or mate. The engine
/// decides which cues apply, the sound collaborator plays them.
pub fn san_sound_cues(san: &str) -> Vec<SoundCue> {
    let mut cues = Vec::new();
    if san.contains('x') {
        cues.push(SoundCue::Capture);
    } else {
        cues.push(SoundCue::Move);
    }
    if san.contains('+') || san.contains('#') {
        cues.push(SoundCue::Check);
    }
    cues
}

/// The squares adjacent to `at`, for explosive-capture side effects.
pub fn surrounding_squares(at: Square) -> Vec<Square> {
    let rank = at.get_rank().to_index() as i32;
    let file = at.get_file().to_index() as i32;
    let mut squares = Vec::new();
    for dr in -1..=1 {
        for df in -1..=1 {
            if dr == 0 && df == 0 {
                continue;
            }
            let (r, f) = (rank + dr, file + df);
            if (0..8).contains(&r) && (0..8).contains(&f) {
                squares.push(Square::make_square(
                    Rank::from_index(r as usize),
                    File::from_index(f as usize),
                ));
            }
        }
    }
    squares
}

/// True while moves can still be played in this game.
pub fn playable(data: &RoundData) -> bool {
    data.game.status.playing()
}

/// True when the viewer is an active player in a playable game.
pub fn is_player_playing(data: &RoundData) -> bool {
    playable(data) && !data.player.spectator
}

/// True when it is the viewer's turn in a playable game.
pub fn is_player_turn(data: &RoundData) -> bool {
    playable(data) && data.game.player == data.player.color
}

/// Record a presence signal for the side playing `color`.
pub fn set_on_game(data: &mut RoundData, color: Color, on_game: bool) {
    let side = data.side_mut(color);
    side.on_game = side.ai || on_game;
}
