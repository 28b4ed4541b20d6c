use chess::{Piece, Rank, Square};
use log::{info, warn};

use super::RoundCtrl;
use crate::game::utils::{is_player_turn, role_name};
use crate::interface::SoundCue;
use crate::models::game_state::Variant;
use crate::models::messages::{DropMessage, MoveMessage};

/// Outcome of a user move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMove {
    /// Sent to the transport immediately.
    Sent,
    /// Staged for two-phase confirmation; call `submit_move`.
    Staged,
    /// A promotion role must be chosen first; re-enter `send_move` with
    /// the chosen role, or call `cancel_promotion`.
    NeedsPromotion,
}

impl RoundCtrl {
    /// Entry point for a user move from the board. Promotion choice is
    /// resolved host-side before the move is built.
    pub fn user_move(&mut self, orig: Square, dest: Square, is_premove: bool) -> UserMove {
        if self.needs_promotion(orig, dest) {
            return UserMove::NeedsPromotion;
        }
        self.send_move(orig, dest, None, is_premove)
    }

    fn needs_promotion(&self, orig: Square, dest: Square) -> bool {
        let Some(piece) = self.board.piece_at(orig) else {
            return false;
        };
        if piece.role != Piece::Pawn || piece.color != self.data.player.color {
            return false;
        }
        let back_rank = match piece.color {
            chess::Color::White => Rank::Eighth,
            chess::Color::Black => Rank::First,
        };
        dest.get_rank() == back_rank
    }

    /// Build and route an outgoing move. An explicit move disarms any
    /// pending resign confirmation. With the submit-move preference on,
    /// non-premove moves are staged instead of sent.
    pub fn send_move(
        &mut self,
        orig: Square,
        dest: Square,
        promotion: Option<Piece>,
        is_premove: bool,
    ) -> UserMove {
        let msg = MoveMessage {
            from: orig.to_string(),
            to: dest.to_string(),
            promotion: promotion.map(|r| role_name(r).to_string()),
        };
        self.resign(false);
        if self.data.prefs.submit_move && !is_premove {
            info!("staging move {}{} for confirmation", msg.from, msg.to);
            self.move_to_submit = Some(msg);
            self.notifier.state_changed();
            UserMove::Staged
        } else {
            self.transport
                .send("move", serde_json::to_value(&msg).unwrap_or_default(), true);
            UserMove::Sent
        }
    }

    /// Second phase of move submission: send the staged move, or revert
    /// the board to the current ply. Either way the staged move is
    /// cleared.
    pub fn submit_move(&mut self, accept: bool) {
        if accept {
            if let Some(msg) = self.move_to_submit.take() {
                info!("submitting confirmed move {}{}", msg.from, msg.to);
                self.transport
                    .send("move", serde_json::to_value(&msg).unwrap_or_default(), true);
                self.notifier.sound(SoundCue::Confirmation);
            }
        } else {
            self.move_to_submit = None;
            self.jump(self.ply);
        }
    }

    pub fn move_to_submit(&self) -> Option<&MoveMessage> {
        self.move_to_submit.as_ref()
    }

    /// The user abandoned a promotion choice: revert the speculative
    /// move drawn by the board widget.
    pub fn cancel_promotion(&mut self) {
        self.jump(self.ply);
    }

    /// Entry point for a user reserve-piece drop. Invalid drops revert
    /// the board instead of being sent.
    pub fn user_drop(&mut self, role: Piece, pos: Square) -> bool {
        if self.valid_drop(pos) {
            self.send_drop(role, pos);
            true
        } else {
            warn!("invalid drop on {}, reverting", pos);
            self.jump(self.ply);
            false
        }
    }

    fn valid_drop(&self, pos: Square) -> bool {
        if self.data.game.variant != Variant::Crazyhouse || !is_player_turn(&self.data) {
            return false;
        }
        if self.board.piece_at(pos).is_some() {
            return false;
        }
        // no drop map means any empty square is legal
        match &self.data.possible_drops {
            Some(drops) => drops.contains(&pos),
            None => true,
        }
    }

    fn send_drop(&mut self, role: Piece, pos: Square) {
        let msg = DropMessage {
            role: role_name(role).to_string(),
            pos: pos.to_string(),
        };
        self.resign(false);
        self.transport
            .send("drop", serde_json::to_value(&msg).unwrap_or_default(), true);
    }
}
