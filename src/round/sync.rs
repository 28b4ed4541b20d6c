use chess::{Color, Piece, Square};
use log::{info, warn};

use super::RoundCtrl;
use crate::error::RoundError;
use crate::game::utils::{
    color_from_str, color_to_move_at, is_player_playing, is_player_turn, parse_dests, parse_square,
    parse_uci, role_from_str, set_on_game, surrounding_squares, uci_to_last_move, UciMove,
};
use crate::interface::{BoardConfig, Movable, PieceOn, SoundCue};
use crate::models::game_state::Variant;
use crate::models::messages::MoveEvent;
use crate::models::steps::Step;

struct ParsedCastle {
    king: (Square, Square),
    rook: (Square, Square),
    color: Color,
}

impl RoundCtrl {
    /// Apply one authoritative move/drop confirmation.
    ///
    /// Atomic from the caller's perspective: everything is parsed up
    /// front, so a malformed or out-of-order event returns an error
    /// without mutating any state. On `ProtocolViolation` the caller
    /// should fetch a fresh snapshot and `reload` rather than retry.
    pub fn api_move(&mut self, o: &MoveEvent) -> Result<(), RoundError> {
        let expected = self.data.steps.last_ply() + 1;
        if o.ply != expected {
            warn!(
                "move event for ply {} but expected {}, requesting reload",
                o.ply, expected
            );
            return Err(RoundError::ProtocolViolation {
                expected,
                got: o.ply,
            });
        }
        let uci = parse_uci(&o.uci)?;
        let winner = match &o.winner {
            Some(w) => Some(color_from_str(w)?),
            None => None,
        };
        let dests = match &o.dests {
            Some(raw) => Some(parse_dests(raw)?),
            None => None,
        };
        let drops = match &o.drops {
            Some(raw) => Some(
                raw.iter()
                    .map(|s| parse_square(s))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        let enpassant = match &o.enpassant {
            Some(ep) => Some(parse_square(&ep.key)?),
            None => None,
        };
        let promotion = match &o.promotion {
            Some(p) => Some((parse_square(&p.key)?, role_from_str(&p.role)?)),
            None => None,
        };
        let castle = match &o.castle {
            Some(c) => Some(ParsedCastle {
                king: (parse_square(&c.king[0])?, parse_square(&c.king[1])?),
                rook: (parse_square(&c.rook[0])?, parse_square(&c.rook[1])?),
                color: color_from_str(&c.color)?,
            }),
            None => None,
        };

        let was_replaying = self.replaying();
        let playing = is_player_playing(&self.data);

        // 1. game header: ply, turn, status, offers
        self.data.game.turns = o.ply;
        self.data.game.player = color_to_move_at(o.ply);
        let played_color = !self.data.game.player;
        if let Some(status) = o.status {
            self.data.game.status = status;
        }
        if let Some(winner) = winner {
            self.data.game.winner = Some(winner);
        }
        self.data.side_mut(Color::White).offering_draw = o.w_draw;
        self.data.side_mut(Color::Black).offering_draw = o.b_draw;
        let my_turn = self.data.player.color == self.data.game.player;
        self.data.possible_moves = if my_turn { dests } else { None };
        self.data.possible_drops = if my_turn { drops } else { None };

        // 2. advance the live position, but never a replayed one
        if !was_replaying {
            self.ply += 1;
            match uci {
                UciMove::Move { from, to, .. } => {
                    let captured = self.board.piece_at(to);
                    self.board.api_move(from, to);
                    if captured.is_some() {
                        if self.data.game.variant == Variant::Atomic {
                            self.explode(to);
                            self.notifier.sound(SoundCue::Explosion);
                        } else {
                            self.notifier.sound(SoundCue::Capture);
                        }
                    } else {
                        self.notifier.sound(SoundCue::Move);
                    }
                }
                UciMove::Drop { role, to } => {
                    self.board.new_piece(
                        PieceOn {
                            role,
                            color: played_color,
                        },
                        to,
                    );
                    self.notifier.sound(SoundCue::Move);
                }
            }
            if let Some(key) = enpassant {
                self.board.set_pieces(vec![(key, None)]);
                if self.data.game.variant == Variant::Atomic {
                    self.explode(key);
                    self.notifier.sound(SoundCue::Explosion);
                } else {
                    self.notifier.sound(SoundCue::Capture);
                }
            }
            if let Some((key, role)) = promotion {
                self.board.set_pieces(vec![(
                    key,
                    Some(PieceOn {
                        role,
                        color: played_color,
                    }),
                )]);
            }
            if let Some(c) = castle {
                self.board.set_pieces(vec![
                    (c.king.0, None),
                    (c.rook.0, None),
                    (
                        c.king.1,
                        Some(PieceOn {
                            role: Piece::King,
                            color: c.color,
                        }),
                    ),
                    (
                        c.rook.1,
                        Some(PieceOn {
                            role: Piece::Rook,
                            color: c.color,
                        }),
                    ),
                ]);
            }
            self.board.set(BoardConfig {
                fen: None,
                last_move: uci_to_last_move(&o.uci),
                check: o.check,
                turn_color: Some(self.data.game.player),
                movable: Some(Movable {
                    color: if playing && my_turn {
                        Some(self.data.player.color)
                    } else {
                        None
                    },
                    dests: if playing {
                        self.data.possible_moves.clone().unwrap_or_default()
                    } else {
                        Default::default()
                    },
                }),
            });
            if o.check {
                self.notifier.sound(SoundCue::Check);
            }
        }

        // 3. unconditional bookkeeping, replaying or not
        if let Some(c) = &o.clock {
            if let Some(clock) = &mut self.clock {
                clock.update(c.white, c.black);
            }
        }
        self.data.game.threefold = o.threefold;
        self.data.steps.append(Step {
            ply: o.ply,
            fen: o.fen.clone(),
            san: Some(o.san.clone()),
            uci: Some(o.uci.clone()),
            check: o.check,
            crazy: o.crazyhouse.clone(),
        });
        set_on_game(&mut self.data, played_color, true);
        // the position diverged from any precomputed line
        self.data.forecast_count = None;
        self.update_quiet();

        // 4. own move confirmed: advance the queued continuation
        if playing && played_color == self.data.player.color {
            self.notifier.advance_forecast();
        }

        // 5. opponent moved: a queued premove wins over the turn
        //    notification. Explosive side effects were applied above as
        //    a blocking sub-step, so nothing races the premove.
        if !was_replaying && played_color != self.data.player.color {
            if !self.board.play_premove() && is_player_turn(&self.data) {
                self.notifier.your_turn();
            }
        }

        info!("applied {} at ply {}", o.san, o.ply);
        self.notifier.state_changed();
        Ok(())
    }

    /// Explosive capture: clear the capture square and every adjacent
    /// non-pawn piece.
    fn explode(&mut self, at: Square) {
        let mut changes: Vec<(Square, Option<PieceOn>)> = vec![(at, None)];
        for sq in surrounding_squares(at) {
            if let Some(piece) = self.board.piece_at(sq) {
                if piece.role != Piece::Pawn {
                    changes.push((sq, None));
                }
            }
        }
        self.board.set_pieces(changes);
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::models::game_state::GameStatus;

    #[test]
    fn appends_step_and_flips_turn() {
        // viewer is white; black answers 1.e4 with 1...e5
        let mut h = Harness::with_snapshot(|s| {
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        let event = move_event(2, "e5", "e7e5");
        h.ctrl.api_move(&event).unwrap();

        assert_eq!(h.ctrl.last_ply(), 2);
        assert_eq!(h.ctrl.data().steps.len(), 3);
        assert_eq!(h.ctrl.data().game.player, Color::White);
        // no dests came with the event: map is empty, not our turn data
        assert!(h.ctrl.data().possible_moves.is_none());
    }

    #[test]
    fn rejects_out_of_order_plies_without_mutating() {
        let mut h = Harness::with_snapshot(|s| {
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        let event = move_event(4, "e5", "e7e5");
        assert_eq!(
            h.ctrl.api_move(&event),
            Err(RoundError::ProtocolViolation {
                expected: 2,
                got: 4
            })
        );
        assert_eq!(h.ctrl.last_ply(), 1);
        assert_eq!(h.ctrl.data().game.turns, 1);
    }

    #[test]
    fn replay_isolation_keeps_the_cursor_and_board_still() {
        let mut h = Harness::with_steps_to(7);
        assert!(h.ctrl.jump(3));
        let boards_before = h.board.configs.borrow().len();

        let event = move_event(8, "Nf3", "g1f3");
        h.ctrl.api_move(&event).unwrap();

        assert_eq!(h.ctrl.last_ply(), 8);
        assert_eq!(h.ctrl.current_ply(), 3);
        assert!(h.ctrl.replaying());
        // no board mutation while browsing history
        assert_eq!(h.board.configs.borrow().len(), boards_before);
        assert!(h.board.api_moves.borrow().is_empty());
    }

    #[test]
    fn own_move_confirmation_advances_forecast_not_notification() {
        // white viewer, white to move at ply 0
        let mut h = Harness::playing();
        let event = move_event(1, "e4", "e2e4");
        h.ctrl.api_move(&event).unwrap();
        assert_eq!(h.notifier.forecasts.get(), 1);
        assert_eq!(h.notifier.your_turns.get(), 0);
    }

    #[test]
    fn opponent_move_plays_premove_before_notifying() {
        let mut h = Harness::with_snapshot(|s| {
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        h.board.premove_queued.set(true);
        let event = move_event(2, "e5", "e7e5");
        h.ctrl.api_move(&event).unwrap();
        assert_eq!(h.board.premoves_played.get(), 1);
        assert_eq!(h.notifier.your_turns.get(), 0);
    }

    #[test]
    fn opponent_move_without_premove_notifies_your_turn() {
        let mut h = Harness::with_snapshot(|s| {
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        let event = move_event(2, "e5", "e7e5");
        h.ctrl.api_move(&event).unwrap();
        assert_eq!(h.notifier.your_turns.get(), 1);
    }

    #[test]
    fn clock_snapshot_corrects_the_driver() {
        let mut h = Harness::with_snapshot(|s| {
            s.clock = Some(clock_data(60.0, 60.0));
        });
        let mut event = move_event(1, "e4", "e2e4");
        event.clock = Some(crate::models::messages::ClockData {
            white: 57.0,
            black: 60.0,
        });
        h.ctrl.api_move(&event).unwrap();
        let clock = h.ctrl.clock().unwrap();
        assert_eq!(clock.seconds_of(Color::White), 57.0);
        assert_eq!(clock.seconds_of(Color::Black), 60.0);
    }

    #[test]
    fn capture_and_check_cues_are_classified() {
        let mut h = Harness::playing();
        h.board.place(Square::D5, Piece::Pawn, Color::Black);
        let mut event = move_event(1, "exd5+", "e4d5");
        event.check = true;
        h.ctrl.api_move(&event).unwrap();
        let cues = h.notifier.cues.borrow();
        assert!(cues.contains(&SoundCue::Capture));
        assert!(cues.contains(&SoundCue::Check));
    }

    #[test]
    fn atomic_capture_explodes_adjacent_pieces_before_premove() {
        let mut h = Harness::with_snapshot(|s| {
            s.game.variant = Variant::Atomic;
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        h.board.place(Square::E4, Piece::Pawn, Color::White);
        h.board.place(Square::D5, Piece::Pawn, Color::Black);
        h.board.place(Square::F5, Piece::Knight, Color::White);
        h.board.place(Square::E5, Piece::Pawn, Color::White);
        h.board.premove_queued.set(true);

        let event = move_event(2, "dxe4", "d5e4");
        h.ctrl.api_move(&event).unwrap();

        // capture square cleared, adjacent knight gone, adjacent pawn spared
        assert!(h.board.piece_at_pub(Square::E4).is_none());
        assert!(h.board.piece_at_pub(Square::F5).is_none());
        assert!(h.board.piece_at_pub(Square::E5).is_some());
        assert!(h.notifier.cues.borrow().contains(&SoundCue::Explosion));
        // the explosion was applied synchronously before the premove ran
        assert_eq!(h.board.premoves_played.get(), 1);
    }

    #[test]
    fn drop_event_places_a_reserve_piece() {
        let mut h = Harness::with_snapshot(|s| {
            s.game.variant = Variant::Crazyhouse;
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        let event = move_event(2, "N@f6", "N@f6");
        h.ctrl.api_move(&event).unwrap();
        let placed = h.board.new_pieces.borrow();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].1, Square::F6);
        assert_eq!(placed[0].0.role, Piece::Knight);
        assert_eq!(placed[0].0.color, Color::Black);
    }

    #[test]
    fn game_end_event_updates_status_and_winner() {
        let mut h = Harness::playing();
        let mut event = move_event(1, "e4#", "e2e4");
        event.status = Some(GameStatus::Mate);
        event.winner = Some("white".to_string());
        h.ctrl.api_move(&event).unwrap();
        assert_eq!(h.ctrl.data().game.status, GameStatus::Mate);
        assert_eq!(h.ctrl.data().game.winner, Some(Color::White));
        assert!(!h.ctrl.is_clock_running());
    }

    #[test]
    fn mover_side_is_marked_present() {
        let mut h = Harness::with_snapshot(|s| {
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
            s.opponent.on_game = false;
        });
        let event = move_event(2, "e5", "e7e5");
        h.ctrl.api_move(&event).unwrap();
        assert!(h.ctrl.data().opponent.on_game);
    }

    #[test]
    fn fingerprint_is_a_function_of_the_event_sequence() {
        let run = || {
            let mut h = Harness::playing();
            h.ctrl.api_move(&move_event(1, "e4", "e2e4")).unwrap();
            h.ctrl.api_move(&move_event(2, "e5", "e7e5")).unwrap();
            h.ctrl.api_move(&move_event(3, "Nf3", "g1f3")).unwrap();
            h.ctrl.data().steps.fingerprint()
        };
        assert_eq!(run(), run());
        assert_eq!(run(), "e4e5Nf3");
    }

    #[test]
    fn dests_only_apply_when_it_becomes_our_turn() {
        let mut h = Harness::with_snapshot(|s| {
            s.steps.push(step(1, "e4", "e2e4"));
            s.game.turns = 1;
            s.game.player = "black".to_string();
        });
        let mut event = move_event(2, "e5", "e7e5");
        event.dests = Some(
            [("g1".to_string(), vec!["f3".to_string(), "h3".to_string()])]
                .into_iter()
                .collect(),
        );
        h.ctrl.api_move(&event).unwrap();
        let dests = h.ctrl.data().possible_moves.as_ref().unwrap();
        assert_eq!(dests[&Square::G1], vec![Square::F3, Square::H3]);
    }
}
