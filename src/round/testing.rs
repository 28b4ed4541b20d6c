//! Mock collaborators and snapshot fixtures shared by the round tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chess::{Color, Piece, Square};
use serde_json::Value;
use uuid::Uuid;

use crate::interface::{BoardConfig, BoardView, Notifier, Offer, PieceOn, SoundCue, Transport};
use crate::models::game_state::{GameStatus, Variant};
use crate::models::messages::{
    GameData, GameSnapshot, MoveEvent, RealTimeClockData, SideData,
};
use crate::models::steps::Step;
use crate::round::RoundCtrl;

pub(crate) const START_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub(crate) struct SentMsg {
    pub event: String,
    pub payload: Value,
    pub ackable: bool,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    pub sent: Rc<RefCell<Vec<SentMsg>>>,
}

impl Transport for RecordingTransport {
    fn send(&mut self, event: &str, payload: Value, ackable: bool) {
        self.sent.borrow_mut().push(SentMsg {
            event: event.to_string(),
            payload,
            ackable,
        });
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeBoard {
    pieces: Rc<RefCell<HashMap<Square, PieceOn>>>,
    pub configs: Rc<RefCell<Vec<BoardConfig>>>,
    pub stops: Rc<Cell<u32>>,
    pub api_moves: Rc<RefCell<Vec<(Square, Square)>>>,
    pub new_pieces: Rc<RefCell<Vec<(PieceOn, Square)>>>,
    pub premove_queued: Rc<Cell<bool>>,
    pub premoves_played: Rc<Cell<u32>>,
    pub premoves_cancelled: Rc<Cell<u32>>,
}

impl FakeBoard {
    pub fn place(&self, at: Square, role: Piece, color: Color) {
        self.pieces.borrow_mut().insert(at, PieceOn { role, color });
    }

    pub fn piece_at_pub(&self, at: Square) -> Option<PieceOn> {
        self.pieces.borrow().get(&at).copied()
    }
}

impl BoardView for FakeBoard {
    fn set(&mut self, config: BoardConfig) {
        self.configs.borrow_mut().push(config);
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
    }

    fn api_move(&mut self, from: Square, to: Square) {
        self.api_moves.borrow_mut().push((from, to));
        let mut pieces = self.pieces.borrow_mut();
        if let Some(piece) = pieces.remove(&from) {
            pieces.insert(to, piece);
        }
    }

    fn new_piece(&mut self, piece: PieceOn, at: Square) {
        self.new_pieces.borrow_mut().push((piece, at));
        self.pieces.borrow_mut().insert(at, piece);
    }

    fn set_pieces(&mut self, changes: Vec<(Square, Option<PieceOn>)>) {
        let mut pieces = self.pieces.borrow_mut();
        for (square, piece) in changes {
            match piece {
                Some(piece) => {
                    pieces.insert(square, piece);
                }
                None => {
                    pieces.remove(&square);
                }
            }
        }
    }

    fn piece_at(&self, at: Square) -> Option<PieceOn> {
        self.pieces.borrow().get(&at).copied()
    }

    fn play_premove(&mut self) -> bool {
        if self.premove_queued.get() {
            self.premove_queued.set(false);
            self.premoves_played.set(self.premoves_played.get() + 1);
            true
        } else {
            false
        }
    }

    fn cancel_premove(&mut self) {
        self.premove_queued.set(false);
        self.premoves_cancelled.set(self.premoves_cancelled.get() + 1);
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    pub cues: Rc<RefCell<Vec<SoundCue>>>,
    pub your_turns: Rc<Cell<u32>>,
    pub offers: Rc<RefCell<Vec<Offer>>>,
    pub forecasts: Rc<Cell<u32>>,
    pub redraws: Rc<Cell<u32>>,
}

impl Notifier for RecordingNotifier {
    fn sound(&mut self, cue: SoundCue) {
        self.cues.borrow_mut().push(cue);
    }

    fn your_turn(&mut self) {
        self.your_turns.set(self.your_turns.get() + 1);
    }

    fn offer_received(&mut self, offer: Offer) {
        self.offers.borrow_mut().push(offer);
    }

    fn advance_forecast(&mut self) {
        self.forecasts.set(self.forecasts.get() + 1);
    }

    fn state_changed(&mut self) {
        self.redraws.set(self.redraws.get() + 1);
    }
}

fn side(color: &str) -> SideData {
    SideData {
        color: color.to_string(),
        ai: false,
        spectator: false,
        offering_draw: false,
        proposing_takeback: false,
        offering_rematch: false,
        on_game: true,
        berserk: false,
    }
}

fn initial_step() -> Step {
    Step {
        ply: 0,
        fen: START_FEN.to_string(),
        san: None,
        uci: None,
        check: false,
        crazy: None,
    }
}

pub(crate) fn step(ply: u32, san: &str, uci: &str) -> Step {
    Step {
        ply,
        fen: format!("fen-{}", ply),
        san: Some(san.to_string()),
        uci: Some(uci.to_string()),
        check: false,
        crazy: None,
    }
}

pub(crate) fn clock_data(white: f64, black: f64) -> RealTimeClockData {
    RealTimeClockData {
        white,
        black,
        initial: white,
        increment: 0.0,
        running: false,
    }
}

/// Viewer plays white, game just started, white to move.
pub(crate) fn base_snapshot() -> GameSnapshot {
    GameSnapshot {
        game: GameData {
            id: Uuid::nil(),
            variant: Variant::Standard,
            turns: 0,
            started_at_turn: 0,
            player: "white".to_string(),
            status: GameStatus::Started,
            winner: None,
            threefold: false,
        },
        player: side("white"),
        opponent: side("black"),
        steps: vec![initial_step()],
        clock: None,
        correspondence: None,
        possible_moves: None,
        possible_drops: None,
        pref: None,
        forecast_count: None,
    }
}

/// A snapshot with a deterministic history up to `last` plies, so two
/// builds of the same length share a fingerprint.
pub(crate) fn snapshot_with_steps_to(last: u32) -> GameSnapshot {
    let mut snapshot = base_snapshot();
    for ply in 1..=last {
        snapshot.steps.push(step(ply, &format!("m{}", ply), "e2e4"));
    }
    snapshot.game.turns = last;
    snapshot.game.player = if last % 2 == 0 { "white" } else { "black" }.to_string();
    snapshot
}

pub(crate) fn move_event(ply: u32, san: &str, uci: &str) -> MoveEvent {
    MoveEvent {
        ply,
        fen: format!("fen-{}", ply),
        san: san.to_string(),
        uci: uci.to_string(),
        check: false,
        status: None,
        winner: None,
        w_draw: false,
        b_draw: false,
        dests: None,
        drops: None,
        enpassant: None,
        promotion: None,
        castle: None,
        clock: None,
        threefold: false,
        crazyhouse: None,
    }
}

/// A controller wired to recording mocks, with the mock handles kept
/// for assertions.
pub(crate) struct Harness {
    pub ctrl: RoundCtrl,
    pub transport: RecordingTransport,
    pub board: FakeBoard,
    pub notifier: RecordingNotifier,
}

impl Harness {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Harness {
        // opt into engine logs with RUST_LOG=debug
        let _ = env_logger::builder().is_test(true).try_init();
        let transport = RecordingTransport::default();
        let board = FakeBoard::default();
        let notifier = RecordingNotifier::default();
        let ctrl = RoundCtrl::new(
            snapshot,
            Box::new(transport.clone()),
            Box::new(board.clone()),
            Box::new(notifier.clone()),
        )
        .unwrap();
        Harness {
            ctrl,
            transport,
            board,
            notifier,
        }
    }

    pub fn playing() -> Harness {
        Harness::from_snapshot(&base_snapshot())
    }

    pub fn with_snapshot(adjust: impl FnOnce(&mut GameSnapshot)) -> Harness {
        let mut snapshot = base_snapshot();
        adjust(&mut snapshot);
        Harness::from_snapshot(&snapshot)
    }

    pub fn with_steps_to(last: u32) -> Harness {
        Harness::from_snapshot(&snapshot_with_steps_to(last))
    }
}
