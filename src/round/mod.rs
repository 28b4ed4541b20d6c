use chess::Color;
use log::info;
use serde_json::json;

use crate::clock::ClockDriver;
use crate::error::RoundError;
use crate::game::utils::{
    color_to_move_at, color_to_string, is_player_playing, playable, san_sound_cues,
    uci_to_last_move,
};
use crate::interface::{BoardConfig, BoardView, Movable, Notifier, SoundCue, Transport};
use crate::models::game_state::{GoneBerserk, RoundData};
use crate::models::messages::{GameSnapshot, MoveMessage};

mod reload;
mod submit;
mod sync;
#[cfg(test)]
pub(crate) mod testing;

pub use submit::UserMove;

/// Controller for one live game view.
///
/// Owns all round state for the lifetime of the view and mutates it in
/// reaction to exactly three stimuli: a user action, an inbound
/// authoritative event, or a clock tick. Each stimulus is processed to
/// completion before the next; collaborators never observe a
/// half-applied update.
pub struct RoundCtrl {
    data: RoundData,
    /// Replay cursor: the ply the viewer is looking at.
    ply: u32,
    clock: Option<ClockDriver>,
    /// At most one move staged for two-phase confirmation.
    move_to_submit: Option<MoveMessage>,
    resign_confirm: bool,
    gone_berserk: GoneBerserk,
    /// Out-of-time already reported for this game.
    flagged: bool,
    quiet: bool,
    transport: Box<dyn Transport>,
    board: Box<dyn BoardView>,
    notifier: Box<dyn Notifier>,
}

impl RoundCtrl {
    pub fn new(
        snapshot: &GameSnapshot,
        transport: Box<dyn Transport>,
        board: Box<dyn BoardView>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, RoundError> {
        let data = RoundData::from_snapshot(snapshot)?;
        let mut gone_berserk = GoneBerserk::default();
        if data.player.berserk {
            gone_berserk.set(data.player.color);
        }
        if data.opponent.berserk {
            gone_berserk.set(data.opponent.color);
        }
        let clock = ClockDriver::from_data(&data);
        let ply = data.steps.last_ply();
        let mut ctrl = RoundCtrl {
            data,
            ply,
            clock,
            move_to_submit: None,
            resign_confirm: false,
            gone_berserk,
            flagged: false,
            quiet: false,
            transport,
            board,
            notifier,
        };
        ctrl.quiet = is_player_playing(&ctrl.data);
        let config = ctrl.board_config_for(ctrl.ply)?;
        ctrl.board.set(config);
        info!(
            "round {} initialized at ply {}",
            ctrl.data.game.id, ctrl.ply
        );
        Ok(ctrl)
    }

    pub fn data(&self) -> &RoundData {
        &self.data
    }

    /// The ply the viewer is looking at.
    pub fn current_ply(&self) -> u32 {
        self.ply
    }

    pub fn last_ply(&self) -> u32 {
        self.data.steps.last_ply()
    }

    pub fn clock(&self) -> Option<&ClockDriver> {
        self.clock.as_ref()
    }

    /// The viewer is browsing history rather than watching the live
    /// position.
    pub fn replaying(&self) -> bool {
        self.ply != self.data.steps.last_ply()
    }

    /// Replaying while the game is still in progress: the UI should
    /// warn that the viewed position is stale.
    pub fn is_late(&self) -> bool {
        self.replaying() && playable(&self.data)
    }

    /// Build the render descriptor for a recorded ply. Interactivity is
    /// only granted at the live ply.
    fn board_config_for(&self, ply: u32) -> Result<BoardConfig, RoundError> {
        let step = self.data.steps.step_at(ply)?;
        let mut config = BoardConfig {
            fen: Some(step.fen.clone()),
            last_move: step.uci.as_deref().and_then(uci_to_last_move),
            check: step.check,
            turn_color: Some(color_to_move_at(ply)),
            movable: None,
        };
        if ply == self.data.steps.last_ply() {
            config.movable = Some(Movable {
                color: if is_player_playing(&self.data) {
                    Some(self.data.player.color)
                } else {
                    None
                },
                dests: self.data.possible_moves.clone().unwrap_or_default(),
            });
        }
        Ok(config)
    }

    /// Move the replay cursor. Out-of-range plies are a no-op returning
    /// false; in range, the board is re-rendered for that ply, frozen
    /// unless it is the live one, and the move's sound cues are
    /// classified for the sound collaborator.
    pub fn jump(&mut self, ply: u32) -> bool {
        let steps = &self.data.steps;
        if steps.is_empty() || ply < steps.first_ply() || ply > steps.last_ply() {
            return false;
        }
        self.ply = ply;
        let config = match self.board_config_for(ply) {
            Ok(config) => config,
            Err(_) => return false,
        };
        let san = self
            .data
            .steps
            .step_at(ply)
            .ok()
            .and_then(|s| s.san.clone());
        if self.replaying() {
            self.board.stop();
        }
        self.board.set(config);
        if let Some(san) = san {
            for cue in san_sound_cues(&san) {
                self.notifier.sound(cue);
            }
        }
        true
    }

    /// Whether the clock should be counting down right now. A
    /// real-time clock only runs once more than one ply has elapsed
    /// from the game start, or once the server marked it running; a
    /// correspondence clock runs whenever the game is playable.
    pub fn is_clock_running(&self) -> bool {
        match &self.clock {
            Some(ClockDriver::RealTime(_)) => {
                playable(&self.data)
                    && (self.data.game.turns.saturating_sub(self.data.game.started_at_turn) > 1
                        || self.data.clock.as_ref().is_some_and(|c| c.running))
            }
            Some(ClockDriver::Correspondence(_)) => playable(&self.data),
            None => false,
        }
    }

    /// Recurring timer entry point (the host ticks at ~100ms for
    /// real-time clocks, ~1s for correspondence). A no-op while the
    /// clock is not running; never touches the step log or game state.
    pub fn clock_tick(&mut self) {
        if !self.is_clock_running() {
            return;
        }
        let color = self.data.game.player;
        if let Some(clock) = &mut self.clock {
            clock.tick(color);
            if clock.seconds_of(color) <= 0.0 && !self.flagged {
                self.flagged = true;
                info!("{} is out of time, reporting", color_to_string(color));
                self.transport.send("outoftime", json!({}), false);
            }
        }
    }

    /// Quiet mode: the host suppresses distractions while the viewer is
    /// actively playing. Recomputed on every game mutation.
    pub fn quiet_mode(&self) -> bool {
        self.quiet
    }

    pub(crate) fn update_quiet(&mut self) {
        self.quiet = is_player_playing(&self.data);
    }

    /// Accidental-navigation guard: the viewer is playing a real-time
    /// game and is low on time.
    pub fn suppress_navigation(&self) -> bool {
        self.quiet
            && self
                .clock
                .as_ref()
                .is_some_and(|c| c.is_real_time() && c.seconds_of(self.data.player.color) <= 300.0)
    }

    pub fn gone_berserk(&self, color: Color) -> bool {
        self.gone_berserk.get(color)
    }

    /// Record a berserk status. Monotonic: once set it stays set.
    pub fn set_berserk(&mut self, color: Color) {
        if self.gone_berserk.get(color) {
            return;
        }
        self.gone_berserk.set(color);
        self.notifier.state_changed();
    }

    /// The viewer goes berserk themselves.
    pub fn go_berserk(&mut self) {
        self.transport.send("berserk", json!(null), false);
        self.notifier.sound(SoundCue::Berserk);
    }

    /// Resign flow: with the confirm preference on, the first call arms
    /// a confirmation and the second fires it; `resign(false)` disarms.
    pub fn resign(&mut self, v: bool) {
        if self.resign_confirm {
            if v {
                self.transport.send("resign", json!(null), false);
            } else {
                self.resign_confirm = false;
            }
        } else if v {
            if self.data.prefs.confirm_resign {
                self.resign_confirm = true;
            } else {
                self.transport.send("resign", json!(null), false);
            }
        }
    }

    pub fn resign_confirm_armed(&self) -> bool {
        self.resign_confirm
    }

    /// Accept the opponent's takeback proposal. Any queued premove is
    /// stale once history rewinds, so it is cancelled.
    pub fn takeback_yes(&mut self) {
        self.transport.send("takeback-yes", json!(null), false);
        self.board.cancel_premove();
    }
}
