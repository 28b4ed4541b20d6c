use log::info;

use super::RoundCtrl;
use crate::clock::ClockDriver;
use crate::error::RoundError;
use crate::interface::Offer;
use crate::models::game_state::RoundData;
use crate::models::messages::GameSnapshot;

impl RoundCtrl {
    /// Merge a freshly fetched full snapshot after a reconnection.
    ///
    /// If the history fingerprint changed while disconnected the replay
    /// cursor is forced to the new live ply; otherwise in-progress
    /// history browsing is preserved. Offers that appeared while
    /// disconnected are surfaced exactly once: re-applying the same
    /// snapshot produces no flag transition, hence no repeat
    /// notification.
    pub fn reload(&mut self, snapshot: &GameSnapshot) -> Result<(), RoundError> {
        let new_data = RoundData::from_snapshot(snapshot)?;

        if new_data.steps.fingerprint() != self.data.steps.fingerprint() {
            info!(
                "history changed while disconnected, jumping to live ply {}",
                new_data.steps.last_ply()
            );
            self.ply = new_data.steps.last_ply();
        }

        let new_draw = !self.data.opponent.offering_draw && new_data.opponent.offering_draw;
        let new_takeback =
            !self.data.opponent.proposing_takeback && new_data.opponent.proposing_takeback;
        let new_rematch = !self.data.opponent.offering_rematch && new_data.opponent.offering_rematch;

        self.data = new_data;
        if self.data.player.berserk {
            self.gone_berserk.set(self.data.player.color);
        }
        if self.data.opponent.berserk {
            self.gone_berserk.set(self.data.opponent.color);
        }

        if self.clock.is_none() {
            self.clock = ClockDriver::from_data(&self.data);
        } else if let Some(clock) = &mut self.clock {
            if let Some(c) = &self.data.clock {
                clock.update(c.white, c.black);
            } else if let Some(c) = &self.data.correspondence {
                clock.update(c.white, c.black);
            }
        }

        // arbitrarily many plies may have been missed: reload the whole
        // position, not just a last move
        if !self.replaying() {
            let config = self.board_config_for(self.ply)?;
            self.board.set(config);
        }
        self.update_quiet();
        self.notifier.advance_forecast();
        self.notifier.state_changed();

        if new_draw {
            self.notifier.offer_received(Offer::Draw);
        }
        if new_takeback {
            self.notifier.offer_received(Offer::Takeback);
        }
        if new_rematch {
            self.notifier.offer_received(Offer::Rematch);
        }
        Ok(())
    }
}
