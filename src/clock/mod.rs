use std::time::Instant;

use chess::Color;
use log::debug;

use crate::models::game_state::RoundData;

/// Remaining time per color, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Remaining {
    white: f64,
    black: f64,
}

impl Remaining {
    fn of(&self, color: Color) -> f64 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    fn subtract(&mut self, color: Color, delta: f64) {
        match color {
            Color::White => self.white = (self.white - delta).max(0.0),
            Color::Black => self.black = (self.black - delta).max(0.0),
        }
    }
}

/// Real-time countdown clock, ticked at a ~100ms host cadence. Each
/// tick subtracts the wall-clock time elapsed since the previous tick,
/// so the display stays smooth regardless of timer jitter.
#[derive(Debug, Clone)]
pub struct RealTimeClock {
    remaining: Remaining,
    last_tick: Option<Instant>,
}

impl RealTimeClock {
    fn new(white: f64, black: f64) -> Self {
        RealTimeClock {
            remaining: Remaining { white, black },
            last_tick: None,
        }
    }

    fn tick(&mut self, color: Color) {
        let now = Instant::now();
        if let Some(last) = self.last_tick {
            self.remaining.subtract(color, now.duration_since(last).as_secs_f64());
        }
        self.last_tick = Some(now);
    }

    fn update(&mut self, white: f64, black: f64) {
        self.remaining = Remaining { white, black };
        // restart interpolation from the corrected values
        self.last_tick = Some(Instant::now());
    }
}

/// Correspondence clock, ticked at a ~1s host cadence with days-scale
/// remaining times. One second is subtracted per tick.
#[derive(Debug, Clone)]
pub struct CorrespondenceClock {
    remaining: Remaining,
}

impl CorrespondenceClock {
    fn new(white: f64, black: f64) -> Self {
        CorrespondenceClock {
            remaining: Remaining { white, black },
        }
    }

    fn tick(&mut self, color: Color) {
        self.remaining.subtract(color, 1.0);
    }

    fn update(&mut self, white: f64, black: f64) {
        self.remaining = Remaining { white, black };
    }
}

/// Exactly one clock variant exists per game, decided at construction
/// and never switched. Real-time wins when the snapshot carries both
/// configurations.
#[derive(Debug, Clone)]
pub enum ClockDriver {
    RealTime(RealTimeClock),
    Correspondence(CorrespondenceClock),
}

impl ClockDriver {
    /// Build the driver for this game, or `None` for unlimited games
    /// with no clock at all.
    pub fn from_data(data: &RoundData) -> Option<ClockDriver> {
        if let Some(c) = &data.clock {
            debug!("real-time clock: {}s + {}s", c.initial, c.increment);
            return Some(ClockDriver::RealTime(RealTimeClock::new(c.white, c.black)));
        }
        if let Some(c) = &data.correspondence {
            debug!("correspondence clock: {} days per turn", c.days_per_turn);
            return Some(ClockDriver::Correspondence(CorrespondenceClock::new(
                c.white, c.black,
            )));
        }
        None
    }

    /// Advance the running side's displayed time by one local step.
    /// Callers gate this on the game-state running check; the driver
    /// itself only adjusts displayed values.
    pub fn tick(&mut self, color_to_move: Color) {
        match self {
            ClockDriver::RealTime(c) => c.tick(color_to_move),
            ClockDriver::Correspondence(c) => c.tick(color_to_move),
        }
    }

    /// Correction hook: authoritative server values overwrite whatever
    /// local ticking accumulated.
    pub fn update(&mut self, white: f64, black: f64) {
        match self {
            ClockDriver::RealTime(c) => c.update(white, black),
            ClockDriver::Correspondence(c) => c.update(white, black),
        }
    }

    /// Remaining seconds for one side.
    pub fn seconds_of(&self, color: Color) -> f64 {
        match self {
            ClockDriver::RealTime(c) => c.remaining.of(color),
            ClockDriver::Correspondence(c) => c.remaining.of(color),
        }
    }

    pub fn is_real_time(&self) -> bool {
        matches!(self, ClockDriver::RealTime(_))
    }
}
