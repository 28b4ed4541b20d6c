use serde::{Deserialize, Serialize};

use crate::error::RoundError;

/// Crazyhouse pocket contents carried on a step: piece role names, one
/// entry per captured piece held in reserve.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Pocket {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

/// One half-move of recorded history.
///
/// The first step of a game carries the initial position and no move
/// notation. Steps are immutable once appended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Step {
    pub ply: u32,
    pub fen: String,
    #[serde(default)]
    pub san: Option<String>,
    #[serde(default)]
    pub uci: Option<String>,
    #[serde(default)]
    pub check: bool,
    #[serde(default)]
    pub crazy: Option<Pocket>,
}

/// Append-only ordered move history.
///
/// Ply values are strictly increasing by one from the first step to the
/// last. Steps are only ever appended on the live path; the whole log is
/// replaced wholesale during a reconnection merge.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StepLog {
    steps: Vec<Step>,
}

impl StepLog {
    /// Build a log from snapshot steps. Plies must already be strictly
    /// increasing by one; `step_at` indexes on that.
    pub fn new(steps: Vec<Step>) -> Self {
        for pair in steps.windows(2) {
            debug_assert_eq!(
                pair[1].ply,
                pair[0].ply + 1,
                "step log built out of order: {} after {}",
                pair[1].ply,
                pair[0].ply
            );
        }
        StepLog { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Ply of the initial recorded position.
    pub fn first_ply(&self) -> u32 {
        self.steps.first().map(|s| s.ply).unwrap_or(0)
    }

    /// Ply of the newest recorded position (the live ply).
    pub fn last_ply(&self) -> u32 {
        self.steps.last().map(|s| s.ply).unwrap_or(0)
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Append the next step. The caller always constructs the next ply
    /// itself, so a gap or repeat here is a programming error, not a
    /// user-facing failure.
    pub fn append(&mut self, step: Step) {
        if let Some(last) = self.steps.last() {
            assert_eq!(
                step.ply,
                last.ply + 1,
                "step log append out of order: {} after {}",
                step.ply,
                last.ply
            );
        }
        self.steps.push(step);
    }

    /// Look up the step for a ply inside [first_ply, last_ply].
    pub fn step_at(&self, ply: u32) -> Result<&Step, RoundError> {
        if self.steps.is_empty() || ply < self.first_ply() || ply > self.last_ply() {
            return Err(RoundError::StepNotFound(ply));
        }
        let idx = (ply - self.first_ply()) as usize;
        self.steps.get(idx).ok_or(RoundError::StepNotFound(ply))
    }

    /// Cheap content hash: the concatenation of all move notations.
    /// Used only to answer "did anything change" during a reconnection
    /// merge, never for correctness-critical decisions.
    pub fn fingerprint(&self) -> String {
        let mut h = String::new();
        for step in &self.steps {
            if let Some(san) = &step.san {
                h.push_str(san);
            }
        }
        h
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}
