//! Mutable per-session puzzle state.
//!
//! State is only changed through [`crate::moves::apply`], which validates an
//! intent completely before touching anything.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{AnswerId, PuzzleInstance};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Accepting moves.
    Active,
    /// A matcher or single-attempt ranker was submitted.
    Submitted,
    /// Every ranker position is locked.
    Completed,
}

impl Phase {
    pub fn is_finished(self) -> bool {
        !matches!(self, Phase::Active)
    }
}

/// Matcher-single state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchState {
    pub(crate) selection: Option<String>,
    pub(crate) phase: Phase,
}

impl MatchState {
    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }
}

/// Matcher-multi state. `assignments` is always a partial bijection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairState {
    pub(crate) focus: Option<String>,
    pub(crate) assignments: BTreeMap<String, AnswerId>,
    pub(crate) phase: Phase,
}

impl PairState {
    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn assignments(&self) -> &BTreeMap<String, AnswerId> {
        &self.assignments
    }

    pub fn assigned_answer(&self, question_id: &str) -> Option<AnswerId> {
        self.assignments.get(question_id).copied()
    }

    /// The question currently holding `answer`, if any.
    pub fn question_for(&self, answer: AnswerId) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(_, a)| **a == answer)
            .map(|(q, _)| q.as_str())
    }
}

/// Ranker state. Locks are keyed by answer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankState {
    pub(crate) current_order: Vec<AnswerId>,
    pub(crate) locked: BTreeSet<AnswerId>,
    pub(crate) attempts: u32,
    pub(crate) phase: Phase,
}

impl RankState {
    pub fn current_order(&self) -> &[AnswerId] {
        &self.current_order
    }

    pub fn locked(&self) -> &BTreeSet<AnswerId> {
        &self.locked
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_locked_at(&self, position: usize) -> bool {
        self.current_order
            .get(position)
            .is_some_and(|id| self.locked.contains(id))
    }

    /// Positions currently occupied by locked answers.
    pub fn locked_positions(&self) -> Vec<usize> {
        (0..self.current_order.len())
            .filter(|&p| self.is_locked_at(p))
            .collect()
    }
}

/// The state of one session, matching its puzzle's variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum PuzzleState {
    Match(MatchState),
    Pair(PairState),
    Rank(RankState),
}

impl PuzzleState {
    /// Fresh state for a newly dealt puzzle.
    pub fn new(instance: &PuzzleInstance) -> Self {
        match instance {
            PuzzleInstance::Match(_) => PuzzleState::Match(MatchState {
                selection: None,
                phase: Phase::Active,
            }),
            PuzzleInstance::Pair(_) => PuzzleState::Pair(PairState {
                focus: None,
                assignments: BTreeMap::new(),
                phase: Phase::Active,
            }),
            PuzzleInstance::Rank(p) => PuzzleState::Rank(RankState {
                current_order: p.presented_order(),
                locked: BTreeSet::new(),
                attempts: 0,
                phase: Phase::Active,
            }),
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            PuzzleState::Match(s) => s.phase,
            PuzzleState::Pair(s) => s.phase,
            PuzzleState::Rank(s) => s.phase,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase().is_finished()
    }
}
