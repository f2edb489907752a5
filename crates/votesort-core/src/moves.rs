//! The move engine: validates player intents and applies them to a session.
//!
//! Every intent is checked in full before state is touched, so a rejected
//! intent always leaves the session exactly as it was.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{AnswerId, MatchPuzzle, PairPuzzle, PuzzleInstance, RankPuzzle};
use crate::state::{MatchState, PairState, Phase, PuzzleState, RankState};

/// A discrete player action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "kebab-case")]
pub enum Intent {
    /// Choose (matcher) or focus (pairing) a question.
    SelectQuestion { id: String },
    /// Pair an answer with the focused question.
    SelectAnswer { id: AnswerId },
    /// Replace the ranker order with a full permutation.
    Reorder { order: Vec<AnswerId> },
    /// Move the answer at `from` so it lands at `to`.
    Move { from: usize, to: usize },
    Submit,
    /// Handled by [`crate::engine::GameEngine`], never by [`apply`].
    NewGame,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SelectQuestion { .. } => "select-question",
            Intent::SelectAnswer { .. } => "select-answer",
            Intent::Reorder { .. } => "reorder",
            Intent::Move { .. } => "move",
            Intent::Submit => "submit",
            Intent::NewGame => "new-game",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Feedback from a ranker submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankFeedback {
    /// Attempt number of this submission, starting at 1.
    pub attempt: u32,
    /// Answers at their correct position in this submission.
    pub correct_positions: usize,
    /// Answers locked by this submission that were not locked before.
    pub newly_locked: usize,
    pub locked_total: usize,
    pub total: usize,
    /// No further moves are accepted.
    pub finished: bool,
}

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum MoveOutcome {
    Selected {
        question: String,
    },
    Focused {
        question: String,
    },
    Assigned {
        question: String,
        answer: AnswerId,
        /// Question that held this answer before and lost it.
        displaced: Option<String>,
    },
    Reordered {
        order: Vec<AnswerId>,
    },
    Submitted,
    Ranked(RankFeedback),
    NewGame,
}

/// Apply `intent` to `state`.
pub fn apply(
    instance: &PuzzleInstance,
    state: &mut PuzzleState,
    intent: &Intent,
) -> Result<MoveOutcome, EngineError> {
    match (instance, state) {
        (PuzzleInstance::Match(p), PuzzleState::Match(s)) => apply_match(p, s, intent),
        (PuzzleInstance::Pair(p), PuzzleState::Pair(s)) => apply_pair(p, s, intent),
        (PuzzleInstance::Rank(p), PuzzleState::Rank(s)) => apply_rank(p, s, intent),
        _ => Err(EngineError::illegal(
            "state does not belong to this puzzle",
        )),
    }
}

fn ensure_active(phase: Phase) -> Result<(), EngineError> {
    match phase {
        Phase::Active => Ok(()),
        Phase::Submitted => Err(EngineError::illegal("puzzle already submitted")),
        Phase::Completed => Err(EngineError::illegal("puzzle already completed")),
    }
}

fn not_supported(intent: &Intent, kind: &str) -> EngineError {
    if matches!(intent, Intent::NewGame) {
        return EngineError::illegal("new games are started by the session controller");
    }
    EngineError::illegal(format!("{intent} is not valid for a {kind} puzzle"))
}

// ---------------------------------------------------------------------------
// Matcher-single
// ---------------------------------------------------------------------------

fn apply_match(
    puzzle: &MatchPuzzle,
    state: &mut MatchState,
    intent: &Intent,
) -> Result<MoveOutcome, EngineError> {
    match intent {
        Intent::SelectQuestion { id } => {
            ensure_active(state.phase)?;
            if puzzle.choice(id).is_none() {
                return Err(EngineError::illegal(format!("unknown question {id}")));
            }
            state.selection = Some(id.clone());
            Ok(MoveOutcome::Selected {
                question: id.clone(),
            })
        }
        Intent::Submit => {
            ensure_active(state.phase)?;
            if state.selection.is_none() {
                return Err(EngineError::illegal(
                    "select a question before submitting",
                ));
            }
            state.phase = Phase::Submitted;
            Ok(MoveOutcome::Submitted)
        }
        other => Err(not_supported(other, "match")),
    }
}

// ---------------------------------------------------------------------------
// Matcher-multi
// ---------------------------------------------------------------------------

fn apply_pair(
    puzzle: &PairPuzzle,
    state: &mut PairState,
    intent: &Intent,
) -> Result<MoveOutcome, EngineError> {
    match intent {
        Intent::SelectQuestion { id } => {
            ensure_active(state.phase)?;
            if puzzle.question_index(id).is_none() {
                return Err(EngineError::illegal(format!("unknown question {id}")));
            }
            if state.focus.as_deref() != Some(id.as_str()) {
                state.focus = Some(id.clone());
            }
            Ok(MoveOutcome::Focused {
                question: id.clone(),
            })
        }
        Intent::SelectAnswer { id } => {
            ensure_active(state.phase)?;
            let Some(question) = state.focus.clone() else {
                return Err(EngineError::NoFocus);
            };
            if puzzle.answer(*id).is_none() {
                return Err(EngineError::illegal(format!("unknown answer {id}")));
            }

            let displaced = state
                .question_for(*id)
                .filter(|q| *q != question)
                .map(str::to_string);
            if let Some(previous) = &displaced {
                state.assignments.remove(previous);
            }
            state.assignments.insert(question.clone(), *id);
            state.focus = None;

            Ok(MoveOutcome::Assigned {
                question,
                answer: *id,
                displaced,
            })
        }
        Intent::Submit => {
            ensure_active(state.phase)?;
            let total = puzzle.questions.len();
            if state.assignments.len() != total {
                return Err(EngineError::illegal(format!(
                    "{} of {total} questions paired",
                    state.assignments.len()
                )));
            }
            state.phase = Phase::Submitted;
            state.focus = None;
            Ok(MoveOutcome::Submitted)
        }
        other => Err(not_supported(other, "pair")),
    }
}

// ---------------------------------------------------------------------------
// Ranker
// ---------------------------------------------------------------------------

fn apply_rank(
    puzzle: &RankPuzzle,
    state: &mut RankState,
    intent: &Intent,
) -> Result<MoveOutcome, EngineError> {
    match intent {
        Intent::Reorder { order } => {
            ensure_active(state.phase)?;
            check_reorder(state, order)?;
            state.current_order = order.clone();
            Ok(MoveOutcome::Reordered {
                order: order.clone(),
            })
        }
        Intent::Move { from, to } => {
            ensure_active(state.phase)?;
            let order = plan_move(state, *from, *to)?;
            check_reorder(state, &order)?;
            state.current_order = order.clone();
            Ok(MoveOutcome::Reordered { order })
        }
        Intent::Submit => {
            ensure_active(state.phase)?;
            Ok(MoveOutcome::Ranked(submit_rank(puzzle, state)))
        }
        other => Err(not_supported(other, "rank")),
    }
}

/// A reorder must be a permutation of the current order that leaves every
/// locked answer where it is.
fn check_reorder(state: &RankState, order: &[AnswerId]) -> Result<(), EngineError> {
    let current: HashSet<AnswerId> = state.current_order.iter().copied().collect();
    let proposed: HashSet<AnswerId> = order.iter().copied().collect();
    if order.len() != state.current_order.len() || proposed.len() != order.len() || proposed != current
    {
        return Err(EngineError::illegal(
            "reorder must be a permutation of the presented answers",
        ));
    }

    for (position, (now, next)) in state.current_order.iter().zip(order).enumerate() {
        if now != next && (state.locked.contains(now) || state.locked.contains(next)) {
            return Err(EngineError::LockedPositionViolation { position });
        }
    }
    Ok(())
}

/// Remove the answer at `from`, insert it at `to`, then put locked answers
/// back in their fixed slots and fill the rest with the unlocked answers in
/// their new relative order.
fn plan_move(state: &RankState, from: usize, to: usize) -> Result<Vec<AnswerId>, EngineError> {
    let len = state.current_order.len();
    if from >= len || to >= len {
        return Err(EngineError::illegal(format!(
            "positions must be below {len}, got {from} -> {to}"
        )));
    }
    if state.is_locked_at(from) {
        return Err(EngineError::LockedPositionViolation { position: from });
    }
    if state.is_locked_at(to) {
        return Err(EngineError::LockedPositionViolation { position: to });
    }

    let mut moved = state.current_order.clone();
    let id = moved.remove(from);
    moved.insert(to, id);

    let mut unlocked = moved.into_iter().filter(|id| !state.locked.contains(id));
    let mut order = Vec::with_capacity(len);
    for current in &state.current_order {
        if state.locked.contains(current) {
            order.push(*current);
        } else if let Some(next) = unlocked.next() {
            order.push(next);
        }
    }
    Ok(order)
}

fn submit_rank(puzzle: &RankPuzzle, state: &mut RankState) -> RankFeedback {
    state.attempts += 1;
    let truth = puzzle.ground_truth();
    let total = truth.len();

    let correct: Vec<AnswerId> = state
        .current_order
        .iter()
        .zip(&truth)
        .filter(|(now, want)| now == want)
        .map(|(now, _)| *now)
        .collect();

    let mut newly_locked = 0;
    if puzzle.locking {
        for id in &correct {
            if state.locked.insert(*id) {
                newly_locked += 1;
            }
        }
        if state.locked.len() == total {
            state.phase = Phase::Completed;
            tracing::info!(attempts = state.attempts, "ranking completed");
        }
    } else {
        state.phase = Phase::Submitted;
    }

    RankFeedback {
        attempt: state.attempts,
        correct_positions: correct.len(),
        newly_locked,
        locked_total: state.locked.len(),
        total,
        finished: state.phase.is_finished(),
    }
}
