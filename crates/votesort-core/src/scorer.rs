//! Scoring a session against its puzzle's ground truth.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{MatchPuzzle, PairPuzzle, PuzzleInstance, RankPuzzle};
use crate::state::{MatchState, PairState, Phase, PuzzleState, RankState};

/// Matcher-single result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub correct: bool,
    pub selected_text: Option<String>,
    pub correct_text: String,
}

/// One row of a pairing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairLine {
    pub question: String,
    /// `None` when the question was left unpaired.
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
}

/// Matcher-multi result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairScore {
    pub correct_count: usize,
    pub total: usize,
    pub per_question: Vec<PairLine>,
}

/// How a finished ranking went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Right on the first attempt.
    Perfect,
    /// Solved within three attempts.
    Excellent,
    /// Solved eventually.
    Persistent,
}

impl Verdict {
    pub fn for_attempts(attempts: u32) -> Self {
        match attempts {
            0 | 1 => Verdict::Perfect,
            2 | 3 => Verdict::Excellent,
            _ => Verdict::Persistent,
        }
    }
}

/// Ranker result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankScore {
    pub attempts: u32,
    pub perfect: bool,
    pub completed: bool,
    pub correct_positions: usize,
    pub total: usize,
    /// `correct_positions / total` as a percentage.
    pub percentage: f64,
    pub verdict: Option<Verdict>,
}

/// A score for any variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum ScoreResult {
    Match(MatchScore),
    Pair(PairScore),
    Rank(RankScore),
}

/// Score `state` against `instance`.
pub fn score(instance: &PuzzleInstance, state: &PuzzleState) -> Result<ScoreResult, EngineError> {
    match (instance, state) {
        (PuzzleInstance::Match(p), PuzzleState::Match(s)) => Ok(ScoreResult::Match(score_match(p, s))),
        (PuzzleInstance::Pair(p), PuzzleState::Pair(s)) => Ok(ScoreResult::Pair(score_pair(p, s))),
        (PuzzleInstance::Rank(p), PuzzleState::Rank(s)) => Ok(ScoreResult::Rank(score_rank(p, s))),
        _ => Err(EngineError::illegal("state does not belong to this puzzle")),
    }
}

fn score_match(puzzle: &MatchPuzzle, state: &MatchState) -> MatchScore {
    let selected = state.selection().and_then(|id| puzzle.choice(id));
    MatchScore {
        correct: state.selection() == Some(puzzle.correct_question.id.as_str()),
        selected_text: selected.map(|q| q.text.clone()),
        correct_text: puzzle.correct_question.text.clone(),
    }
}

fn score_pair(puzzle: &PairPuzzle, state: &PairState) -> PairScore {
    let per_question: Vec<PairLine> = puzzle
        .questions
        .iter()
        .zip(&puzzle.truth)
        .map(|(question, &want)| {
            let chosen = state.assigned_answer(&question.id);
            PairLine {
                question: question.text.clone(),
                user_answer: chosen
                    .and_then(|id| puzzle.answer(id))
                    .map(|a| a.text.clone()),
                correct_answer: puzzle
                    .answer(want)
                    .map(|a| a.text.clone())
                    .unwrap_or_default(),
                correct: chosen == Some(want),
            }
        })
        .collect();

    PairScore {
        correct_count: per_question.iter().filter(|l| l.correct).count(),
        total: per_question.len(),
        per_question,
    }
}

fn score_rank(puzzle: &RankPuzzle, state: &RankState) -> RankScore {
    let truth = puzzle.ground_truth();
    let total = truth.len();
    let correct_positions = state
        .current_order()
        .iter()
        .zip(&truth)
        .filter(|(now, want)| now == want)
        .count();
    let percentage = if total == 0 {
        0.0
    } else {
        correct_positions as f64 / total as f64 * 100.0
    };

    let (completed, perfect, verdict) = if puzzle.locking {
        let completed = state.phase == Phase::Completed;
        let verdict = completed.then(|| Verdict::for_attempts(state.attempts()));
        (completed, completed && state.attempts() == 1, verdict)
    } else {
        let perfect = correct_positions == total;
        let completed = state.phase.is_finished();
        (completed, perfect, (completed && perfect).then_some(Verdict::Perfect))
    };

    RankScore {
        attempts: state.attempts(),
        perfect,
        completed,
        correct_positions,
        total,
        percentage,
        verdict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerId, PuzzleAnswer, QuestionRef, RankedAnswer};
    use crate::moves::{apply, Intent};

    fn q(id: &str) -> QuestionRef {
        QuestionRef {
            id: id.into(),
            text: format!("{id} text"),
        }
    }

    fn match_puzzle() -> PuzzleInstance {
        PuzzleInstance::Match(MatchPuzzle {
            correct_question: q("right"),
            answers: vec![],
            choices: vec![q("a"), q("right"), q("b"), q("c"), q("d")],
        })
    }

    fn pair_puzzle() -> PuzzleInstance {
        PuzzleInstance::Pair(PairPuzzle {
            questions: (0..5).map(|i| q(&format!("Q{i}"))).collect(),
            answers: [2, 4, 0, 3, 1]
                .into_iter()
                .map(|i| PuzzleAnswer {
                    id: AnswerId(i),
                    text: format!("A{i}"),
                    votes: 0,
                })
                .collect(),
            truth: (0..5).map(AnswerId).collect(),
        })
    }

    fn rank_puzzle(presented: &[usize], locking: bool) -> PuzzleInstance {
        PuzzleInstance::Rank(RankPuzzle {
            question: q("q"),
            answers: presented
                .iter()
                .map(|&i| RankedAnswer {
                    id: AnswerId(i),
                    text: format!("answer {i}"),
                    votes: 50 - i as i64,
                    original_rank: i,
                })
                .collect(),
            locking,
        })
    }

    fn pair(puzzle: &PuzzleInstance, state: &mut PuzzleState, question: &str, answer: usize) {
        apply(
            puzzle,
            state,
            &Intent::SelectQuestion {
                id: question.into(),
            },
        )
        .unwrap();
        apply(
            puzzle,
            state,
            &Intent::SelectAnswer {
                id: AnswerId(answer),
            },
        )
        .unwrap();
    }

    #[test]
    fn match_correct_iff_selection_is_correct_question() {
        let puzzle = match_puzzle();
        for (choice, expected) in [("right", true), ("b", false)] {
            let mut state = PuzzleState::new(&puzzle);
            apply(&puzzle, &mut state, &Intent::SelectQuestion { id: choice.into() }).unwrap();
            let ScoreResult::Match(score) = score(&puzzle, &state).unwrap() else {
                panic!("expected match score");
            };
            assert_eq!(score.correct, expected);
            assert_eq!(score.selected_text.as_deref(), Some(format!("{choice} text").as_str()));
            assert_eq!(score.correct_text, "right text");
        }
    }

    #[test]
    fn identity_pairing_scores_five() {
        let puzzle = pair_puzzle();
        let mut state = PuzzleState::new(&puzzle);
        for i in 0..5 {
            pair(&puzzle, &mut state, &format!("Q{i}"), i);
        }
        let ScoreResult::Pair(score) = score(&puzzle, &state).unwrap() else {
            panic!("expected pair score");
        };
        assert_eq!(score.correct_count, 5);
        assert!(score.per_question.iter().all(|l| l.correct));
    }

    #[test]
    fn partial_pairing_reports_none_for_unpaired() {
        let puzzle = pair_puzzle();
        let mut state = PuzzleState::new(&puzzle);
        pair(&puzzle, &mut state, "Q0", 0);
        pair(&puzzle, &mut state, "Q1", 2);

        let ScoreResult::Pair(score) = score(&puzzle, &state).unwrap() else {
            panic!("expected pair score");
        };
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total, 5);
        assert_eq!(score.per_question[1].user_answer.as_deref(), Some("A2"));
        assert_eq!(score.per_question[1].correct_answer, "A1");
        assert!(!score.per_question[1].correct);
        assert_eq!(score.per_question[4].user_answer, None);
    }

    #[test]
    fn first_try_ranking_is_perfect() {
        let puzzle = rank_puzzle(&[0, 1, 2], true);
        let mut state = PuzzleState::new(&puzzle);
        apply(&puzzle, &mut state, &Intent::Submit).unwrap();
        let ScoreResult::Rank(score) = score(&puzzle, &state).unwrap() else {
            panic!("expected rank score");
        };
        assert!(score.perfect);
        assert!(score.completed);
        assert_eq!(score.attempts, 1);
        assert_eq!(score.verdict, Some(Verdict::Perfect));
        assert!((score.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_over_several_attempts_is_not_perfect() {
        let puzzle = rank_puzzle(&[1, 0, 2], true);
        let mut state = PuzzleState::new(&puzzle);
        apply(&puzzle, &mut state, &Intent::Submit).unwrap();
        apply(&puzzle, &mut state, &Intent::Move { from: 1, to: 0 }).unwrap();
        apply(&puzzle, &mut state, &Intent::Submit).unwrap();

        let ScoreResult::Rank(score) = score(&puzzle, &state).unwrap() else {
            panic!("expected rank score");
        };
        assert!(score.completed);
        assert!(!score.perfect);
        assert_eq!(score.attempts, 2);
        assert_eq!(score.verdict, Some(Verdict::Excellent));
    }

    #[test]
    fn single_attempt_ranking_reports_partial_credit() {
        let puzzle = rank_puzzle(&[0, 3, 2, 1], false);
        let mut state = PuzzleState::new(&puzzle);
        apply(&puzzle, &mut state, &Intent::Submit).unwrap();
        let ScoreResult::Rank(score) = score(&puzzle, &state).unwrap() else {
            panic!("expected rank score");
        };
        assert_eq!(score.correct_positions, 2);
        assert!((score.percentage - 50.0).abs() < f64::EPSILON);
        assert!(!score.perfect);
        assert!(score.completed);
        assert_eq!(score.verdict, None);
    }

    #[test]
    fn scoring_is_idempotent() {
        let puzzle = rank_puzzle(&[2, 0, 1], true);
        let mut state = PuzzleState::new(&puzzle);
        apply(&puzzle, &mut state, &Intent::Submit).unwrap();
        let before = state.clone();
        assert_eq!(score(&puzzle, &state).unwrap(), score(&puzzle, &state).unwrap());
        assert_eq!(state, before);
    }

    #[test]
    fn verdict_tiers() {
        assert_eq!(Verdict::for_attempts(1), Verdict::Perfect);
        assert_eq!(Verdict::for_attempts(3), Verdict::Excellent);
        assert_eq!(Verdict::for_attempts(4), Verdict::Persistent);
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let state = PuzzleState::new(&match_puzzle());
        assert!(score(&pair_puzzle(), &state).is_err());
    }
}
