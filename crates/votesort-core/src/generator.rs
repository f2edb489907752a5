//! Puzzle generation.
//!
//! Orderings go through [`shuffle`], a Fisher-Yates shuffle, so each
//! permutation of the dataset and of the presented answers is equally likely.

use rand::Rng;

use crate::dataset::Dataset;
use crate::error::EngineError;
use crate::model::{
    AnswerId, MatchPuzzle, PairPuzzle, PuzzleAnswer, PuzzleInstance, QuestionRef, RankPuzzle,
    RankedAnswer, SourceItem, Variant,
};

/// Number of questions in a matching or pairing puzzle.
pub const MATCH_GROUP_SIZE: usize = 5;

/// Maximum answers shown for one question.
pub const MAX_ANSWERS: usize = 5;

/// Shuffle `items` in place, uniformly.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    if items.len() <= 1 {
        return;
    }
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Deal one puzzle of the dataset's variant.
pub fn deal<R: Rng + ?Sized>(dataset: &Dataset, rng: &mut R) -> Result<PuzzleInstance, EngineError> {
    deal_from(dataset.items(), dataset.variant(), rng)
}

/// Deal one puzzle from already-filtered items.
pub fn deal_from<R: Rng + ?Sized>(
    items: &[SourceItem],
    variant: Variant,
    rng: &mut R,
) -> Result<PuzzleInstance, EngineError> {
    let required = variant.min_playable();
    if items.len() < required {
        return Err(EngineError::InsufficientData {
            found: items.len(),
            required,
        });
    }

    let instance = match variant {
        Variant::Match => PuzzleInstance::Match(deal_match(items, rng)?),
        Variant::Pair => PuzzleInstance::Pair(deal_pair(items, rng)?),
        Variant::Rank => PuzzleInstance::Rank(deal_rank(items, true, rng)?),
        Variant::RankOnce => PuzzleInstance::Rank(deal_rank(items, false, rng)?),
    };
    tracing::debug!(variant = %variant, "dealt puzzle");
    Ok(instance)
}

fn sample<'a, R: Rng + ?Sized>(items: &'a [SourceItem], rng: &mut R) -> Vec<&'a SourceItem> {
    let mut pool: Vec<&SourceItem> = items.iter().collect();
    shuffle(&mut pool, rng);
    pool.truncate(MATCH_GROUP_SIZE);
    pool
}

fn deal_match<R: Rng + ?Sized>(
    items: &[SourceItem],
    rng: &mut R,
) -> Result<MatchPuzzle, EngineError> {
    let picked = sample(items, rng);
    let correct = picked[0];
    if correct.answers.is_empty() {
        return Err(no_answers(correct));
    }

    let answers = correct
        .answers
        .iter()
        .take(MAX_ANSWERS)
        .enumerate()
        .map(|(i, a)| PuzzleAnswer {
            id: AnswerId(i),
            text: a.text.clone(),
            votes: a.votes,
        })
        .collect();

    let mut choices: Vec<QuestionRef> = picked.iter().map(|item| QuestionRef::from(*item)).collect();
    shuffle(&mut choices, rng);

    Ok(MatchPuzzle {
        correct_question: QuestionRef::from(correct),
        answers,
        choices,
    })
}

fn deal_pair<R: Rng + ?Sized>(items: &[SourceItem], rng: &mut R) -> Result<PairPuzzle, EngineError> {
    let picked = sample(items, rng);

    let mut answers = picked
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let top = item.top_answer().ok_or_else(|| no_answers(item))?;
            Ok(PuzzleAnswer {
                id: AnswerId(i),
                text: top.text.clone(),
                votes: top.votes,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;
    let truth = answers.iter().map(|a| a.id).collect();
    shuffle(&mut answers, rng);

    Ok(PairPuzzle {
        questions: picked.iter().map(|item| QuestionRef::from(*item)).collect(),
        answers,
        truth,
    })
}

fn deal_rank<R: Rng + ?Sized>(
    items: &[SourceItem],
    locking: bool,
    rng: &mut R,
) -> Result<RankPuzzle, EngineError> {
    let item = &items[rng.gen_range(0..items.len())];
    if item.answers.is_empty() {
        return Err(no_answers(item));
    }

    let mut answers: Vec<RankedAnswer> = item
        .answers
        .iter()
        .take(MAX_ANSWERS)
        .enumerate()
        .map(|(rank, a)| RankedAnswer {
            id: AnswerId(rank),
            text: a.text.clone(),
            votes: a.votes,
            original_rank: rank,
        })
        .collect();
    shuffle(&mut answers, rng);

    Ok(RankPuzzle {
        question: QuestionRef::from(item),
        answers,
        locking,
    })
}

fn no_answers(item: &SourceItem) -> EngineError {
    EngineError::DataUnavailable(format!("question {} has no answers", item.id))
}
