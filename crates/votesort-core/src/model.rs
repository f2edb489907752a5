//! Core data model types for votesort.
//!
//! Source items are the normalized dataset records; puzzle instances are the
//! immutable puzzles a session is played against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single answer with its vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub votes: i64,
}

/// One question with its ranked answers, as loaded from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    /// Unique identifier of the question.
    pub id: String,
    /// The question text.
    pub question: String,
    /// Votes on the question itself.
    #[serde(default)]
    pub votes: i64,
    /// Unix timestamp of the question, if known.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Human-readable date of the question, if known.
    #[serde(default)]
    pub datetime: Option<String>,
    /// Answers, best first.
    pub answers: Vec<Answer>,
}

impl SourceItem {
    /// The best answer, if there is one.
    pub fn top_answer(&self) -> Option<&Answer> {
        self.answers.first()
    }
}

/// The puzzle variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Pick which of five questions a set of answers belongs to.
    Match,
    /// Pair five questions with their five top answers.
    Pair,
    /// Order answers by votes over several attempts, locking correct ones.
    Rank,
    /// Order answers by votes in a single attempt.
    RankOnce,
}

impl Variant {
    pub const ALL: [Variant; 4] = [
        Variant::Match,
        Variant::Pair,
        Variant::Rank,
        Variant::RankOnce,
    ];

    /// Whether this is one of the matching variants.
    pub fn is_matcher(self) -> bool {
        matches!(self, Variant::Match | Variant::Pair)
    }

    /// Minimum number of filtered items needed to deal a puzzle.
    pub fn min_playable(self) -> usize {
        if self.is_matcher() {
            crate::generator::MATCH_GROUP_SIZE
        } else {
            1
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Match => write!(f, "match"),
            Variant::Pair => write!(f, "pair"),
            Variant::Rank => write!(f, "rank"),
            Variant::RankOnce => write!(f, "rank-once"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "match" | "matcher" => Ok(Variant::Match),
            "pair" | "match-multi" | "pairs" => Ok(Variant::Pair),
            "rank" | "ranker" | "order" => Ok(Variant::Rank),
            "rank-once" | "rank_once" | "once" => Ok(Variant::RankOnce),
            other => Err(format!("unknown variant: {other}")),
        }
    }
}

/// How ground truth is derived from a record's answer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerOrder {
    /// Stable sort by descending votes at ingestion.
    #[default]
    ByVotes,
    /// Trust the order the source delivered.
    AsIngested,
}

/// Identifier of an answer within one puzzle instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(pub usize);

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A question as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRef {
    pub id: String,
    pub text: String,
}

impl From<&SourceItem> for QuestionRef {
    fn from(item: &SourceItem) -> Self {
        Self {
            id: item.id.clone(),
            text: item.question.clone(),
        }
    }
}

/// An answer in a matching or pairing puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleAnswer {
    pub id: AnswerId,
    pub text: String,
    pub votes: i64,
}

/// An answer in a ranking puzzle; `original_rank` 0 has the most votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAnswer {
    pub id: AnswerId,
    pub text: String,
    pub votes: i64,
    pub original_rank: usize,
}

/// Matcher-single: which question produced these answers?
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPuzzle {
    pub correct_question: QuestionRef,
    pub answers: Vec<PuzzleAnswer>,
    /// The correct question and four decoys, shuffled.
    pub choices: Vec<QuestionRef>,
}

impl MatchPuzzle {
    pub fn choice(&self, id: &str) -> Option<&QuestionRef> {
        self.choices.iter().find(|q| q.id == id)
    }
}

/// Matcher-multi: pair every question with its top answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairPuzzle {
    pub questions: Vec<QuestionRef>,
    /// Shuffled independently of `questions`.
    pub answers: Vec<PuzzleAnswer>,
    /// `truth[i]` is the answer belonging to `questions[i]`.
    pub truth: Vec<AnswerId>,
}

impl PairPuzzle {
    pub fn question_index(&self, id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == id)
    }

    pub fn answer(&self, id: AnswerId) -> Option<&PuzzleAnswer> {
        self.answers.iter().find(|a| a.id == id)
    }

    /// The correct answer for a question.
    pub fn correct_answer(&self, question_id: &str) -> Option<&PuzzleAnswer> {
        self.question_index(question_id)
            .and_then(|i| self.truth.get(i))
            .and_then(|&id| self.answer(id))
    }
}

/// Ranker: restore the vote order of a question's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPuzzle {
    pub question: QuestionRef,
    /// Answers in presented (shuffled) order.
    pub answers: Vec<RankedAnswer>,
    /// Whether correct positions lock across several attempts.
    pub locking: bool,
}

impl RankPuzzle {
    pub fn answer(&self, id: AnswerId) -> Option<&RankedAnswer> {
        self.answers.iter().find(|a| a.id == id)
    }

    /// Answer ids in ascending `original_rank`.
    pub fn ground_truth(&self) -> Vec<AnswerId> {
        let mut sorted: Vec<&RankedAnswer> = self.answers.iter().collect();
        sorted.sort_by_key(|a| a.original_rank);
        sorted.into_iter().map(|a| a.id).collect()
    }

    /// Answer ids in presented order.
    pub fn presented_order(&self) -> Vec<AnswerId> {
        self.answers.iter().map(|a| a.id).collect()
    }
}

/// One dealt puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum PuzzleInstance {
    Match(MatchPuzzle),
    Pair(PairPuzzle),
    Rank(RankPuzzle),
}

impl PuzzleInstance {
    pub fn variant(&self) -> Variant {
        match self {
            PuzzleInstance::Match(_) => Variant::Match,
            PuzzleInstance::Pair(_) => Variant::Pair,
            PuzzleInstance::Rank(p) if p.locking => Variant::Rank,
            PuzzleInstance::Rank(_) => Variant::RankOnce,
        }
    }
}
