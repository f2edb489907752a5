//! Dataset parsing and filtering.
//!
//! Accepts the two record shapes found in exported data files: a field-named
//! object and the compact tuple `[id, text, votes, timestamp, datetime,
//! [[answer_text, votes], ...]]`. Files may also be wrapped as a script
//! (`const redditData = [...];`) with `//` comment lines.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::model::{Answer, AnswerOrder, SourceItem, Variant};

/// A record id as it appears in the data: text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => write!(f, "{s}"),
            RawId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Compact tuple form of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactRecord(
    pub RawId,
    pub String,
    pub i64,
    pub Option<f64>,
    pub Option<String>,
    pub Vec<(String, i64)>,
);

/// Field-named form of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(alias = "title")]
    pub text: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(
        default,
        alias = "top_answers",
        alias = "top_comments",
        deserialize_with = "null_as_empty"
    )]
    pub answers: Vec<RawAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnswer {
    /// `None` for deleted or missing comment bodies; such answers are skipped.
    #[serde(default, alias = "body")]
    pub text: Option<String>,
    #[serde(default, alias = "score")]
    pub votes: i64,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A record as supplied by a data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    Compact(CompactRecord),
    Object(ObjectRecord),
    /// Fits neither shape. Kept so filtering can count it.
    Malformed(Value),
}

impl RawRecord {
    /// Classify one JSON value from a data file.
    pub fn from_value(index: usize, value: Value) -> Self {
        let parsed = if value.is_array() {
            serde_json::from_value::<CompactRecord>(value.clone()).map(RawRecord::Compact)
        } else {
            serde_json::from_value::<ObjectRecord>(value.clone()).map(RawRecord::Object)
        };
        parsed.unwrap_or_else(|e| {
            tracing::warn!("skipping malformed record {index}: {e}");
            RawRecord::Malformed(value)
        })
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RawRecord::Malformed(_))
    }

    /// Convert into a `SourceItem`. Records without an id get `#<index>`;
    /// malformed records yield `None`.
    pub fn normalize(self, index: usize, order: AnswerOrder) -> Option<SourceItem> {
        let mut item = match self {
            RawRecord::Compact(CompactRecord(id, question, votes, timestamp, datetime, answers)) => {
                SourceItem {
                    id: id.to_string(),
                    question,
                    votes,
                    timestamp,
                    datetime,
                    answers: answers
                        .into_iter()
                        .map(|(text, votes)| Answer { text, votes })
                        .collect(),
                }
            }
            RawRecord::Object(record) => SourceItem {
                id: record
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| format!("#{index}")),
                question: record.text,
                votes: record.votes,
                timestamp: record.timestamp,
                datetime: record.datetime,
                answers: record
                    .answers
                    .into_iter()
                    .filter_map(|a| {
                        a.text.map(|text| Answer {
                            text,
                            votes: a.votes,
                        })
                    })
                    .collect(),
            },
            RawRecord::Malformed(_) => return None,
        };

        if order == AnswerOrder::ByVotes {
            // stable: equal votes keep their source order
            item.answers.sort_by(|a, b| b.votes.cmp(&a.votes));
        }
        Some(item)
    }
}

/// Parse a data file body into raw records.
///
/// Only an unreadable top-level array fails; a bad record becomes
/// [`RawRecord::Malformed`].
pub fn parse_records(content: &str) -> Result<Vec<RawRecord>, EngineError> {
    let body = strip_script_wrapper(content);
    if body.is_empty() {
        return Err(EngineError::DataUnavailable("data file is empty".into()));
    }
    let values: Vec<Value> = serde_json::from_str(&body)
        .map_err(|e| EngineError::DataUnavailable(format!("malformed dataset: {e}")))?;
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(i, value)| RawRecord::from_value(i, value))
        .collect())
}

fn strip_script_wrapper(content: &str) -> String {
    let body = content
        .trim_start_matches('\u{feff}')
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim();

    let body = if body.starts_with('[') {
        body
    } else {
        match body.find('=') {
            Some(eq) => &body[eq + 1..],
            None => body,
        }
    };

    body.trim().trim_end_matches(';').trim_end().to_string()
}

/// Normalize every well-formed record, in order.
pub fn normalize_all(records: Vec<RawRecord>, order: AnswerOrder) -> Vec<SourceItem> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, r)| r.normalize(i, order))
        .collect()
}

/// Filtering thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum answers for the ranking variants.
    pub min_answers: usize,
    /// The top answer must be strictly longer than this for matching variants.
    /// Measured in UTF-16 code units, the way browser string length counts.
    pub min_top_answer_chars: usize,
    /// How ground-truth answer order is established.
    pub answer_order: AnswerOrder,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_answers: 3,
            min_top_answer_chars: 10,
            answer_order: AnswerOrder::ByVotes,
        }
    }
}

/// What happened to each record during filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub variant: Option<Variant>,
    pub total: usize,
    pub kept: usize,
    pub duplicate_ids: usize,
    pub too_few_answers: usize,
    pub short_top_answer: usize,
    #[serde(default)]
    pub malformed: usize,
}

impl FilterReport {
    pub fn dropped(&self) -> usize {
        self.total - self.kept
    }
}

/// Keep the items playable in `variant`.
pub fn filter_items(
    items: Vec<SourceItem>,
    variant: Variant,
    config: &FilterConfig,
) -> (Vec<SourceItem>, FilterReport) {
    let mut report = FilterReport {
        variant: Some(variant),
        total: items.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(items.len());

    for item in items {
        if !seen.insert(item.id.clone()) {
            tracing::warn!("dropping duplicate question id {}", item.id);
            report.duplicate_ids += 1;
            continue;
        }

        if variant.is_matcher() {
            let long_enough = item
                .top_answer()
                .is_some_and(|a| a.text.encode_utf16().count() > config.min_top_answer_chars);
            if !long_enough {
                report.short_top_answer += 1;
                continue;
            }
        } else if item.answers.len() < config.min_answers {
            report.too_few_answers += 1;
            continue;
        }

        kept.push(item);
    }

    report.kept = kept.len();
    tracing::debug!(
        variant = %variant,
        total = report.total,
        kept = report.kept,
        "filtered dataset"
    );
    (kept, report)
}

/// Normalize `records` and keep the items playable in `variant`. Malformed
/// records count towards the report's total.
pub fn filter_records(
    records: Vec<RawRecord>,
    variant: Variant,
    config: &FilterConfig,
) -> (Vec<SourceItem>, FilterReport) {
    let malformed = records.iter().filter(|r| r.is_malformed()).count();
    let items = normalize_all(records, config.answer_order);
    let (kept, mut report) = filter_items(items, variant, config);
    report.total += malformed;
    report.malformed = malformed;
    (kept, report)
}

/// A filtered dataset ready for dealing puzzles of one variant.
#[derive(Debug, Clone)]
pub struct Dataset {
    variant: Variant,
    items: Vec<SourceItem>,
    report: FilterReport,
}

impl Dataset {
    /// Normalize and filter raw records for `variant`.
    pub fn build(
        records: Vec<RawRecord>,
        variant: Variant,
        config: &FilterConfig,
    ) -> Result<Self, EngineError> {
        if records.is_empty() {
            return Err(EngineError::DataUnavailable("no records loaded".into()));
        }
        let (items, report) = filter_records(records, variant, config);
        Self::from_filtered(items, variant, report)
    }

    /// Filter already-normalized items for `variant`.
    pub fn from_items(
        items: Vec<SourceItem>,
        variant: Variant,
        config: &FilterConfig,
    ) -> Result<Self, EngineError> {
        let (items, report) = filter_items(items, variant, config);
        Self::from_filtered(items, variant, report)
    }

    fn from_filtered(
        items: Vec<SourceItem>,
        variant: Variant,
        report: FilterReport,
    ) -> Result<Self, EngineError> {
        let required = variant.min_playable();
        if items.len() < required {
            return Err(EngineError::InsufficientData {
                found: items.len(),
                required,
            });
        }
        Ok(Self {
            variant,
            items,
            report,
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn items(&self) -> &[SourceItem] {
        &self.items
    }

    pub fn report(&self) -> &FilterReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
