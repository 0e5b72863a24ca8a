use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reserved key holding the total vote counter inside a persisted record.
pub const TOTAL_POLLS_KEY: &str = "totalPolls";

/// Durable vote aggregate for one poll identity.
///
/// Persisted as a flat JSON object: every answer label maps to its count and
/// the reserved `totalPolls` key carries the total. Labels and the reserved
/// key share one namespace, so an answer literally labelled `totalPolls`
/// addresses the counter itself.
///
/// The parsed object is kept as-is. A vote only rewrites the answer's key and
/// `totalPolls`; every other stored entry is written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TallyRecord {
    entries: Map<String, Value>,
}

impl TallyRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Per-answer counts, leaving out `totalPolls` and entries that are not
    /// usable counts.
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() != TOTAL_POLLS_KEY)
            .filter_map(|(key, value)| count_from_value(value).map(|count| (key.clone(), count)))
            .collect()
    }

    pub fn total_polls(&self) -> u64 {
        self.count_for(TOTAL_POLLS_KEY)
    }

    /// Count stored under `label`, 0 when absent or not a usable count.
    pub fn count_for(&self, label: &str) -> u64 {
        self.entries
            .get(label)
            .and_then(count_from_value)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `totalPolls` equals the sum of the per-answer counts.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        self.counts().values().sum::<u64>() == self.total_polls()
    }

    /// Applies one vote: bump the answer's key, then bump `totalPolls`.
    pub fn record_vote(&mut self, label: &str) {
        self.bump(label);
        self.bump(TOTAL_POLLS_KEY);
    }

    pub fn with_vote(&self, label: &str) -> Self {
        let mut next = self.clone();
        next.record_vote(label);
        next
    }

    fn bump(&mut self, key: &str) {
        let next = match self.entries.get(key) {
            Some(current) => bumped(current),
            None => Value::from(1u64),
        };
        self.entries.insert(key.to_string(), next);
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// Non-numeric or negative values are not counts, fractional ones truncate.
fn count_from_value(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

// Numbers gain one and keep their fractional part; a non-numeric entry
// restarts at 1.
fn bumped(current: &Value) -> Value {
    if let Some(count) = current.as_u64() {
        return Value::from(count.saturating_add(1));
    }
    match current.as_f64() {
        Some(f) if f.is_finite() => {
            let next = f + 1.0;
            if next >= 0.0 && next.fract() == 0.0 && next < u64::MAX as f64 {
                Value::from(next as u64)
            } else {
                Value::from(next)
            }
        }
        _ => Value::from(1u64),
    }
}

/// Host-provided description of a poll container element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollMarkup {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub answers: Vec<AnswerMarkup>,
    /// Content of the `finished` slot, may contain a `{{count}}` token.
    #[serde(default)]
    pub finished: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerMarkup {
    pub label: String,
    /// Raw `result` attribute used to pre-seed the display.
    #[serde(default)]
    pub result: Option<String>,
}

impl PollMarkup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn answer(mut self, label: impl Into<String>) -> Self {
        self.answers.push(AnswerMarkup {
            label: label.into(),
            result: None,
        });
        self
    }

    pub fn seeded_answer(mut self, label: impl Into<String>, result: impl Into<String>) -> Self {
        self.answers.push(AnswerMarkup {
            label: label.into(),
            result: Some(result.into()),
        });
        self
    }

    pub fn finished(mut self, template: impl Into<String>) -> Self {
        self.finished = Some(template.into());
        self
    }
}
