use crate::models::AnswerMarkup;
use crate::view::{project_answer, AnswerPresentation};

/// A user activation of one answer, carrying the label to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub label: String,
}

/// One selectable choice of a poll. The label doubles as the tally key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    label: String,
    result: Option<u8>,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            result: None,
        }
    }

    pub fn from_markup(markup: &AnswerMarkup) -> Self {
        let mut answer = Self::new(markup.label.clone());
        if let Some(raw) = &markup.result {
            answer.set_result_attr(raw);
        }
        answer
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn result(&self) -> Option<u8> {
        self.result
    }

    pub fn set_result(&mut self, percentage: u8) {
        self.result = Some(percentage.min(100));
    }

    /// Sets the result from its string attribute form; see [`normalize_result`].
    pub fn set_result_attr(&mut self, raw: &str) {
        self.result = Some(normalize_result(raw));
    }

    /// Reports this answer's label for the owning poll to collect. Nothing
    /// here checks whether the poll has already completed.
    pub fn activate(&self) -> Activation {
        Activation {
            label: self.label.clone(),
        }
    }

    pub fn presentation(&self) -> AnswerPresentation {
        project_answer(self.result)
    }
}

/// Parses a `result` attribute. Non-numeric input becomes 0; numbers are
/// rounded half up and clamped to 0..=100. Blank input counts as 0.
pub fn normalize_result(raw: &str) -> u8 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if !value.is_nan() => (value + 0.5).floor().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}
