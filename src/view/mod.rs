//! Declarative presentation state. Everything here is a pure projection of
//! poll and answer state; hosts re-evaluate it after each mutation and apply
//! the attributes however they render.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref COUNT_PLACEHOLDER: Regex = Regex::new(r"(?i)\{\{\s?count\s?\}\}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvents {
    All,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPresentation {
    pub pointer_events: PointerEvents,
    /// Whether the footer holding the `finished` slot is shown.
    pub footer_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerPresentation {
    /// Width of the progress bar, e.g. `"33%"`.
    pub progress: String,
    /// Text shown in the result span, empty until a result exists.
    pub result_text: String,
    pub result_visible: bool,
}

pub fn project_poll(completed: bool, disabled: bool) -> PollPresentation {
    PollPresentation {
        pointer_events: if disabled || completed {
            PointerEvents::None
        } else {
            PointerEvents::All
        },
        footer_visible: completed,
    }
}

pub fn project_answer(result: Option<u8>) -> AnswerPresentation {
    match result {
        Some(percentage) => AnswerPresentation {
            progress: format!("{}%", percentage),
            result_text: format!("{}%", percentage),
            result_visible: true,
        },
        None => AnswerPresentation {
            progress: "0%".to_string(),
            result_text: String::new(),
            result_visible: false,
        },
    }
}

/// Replaces every `{{count}}` token (case-insensitive, one optional space on
/// each side) with the vote total.
pub fn render_finished(template: &str, total_polls: u64) -> String {
    COUNT_PLACEHOLDER
        .replace_all(template, total_polls.to_string().as_str())
        .into_owned()
}
