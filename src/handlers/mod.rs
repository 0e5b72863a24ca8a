use crate::models::TallyRecord;
use crate::widget::Page;
use log::{info, warn};

/// Events a host forwards from its rendered widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// A visitor activated the answer at `answer` (index in markup order).
    Activate { poll_id: String, answer: usize },
    /// The `disabled` attribute changed.
    SetDisabled { poll_id: String, disabled: bool },
    /// The `title` attribute changed.
    SetTitle { poll_id: String, title: Option<String> },
    /// An answer's `result` attribute changed.
    SetResult {
        poll_id: String,
        answer: usize,
        raw: String,
    },
}

impl Interaction {
    pub fn poll_id(&self) -> &str {
        match self {
            Interaction::Activate { poll_id, .. }
            | Interaction::SetDisabled { poll_id, .. }
            | Interaction::SetTitle { poll_id, .. }
            | Interaction::SetResult { poll_id, .. } => poll_id,
        }
    }
}

/// Dispatches one interaction to the poll it targets. Returns the updated
/// tally when a vote was collected. Interactions for unknown polls or answers
/// are logged and dropped.
pub async fn handle_interaction(page: &mut Page, interaction: Interaction) -> Option<TallyRecord> {
    let Some(poll) = page.poll_mut(interaction.poll_id()) else {
        warn!("Interaction for unknown poll: {:?}", interaction);
        return None;
    };

    match interaction {
        Interaction::Activate { answer, .. } => {
            info!("Received activation: poll={}, answer={}", poll.id(), answer);
            poll.activate_answer(answer).await
        }
        Interaction::SetDisabled { disabled, .. } => {
            poll.set_disabled(disabled);
            None
        }
        Interaction::SetTitle { title, .. } => {
            poll.set_title(title);
            None
        }
        Interaction::SetResult { answer, raw, .. } => {
            match poll.answer_mut(answer) {
                Some(option) => option.set_result_attr(&raw),
                None => warn!("Poll {} has no answer at index {}", poll.id(), answer),
            }
            None
        }
    }
}
