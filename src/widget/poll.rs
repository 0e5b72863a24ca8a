use crate::error::MountError;
use crate::models::{PollMarkup, TallyRecord};
use crate::tally::TallyStore;
use crate::view::{project_poll, render_finished, PollPresentation};
use crate::voting::plurality::calculate_results;
use crate::widget::answer::{Activation, AnswerOption};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Active,
    /// Disabled through configuration, no vote collected yet.
    Disabled,
    Completed,
}

/// What happens when an answer is activated on a poll that already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReactivationPolicy {
    /// Collect another vote.
    #[default]
    Allow,
    /// Drop the activation.
    Ignore,
}

pub struct Poll {
    id: String,
    title: Option<String>,
    disabled: bool,
    completed: bool,
    answers: Vec<AnswerOption>,
    finished_template: Option<String>,
    finished_text: Option<String>,
    reactivation: ReactivationPolicy,
    store: Arc<TallyStore>,
}

impl Poll {
    /// Builds a poll from its markup. A missing or blank `id` is fatal.
    pub fn mount(markup: PollMarkup, store: Arc<TallyStore>) -> Result<Self, MountError> {
        let id = match markup.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(MountError::MissingId),
        };

        let answers: Vec<AnswerOption> = markup.answers.iter().map(AnswerOption::from_markup).collect();

        let mut seen = HashSet::new();
        for answer in &answers {
            if !seen.insert(answer.label()) {
                warn!(
                    "Poll {} has more than one answer labelled '{}'; their votes share one counter",
                    id,
                    answer.label()
                );
            }
        }

        Ok(Self {
            id,
            title: markup.title,
            disabled: markup.disabled,
            completed: false,
            answers,
            finished_text: markup.finished.clone(),
            finished_template: markup.finished,
            reactivation: ReactivationPolicy::default(),
            store,
        })
    }

    pub fn with_reactivation(mut self, policy: ReactivationPolicy) -> Self {
        self.reactivation = policy;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Completion pins `disabled` to true; attempts to re-enable are ignored.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.completed && !disabled {
            debug!("Poll {} is completed, ignoring request to re-enable", self.id);
            return;
        }
        self.disabled = disabled;
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn state(&self) -> PollState {
        if self.completed {
            PollState::Completed
        } else if self.disabled {
            PollState::Disabled
        } else {
            PollState::Active
        }
    }

    pub fn reactivation(&self) -> ReactivationPolicy {
        self.reactivation
    }

    pub fn answers(&self) -> &[AnswerOption] {
        &self.answers
    }

    pub fn answer_mut(&mut self, index: usize) -> Option<&mut AnswerOption> {
        self.answers.get_mut(index)
    }

    /// Content of the `finished` slot, with the vote count substituted once
    /// the poll has completed.
    pub fn finished_message(&self) -> Option<&str> {
        self.finished_text.as_deref()
    }

    pub fn presentation(&self) -> PollPresentation {
        project_poll(self.completed, self.disabled)
    }

    /// Records a vote for `label` and pushes the updated results into every
    /// answer. Any label is accepted; one that matches no answer opens a new
    /// bucket in the tally.
    pub async fn collect(&mut self, label: &str) -> TallyRecord {
        info!("Collecting vote for poll {}: '{}'", self.id, label);
        // Completion comes first and also disables the poll
        self.mark_completed();

        // Record the vote, then push the fresh tally to the answers
        let record = self.store.increment(&self.id, label).await;
        self.show_results(&record);

        info!(
            "Poll {} now has {} vote(s)",
            self.id,
            record.total_polls()
        );
        record
    }

    /// Routes an answer activation. Activations are dropped while the poll is
    /// disabled by configuration, and after completion when the reactivation
    /// policy says so.
    pub async fn handle_activation(&mut self, activation: Activation) -> Option<TallyRecord> {
        match (self.state(), self.reactivation) {
            (PollState::Disabled, _) => {
                info!("Poll {} is disabled, ignoring activation of '{}'", self.id, activation.label);
                None
            }
            (PollState::Completed, ReactivationPolicy::Ignore) => {
                info!("Poll {} already completed, ignoring activation of '{}'", self.id, activation.label);
                None
            }
            _ => Some(self.collect(&activation.label).await),
        }
    }

    pub async fn activate_answer(&mut self, index: usize) -> Option<TallyRecord> {
        let Some(answer) = self.answers.get(index) else {
            warn!("Poll {} has no answer at index {}", self.id, index);
            return None;
        };
        let activation = answer.activate();
        self.handle_activation(activation).await
    }

    fn mark_completed(&mut self) {
        self.completed = true;
        self.disabled = true;
    }

    fn show_results(&mut self, record: &TallyRecord) {
        let results = calculate_results(self.answers.iter().map(AnswerOption::label), record);
        for (answer, share) in self.answers.iter_mut().zip(results.shares) {
            debug!(
                "Poll {}: '{}' has {} vote(s) ({}%)",
                self.id, share.label, share.count, share.percentage
            );
            answer.set_result(share.percentage);
        }

        // Fill the vote count into the finished slot
        if let Some(template) = &self.finished_template {
            self.finished_text = Some(render_finished(template, results.total_polls));
        }
    }
}
