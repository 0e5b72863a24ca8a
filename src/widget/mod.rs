pub mod answer;
pub mod poll;

pub use answer::{Activation, AnswerOption};
pub use poll::{Poll, PollState, ReactivationPolicy};

use crate::error::MountError;
use crate::models::PollMarkup;
use crate::tally::TallyStore;
use log::{error, info};
use std::sync::Arc;

/// The set of polls mounted on one page. Poll identities are unique here and
/// all polls share one tally store.
pub struct Page {
    store: Arc<TallyStore>,
    polls: Vec<Poll>,
    reactivation: ReactivationPolicy,
}

impl Page {
    pub fn new(store: TallyStore) -> Self {
        Self {
            store: Arc::new(store),
            polls: Vec::new(),
            reactivation: ReactivationPolicy::default(),
        }
    }

    /// Policy applied to every poll mounted afterwards.
    pub fn with_reactivation(mut self, policy: ReactivationPolicy) -> Self {
        self.reactivation = policy;
        self
    }

    pub fn store(&self) -> &TallyStore {
        &self.store
    }

    pub fn mount(&mut self, markup: PollMarkup) -> Result<&mut Poll, MountError> {
        let poll = match Poll::mount(markup, Arc::clone(&self.store)) {
            Ok(poll) => poll.with_reactivation(self.reactivation),
            Err(e) => {
                error!("Refusing to mount poll: {}", e);
                return Err(e);
            }
        };

        if self.poll(poll.id()).is_some() {
            error!("Refusing to mount poll: duplicate ID '{}'", poll.id());
            return Err(MountError::DuplicateId(poll.id().to_string()));
        }

        info!("Mounted poll {} with {} answer(s)", poll.id(), poll.answers().len());
        let index = self.polls.len();
        self.polls.push(poll);
        Ok(&mut self.polls[index])
    }

    /// Removes a poll. Its tally record stays in the store.
    pub fn unmount(&mut self, id: &str) -> Option<Poll> {
        let index = self.polls.iter().position(|poll| poll.id() == id)?;
        info!("Unmounted poll {}", id);
        Some(self.polls.remove(index))
    }

    pub fn poll(&self, id: &str) -> Option<&Poll> {
        self.polls.iter().find(|poll| poll.id() == id)
    }

    pub fn poll_mut(&mut self, id: &str) -> Option<&mut Poll> {
        self.polls.iter_mut().find(|poll| poll.id() == id)
    }

    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    pub fn len(&self) -> usize {
        self.polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polls.is_empty()
    }
}
