//! Headless core of an embeddable voting widget: polls with selectable
//! answers, a durable per-poll vote tally, and the result percentages shown
//! once a visitor has voted.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod tally;
pub mod view;
pub mod voting;
pub mod widget;

pub use config::{build_store, WidgetConfig};
pub use error::{ConfigError, MountError, StorageError};
pub use models::{AnswerMarkup, PollMarkup, TallyRecord, TOTAL_POLLS_KEY};
pub use tally::{IncrementMode, TallyStore};
pub use widget::{AnswerOption, Page, Poll, PollState, ReactivationPolicy};
