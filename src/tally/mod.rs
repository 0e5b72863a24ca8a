use crate::db::Storage;
use crate::models::TallyRecord;
use log::{debug, error, warn};
use std::sync::Arc;

/// How `TallyStore::increment` writes the updated record back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncrementMode {
    /// Plain read-modify-write. Concurrent writers sharing the same storage
    /// can overwrite each other's votes.
    #[default]
    LastWriteWins,
    /// Write only if the persisted value is unchanged since the read, reloading
    /// and retrying otherwise. Falls back to a plain write after `max_retries`.
    CompareAndSwap { max_retries: u32 },
}

/// Read and increment access to per-poll tally records.
///
/// Neither operation fails: unreadable or corrupted records are treated as
/// empty and write failures are logged, so the voting flow always completes.
pub struct TallyStore {
    storage: Arc<dyn Storage>,
    mode: IncrementMode,
}

impl TallyStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            mode: IncrementMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: IncrementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> IncrementMode {
        self.mode
    }

    pub async fn read(&self, poll_id: &str) -> TallyRecord {
        self.load(poll_id).await.1
    }

    pub async fn increment(&self, poll_id: &str, label: &str) -> TallyRecord {
        debug!("Incrementing '{}' for poll {}", label, poll_id);
        match self.mode {
            IncrementMode::LastWriteWins => {
                let next = self.read(poll_id).await.with_vote(label);
                self.persist(poll_id, &next).await;
                next
            }
            IncrementMode::CompareAndSwap { max_retries } => {
                self.increment_with_cas(poll_id, label, max_retries).await
            }
        }
    }

    async fn increment_with_cas(&self, poll_id: &str, label: &str, max_retries: u32) -> TallyRecord {
        for attempt in 0..=max_retries {
            // Keep the raw value we read so the write can check it is unchanged
            let (raw, current) = self.load(poll_id).await;
            let next = current.with_vote(label);
            let serialized = match next.to_json() {
                Ok(serialized) => serialized,
                Err(e) => {
                    error!("Failed to serialize tally for poll {}: {}", poll_id, e);
                    return next;
                }
            };

            // Another writer got in first if the swap is refused
            match self
                .storage
                .compare_and_set(poll_id, raw.as_deref(), &serialized)
                .await
            {
                Ok(true) => return next,
                Ok(false) => debug!(
                    "Tally for poll {} changed during update (attempt {}), retrying",
                    poll_id,
                    attempt + 1
                ),
                Err(e) => {
                    error!("Failed to persist tally for poll {}: {}", poll_id, e);
                    return next;
                }
            }
        }

        // Out of retries: re-read and overwrite
        warn!(
            "Compare-and-swap retries exhausted for poll {}, falling back to last-write-wins",
            poll_id
        );
        let next = self.read(poll_id).await.with_vote(label);
        self.persist(poll_id, &next).await;
        next
    }

    // Returns the raw stored value alongside the parsed record.
    async fn load(&self, poll_id: &str) -> (Option<String>, TallyRecord) {
        match self.storage.get_item(poll_id).await {
            Ok(Some(raw)) => match TallyRecord::from_json(&raw) {
                Ok(record) => (Some(raw), record),
                Err(e) => {
                    warn!("Stored tally for poll {} is malformed, treating as empty: {}", poll_id, e);
                    (Some(raw), TallyRecord::empty())
                }
            },
            Ok(None) => (None, TallyRecord::empty()),
            Err(e) => {
                warn!("Failed to read tally for poll {}, treating as empty: {}", poll_id, e);
                (None, TallyRecord::empty())
            }
        }
    }

    async fn persist(&self, poll_id: &str, record: &TallyRecord) {
        let serialized = match record.to_json() {
            Ok(serialized) => serialized,
            Err(e) => {
                error!("Failed to serialize tally for poll {}: {}", poll_id, e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(poll_id, &serialized).await {
            error!("Failed to persist tally for poll {}: {}", poll_id, e);
        }
    }
}
