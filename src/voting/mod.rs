pub mod plurality;

/// Result view for one poll, one entry per answer in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResults {
    pub total_polls: u64,
    pub shares: Vec<VoteShare>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteShare {
    pub label: String,
    pub count: u64,
    pub percentage: u8,
}

#[cfg(test)]
impl PollResults {
    pub(crate) fn percentage_for(&self, label: &str) -> Option<u8> {
        self.shares
            .iter()
            .find(|share| share.label == label)
            .map(|share| share.percentage)
    }
}
